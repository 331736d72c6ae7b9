use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;

use crate::models::Profile;

/// Picks the counterpart for a requester out of the eligible candidates
pub trait CandidateSelector: Send + Sync {
    /// Returns one of `candidates`, or None when the slice is empty
    fn select<'a>(&self, candidates: &'a [Profile]) -> Option<&'a Profile>;
}

/// Uniform random choice backed by a `StdRng`
#[derive(Debug)]
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Same seed, same candidate order => same picks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded when a seed is configured, OS entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }
}

impl CandidateSelector for RandomSelector {
    fn select<'a>(&self, candidates: &'a [Profile]) -> Option<&'a Profile> {
        if candidates.is_empty() {
            return None;
        }

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = rng.random_range(0..candidates.len());
        candidates.get(index)
    }
}

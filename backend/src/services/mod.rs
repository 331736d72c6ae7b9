pub mod job;
pub mod matcher;
pub mod notifier;
pub mod selection;

pub use job::run_match_job;
pub use matcher::{MatchProcessor, MatchRunError, MatcherConfig};
pub use notifier::{HttpNotifier, MatchNotifier, NoopNotifier};
pub use selection::{CandidateSelector, RandomSelector};

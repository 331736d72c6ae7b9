use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    constants::{DEFAULT_EXPIRY_THRESHOLD_HOURS, MAX_EXPIRY_THRESHOLD_HOURS},
    db::MatchStore,
    models::{
        Chatroom, ConnectRequest, NewChatroom, RequestOutcome, RequestStatus, RequestType,
        RunSummary, SkipReason,
    },
    services::selection::CandidateSelector,
};

/// Errors that abort a whole run. Per-request failures never end up here.
#[derive(Debug, Error)]
pub enum MatchRunError {
    #[error("Failed to connect to the match store: {0:#}")]
    Connect(anyhow::Error),
    #[error("Failed to load pending requests: {0:#}")]
    LoadPending(anyhow::Error),
    #[error("Failed to expire stale requests: {0:#}")]
    Expire(anyhow::Error),
    #[error("Invalid matcher configuration: {0:#}")]
    Config(anyhow::Error),
    #[error("Expiry threshold {0} reaches past the earliest representable time")]
    ThresholdOutOfRange(Duration),
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Unmatched requests older than this at run start are expired
    pub expiry_threshold: Duration,
}

impl MatcherConfig {
    /// Accepts 1 hour up to `MAX_EXPIRY_THRESHOLD_HOURS`
    pub fn with_expiry_hours(hours: i64) -> Result<Self> {
        if !(1..=MAX_EXPIRY_THRESHOLD_HOURS).contains(&hours) {
            return Err(anyhow::anyhow!(
                "Expiry threshold must be between 1 and {} hours, got {}",
                MAX_EXPIRY_THRESHOLD_HOURS,
                hours
            ));
        }

        let expiry_threshold = Duration::try_hours(hours)
            .ok_or_else(|| anyhow::anyhow!("Expiry threshold of {} hours overflows", hours))?;

        Ok(Self { expiry_threshold })
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            expiry_threshold: Duration::hours(DEFAULT_EXPIRY_THRESHOLD_HOURS),
        }
    }
}

/// Run-local bookkeeping of who was paired with whom.
///
/// Keys are users picked as candidates, values the requester they were
/// picked for. Anyone appearing on either side is "claimed" and cannot be
/// picked again in the same run.
#[derive(Debug, Default)]
struct MatchCache {
    requester_by_candidate: HashMap<String, String>,
    candidates_in_order: Vec<String>,
    claimed: HashSet<String>,
    resolved: HashSet<String>,
}

impl MatchCache {
    fn requester_for(&self, user_id: &str) -> Option<&str> {
        self.requester_by_candidate.get(user_id).map(String::as_str)
    }

    fn is_claimed(&self, user_id: &str) -> bool {
        self.claimed.contains(user_id)
    }

    fn record(&mut self, candidate_id: &str, requester_id: &str) {
        self.requester_by_candidate
            .insert(candidate_id.to_string(), requester_id.to_string());
        self.candidates_in_order.push(candidate_id.to_string());
        self.claimed.insert(candidate_id.to_string());
        self.claimed.insert(requester_id.to_string());
    }

    fn mark_resolved(&mut self, user_id: &str) {
        self.resolved.insert(user_id.to_string());
    }

    /// Cache entries whose candidate never had a request moved to matched
    fn unresolved(&self) -> Vec<(String, String)> {
        self.candidates_in_order
            .iter()
            .filter(|candidate| !self.resolved.contains(*candidate))
            .filter_map(|candidate| {
                self.requester_by_candidate
                    .get(candidate)
                    .map(|requester| (candidate.clone(), requester.clone()))
            })
            .collect()
    }
}

/// Pairs pending surprise-me requests into direct chatrooms, one pass per run
pub struct MatchProcessor {
    store: Arc<dyn MatchStore>,
    selector: Arc<dyn CandidateSelector>,
    config: MatcherConfig,
}

impl MatchProcessor {
    pub fn new(
        store: Arc<dyn MatchStore>,
        selector: Arc<dyn CandidateSelector>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            store,
            selector,
            config,
        }
    }

    pub async fn run(&self) -> Result<RunSummary, MatchRunError> {
        self.run_at(Utc::now()).await
    }

    /// One complete pass with `now` as the run start
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, MatchRunError> {
        info!("🎯 Starting surprise-me match run at {}", now);

        // Checked before anything is written
        let cutoff = now
            .checked_sub_signed(self.config.expiry_threshold)
            .ok_or(MatchRunError::ThresholdOutOfRange(self.config.expiry_threshold))?;

        let pending = self
            .store
            .find_requests(RequestType::SurpriseMe, RequestStatus::Pending)
            .await
            .map_err(MatchRunError::LoadPending)?;

        info!("📋 Found {} pending surprise-me requests", pending.len());

        let mut cache = MatchCache::default();
        let mut chatrooms: Vec<Chatroom> = Vec::new();
        let mut outcomes = Vec::with_capacity(pending.len());

        for request in &pending {
            let outcome = match self
                .process_request(request, &mut cache, &mut chatrooms, now)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "❌ Failed to process request {} for user {}: {:#}",
                        request.id, request.user_id, e
                    );
                    RequestOutcome::Failed {
                        request_id: Some(request.id),
                        user_id: request.user_id.clone(),
                        error: format!("{:#}", e),
                    }
                }
            };
            outcomes.push(outcome);
        }

        self.resolve_deferred(&pending, &mut cache, &chatrooms, &mut outcomes, now)
            .await;

        let expired_count = self.expire_unprocessed(&pending, &chatrooms, cutoff).await?;

        let summary = RunSummary {
            started_at: now,
            pending_requests: pending.len(),
            chatrooms,
            outcomes,
            expired_count,
        };

        info!(
            "✅ Match run finished | pending: {} | chatrooms: {} | matched: {} | \
             skipped: {} | failed: {} | expired: {}",
            summary.pending_requests,
            summary.processed_count(),
            summary.matched_count(),
            summary.skipped_count(),
            summary.failed_count(),
            summary.expired_count,
        );

        Ok(summary)
    }

    async fn process_request(
        &self,
        request: &ConnectRequest,
        cache: &mut MatchCache,
        chatrooms: &mut Vec<Chatroom>,
        now: DateTime<Utc>,
    ) -> Result<RequestOutcome> {
        let requester_id = request.user_id.as_str();

        // Picked by an earlier requester: take that pairing, no new search.
        if let Some(cached_requester) = cache.requester_for(requester_id).map(str::to_string) {
            self.store
                .mark_request_matched(request.id, &cached_requester, now)
                .await?;
            cache.mark_resolved(requester_id);

            info!("🔁 User {} resolved from match cache with {}", requester_id, cached_requester);
            return Ok(RequestOutcome::Matched {
                request_id: request.id,
                user_id: requester_id.to_string(),
                matched_user_id: cached_requester,
                chatroom_id: None,
            });
        }

        if cache.is_claimed(requester_id) {
            debug!(
                "User {} already matched this run, skipping request {}",
                requester_id, request.id
            );
            return Ok(RequestOutcome::Skipped {
                request_id: request.id,
                user_id: requester_id.to_string(),
                reason: SkipReason::AlreadyMatched,
            });
        }

        let candidates: Vec<_> = self
            .store
            .find_candidates(requester_id, request.request_type)
            .await?
            .into_iter()
            .filter(|profile| !cache.is_claimed(&profile.user_id))
            .collect();

        if candidates.is_empty() {
            info!("No eligible candidates for user {}", requester_id);
            return Ok(RequestOutcome::Skipped {
                request_id: request.id,
                user_id: requester_id.to_string(),
                reason: SkipReason::NoCandidates,
            });
        }

        let candidate_id = self
            .selector
            .select(&candidates)
            .map(|profile| profile.user_id.clone())
            .ok_or_else(|| anyhow::anyhow!("Selector returned no candidate for {}", requester_id))?;

        debug!(
            "Picked {} for {} out of {} candidate(s)",
            candidate_id,
            requester_id,
            candidates.len()
        );

        cache.record(&candidate_id, requester_id);

        self.store
            .mark_request_matched(request.id, &candidate_id, now)
            .await?;
        cache.mark_resolved(requester_id);

        let chatroom = self
            .store
            .insert_chatroom(NewChatroom::surprise_me(requester_id, &candidate_id)?)
            .await?;

        info!("👫 Matched {} with {} in chatroom {}", requester_id, candidate_id, chatroom.id);

        let chatroom_id = chatroom.id;
        chatrooms.push(chatroom);

        Ok(RequestOutcome::Matched {
            request_id: request.id,
            user_id: requester_id.to_string(),
            matched_user_id: candidate_id,
            chatroom_id: Some(chatroom_id),
        })
    }

    /// Candidates whose own request was not reached after they were picked
    /// (visited earlier, or created after the snapshot) still get matched,
    /// as long as their chatroom was actually created.
    async fn resolve_deferred(
        &self,
        pending: &[ConnectRequest],
        cache: &mut MatchCache,
        chatrooms: &[Chatroom],
        outcomes: &mut Vec<RequestOutcome>,
        now: DateTime<Utc>,
    ) {
        for (candidate_id, requester_id) in cache.unresolved() {
            let Some(chatroom) = chatrooms
                .iter()
                .find(|c| c.has_participant(&candidate_id) && c.has_participant(&requester_id))
            else {
                continue;
            };

            match self
                .store
                .mark_user_matched(&candidate_id, RequestType::SurpriseMe, &requester_id, now)
                .await
            {
                Ok(Some(request_id)) => {
                    cache.mark_resolved(&candidate_id);
                    info!("🔁 Resolved deferred match of {} with {}", candidate_id, requester_id);
                    outcomes.push(RequestOutcome::Matched {
                        request_id,
                        user_id: candidate_id,
                        matched_user_id: requester_id,
                        chatroom_id: Some(chatroom.id),
                    });
                }
                Ok(None) => {
                    warn!(
                        "User {} has no pending request left to match with {}",
                        candidate_id, requester_id
                    );
                }
                Err(e) => {
                    error!(
                        "❌ Failed to resolve deferred match of {} with {}: {:#}",
                        candidate_id, requester_id, e
                    );
                    // None when the candidate's request arrived after the snapshot
                    let request_id = pending
                        .iter()
                        .find(|r| r.user_id == candidate_id)
                        .map(|r| r.id);
                    outcomes.push(RequestOutcome::Failed {
                        request_id,
                        user_id: candidate_id,
                        error: format!("{:#}", e),
                    });
                }
            }
        }
    }

    /// Expires snapshot requests of users absent from every chatroom created
    /// this run, if they were created before `cutoff`
    async fn expire_unprocessed(
        &self,
        pending: &[ConnectRequest],
        chatrooms: &[Chatroom],
        cutoff: DateTime<Utc>,
    ) -> Result<u64, MatchRunError> {
        let processed: HashSet<&str> = chatrooms
            .iter()
            .flat_map(|c| c.participants.iter().map(String::as_str))
            .collect();

        let unprocessed: Vec<Uuid> = pending
            .iter()
            .filter(|r| !processed.contains(r.user_id.as_str()))
            .map(|r| r.id)
            .collect();

        if unprocessed.is_empty() {
            return Ok(0);
        }

        let expired = self
            .store
            .expire_requests(&unprocessed, cutoff)
            .await
            .map_err(MatchRunError::Expire)?;

        if expired > 0 {
            info!("🧹 Expired {} unmatched requests created before {}", expired, cutoff);
        }

        Ok(expired)
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::constants::RUN_SUCCESS_MESSAGE;
use super::Chatroom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No profile satisfied the candidate filters
    NoCandidates,
    /// The requester was already paired earlier in this run
    AlreadyMatched,
}

/// What happened to one pending request during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    Matched {
        request_id: Uuid,
        user_id: String,
        matched_user_id: String,
        /// None when the request was resolved from the match cache
        chatroom_id: Option<Uuid>,
    },
    Skipped {
        request_id: Uuid,
        user_id: String,
        reason: SkipReason,
    },
    Failed {
        /// None when the request was not part of the run's snapshot
        request_id: Option<Uuid>,
        user_id: String,
        error: String,
    },
}

impl RequestOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            RequestOutcome::Matched { user_id, .. }
            | RequestOutcome::Skipped { user_id, .. }
            | RequestOutcome::Failed { user_id, .. } => user_id,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, RequestOutcome::Matched { .. })
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub pending_requests: usize,
    pub chatrooms: Vec<Chatroom>,
    pub outcomes: Vec<RequestOutcome>,
    pub expired_count: u64,
}

impl RunSummary {
    pub fn processed_count(&self) -> usize {
        self.chatrooms.len()
    }

    pub fn matched_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_matched()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RequestOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RequestOutcome::Failed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSuccess {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub processed_count: usize,
    pub pending_requests_count: usize,
    pub expired_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub error: String,
}

/// Result handed back to whoever triggered the run
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunResult {
    Success(RunSuccess),
    Failure(RunFailure),
}

impl RunResult {
    pub fn success(summary: &RunSummary) -> Self {
        RunResult::Success(RunSuccess {
            message: RUN_SUCCESS_MESSAGE.to_string(),
            timestamp: summary.started_at,
            processed_count: summary.processed_count(),
            pending_requests_count: summary.pending_requests,
            expired_count: summary.expired_count,
        })
    }

    pub fn failure(error: impl ToString) -> Self {
        RunResult::Failure(RunFailure {
            error: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            RunResult::Success(_) => 200,
            RunResult::Failure(_) => 500,
        }
    }
}

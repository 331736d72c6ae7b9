//! Persistence seam for the match runner.
//!
//! The processor only talks to storage through [`MatchStore`], so a run can be
//! driven against Postgres in production and an in-memory store in tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Chatroom, ConnectRequest, NewChatroom, Profile, RequestStatus, RequestType};

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// All requests of a type in a given status, in stored (creation) order
    async fn find_requests(
        &self,
        request_type: RequestType,
        status: RequestStatus,
    ) -> Result<Vec<ConnectRequest>>;

    /// Profiles eligible to be paired with `requester_id`: not the requester,
    /// sharing no chatroom with them, and holding their own pending request
    /// of `request_type`. Ordered by user id.
    async fn find_candidates(
        &self,
        requester_id: &str,
        request_type: RequestType,
    ) -> Result<Vec<Profile>>;

    /// Moves one pending request to `matched`. Errors if the request is
    /// missing or no longer pending.
    async fn mark_request_matched(
        &self,
        request_id: Uuid,
        matched_user_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Moves the oldest pending request of `user_id` to `matched`.
    /// Returns the id of the updated request, or None if the user had none.
    async fn mark_user_matched(
        &self,
        user_id: &str,
        request_type: RequestType,
        matched_user_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>>;

    /// Inserts a chatroom and returns it with its generated id
    async fn insert_chatroom(&self, chatroom: NewChatroom) -> Result<Chatroom>;

    /// Bulk-expires the given requests that are still pending and were
    /// created before `created_before`. Returns the number expired.
    async fn expire_requests(
        &self,
        request_ids: &[Uuid],
        created_before: DateTime<Utc>,
    ) -> Result<u64>;
}

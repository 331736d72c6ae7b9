// In-memory MatchStore for tests.
//
// Mirrors the Postgres queries closely enough to drive the processor, and can
// be told to fail specific calls so error paths are reachable.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    db::store::MatchStore,
    models::{Chatroom, ConnectRequest, NewChatroom, Profile, RequestStatus, RequestType},
};

#[derive(Debug, Default)]
struct State {
    profiles: Vec<Profile>,
    requests: Vec<ConnectRequest>,
    chatrooms: Vec<Chatroom>,
    /// Land in `requests` right after the next snapshot load
    late_requests: Vec<ConnectRequest>,
    /// Users whose pending requests get closed once a chatroom with them is inserted
    close_requests_on_chatroom_with: HashSet<String>,
    fail_find_requests: bool,
    fail_expire: bool,
    fail_candidates_for: HashSet<String>,
    fail_mark_matched_for: HashSet<String>,
    fail_insert_chatroom_with: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, user_id: &str) -> Self {
        self.state.lock().unwrap().profiles.push(Profile::new(user_id));
        self
    }

    /// Adds a profile plus a pending surprise-me request created `hours_ago`
    pub fn with_pending_user(self, user_id: &str, hours_ago: i64) -> Self {
        let created_at = Utc::now() - chrono::Duration::hours(hours_ago);
        {
            let mut state = self.state.lock().unwrap();
            if !state.profiles.iter().any(|p| p.user_id == user_id) {
                state.profiles.push(Profile::new(user_id));
            }
            state
                .requests
                .push(ConnectRequest::pending_surprise_me(user_id, created_at));
        }
        self
    }

    pub fn with_request(self, request: ConnectRequest) -> Self {
        self.state.lock().unwrap().requests.push(request);
        self
    }

    /// Adds a profile now and a pending request that only appears once the
    /// snapshot has been loaded
    pub fn with_request_after_snapshot(self, user_id: &str, hours_ago: i64) -> Self {
        let created_at = Utc::now() - chrono::Duration::hours(hours_ago);
        {
            let mut state = self.state.lock().unwrap();
            if !state.profiles.iter().any(|p| p.user_id == user_id) {
                state.profiles.push(Profile::new(user_id));
            }
            state
                .late_requests
                .push(ConnectRequest::pending_surprise_me(user_id, created_at));
        }
        self
    }

    /// Another writer expires the user's pending requests as soon as a
    /// chatroom including them is inserted
    pub fn closing_requests_on_chatroom_with(self, user_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .close_requests_on_chatroom_with
            .insert(user_id.to_string());
        self
    }

    pub fn with_existing_chatroom(self, a: &str, b: &str) -> Self {
        let room = NewChatroom::surprise_me(a, b).unwrap().into_chatroom(Uuid::new_v4());
        self.state.lock().unwrap().chatrooms.push(room);
        self
    }

    pub fn failing_find_requests(self) -> Self {
        self.state.lock().unwrap().fail_find_requests = true;
        self
    }

    pub fn failing_expire(self) -> Self {
        self.state.lock().unwrap().fail_expire = true;
        self
    }

    pub fn failing_candidates_for(self, user_id: &str) -> Self {
        self.state.lock().unwrap().fail_candidates_for.insert(user_id.to_string());
        self
    }

    pub fn failing_mark_matched_for(self, user_id: &str) -> Self {
        self.state.lock().unwrap().fail_mark_matched_for.insert(user_id.to_string());
        self
    }

    /// Fails chatroom inserts that include `user_id` as a participant
    pub fn failing_insert_chatroom_with(self, user_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_insert_chatroom_with
            .insert(user_id.to_string());
        self
    }

    pub fn requests(&self) -> Vec<ConnectRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_for(&self, user_id: &str) -> Vec<ConnectRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    /// Status of the user's first request
    pub fn status_of(&self, user_id: &str) -> Option<RequestStatus> {
        self.requests_for(user_id).first().map(|r| r.status)
    }

    pub fn chatrooms(&self) -> Vec<Chatroom> {
        self.state.lock().unwrap().chatrooms.clone()
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn find_requests(
        &self,
        request_type: RequestType,
        status: RequestStatus,
    ) -> Result<Vec<ConnectRequest>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_find_requests {
            return Err(anyhow::anyhow!("connection refused"));
        }

        let snapshot = state
            .requests
            .iter()
            .filter(|r| r.request_type == request_type && r.status == status)
            .cloned()
            .collect();

        let late = std::mem::take(&mut state.late_requests);
        state.requests.extend(late);

        Ok(snapshot)
    }

    async fn find_candidates(
        &self,
        requester_id: &str,
        request_type: RequestType,
    ) -> Result<Vec<Profile>> {
        let state = self.state.lock().unwrap();
        if state.fail_candidates_for.contains(requester_id) {
            return Err(anyhow::anyhow!("candidate query failed for {}", requester_id));
        }

        let mut candidates: Vec<Profile> = state
            .profiles
            .iter()
            .filter(|p| p.user_id != requester_id)
            .filter(|p| {
                !state
                    .chatrooms
                    .iter()
                    .any(|c| c.has_participant(requester_id) && c.has_participant(&p.user_id))
            })
            .filter(|p| {
                state.requests.iter().any(|r| {
                    r.user_id == p.user_id && r.request_type == request_type && r.is_pending()
                })
            })
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        Ok(candidates)
    }

    async fn mark_request_matched(
        &self,
        request_id: Uuid,
        matched_user_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let fail_for = state.fail_mark_matched_for.clone();

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == request_id && r.is_pending())
            .ok_or_else(|| anyhow::anyhow!("Request {} was not pending", request_id))?;

        if fail_for.contains(&request.user_id) {
            return Err(anyhow::anyhow!("update failed for {}", request.user_id));
        }

        request.status = RequestStatus::Matched;
        request.matched_user_id = Some(matched_user_id.to_string());
        request.matched_at = Some(matched_at);
        Ok(())
    }

    async fn mark_user_matched(
        &self,
        user_id: &str,
        request_type: RequestType,
        matched_user_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mark_matched_for.contains(user_id) {
            return Err(anyhow::anyhow!("update failed for {}", user_id));
        }

        let request = state
            .requests
            .iter_mut()
            .filter(|r| r.user_id == user_id && r.request_type == request_type && r.is_pending())
            .min_by_key(|r| r.created_at);

        Ok(request.map(|request| {
            request.status = RequestStatus::Matched;
            request.matched_user_id = Some(matched_user_id.to_string());
            request.matched_at = Some(matched_at);
            request.id
        }))
    }

    async fn insert_chatroom(&self, chatroom: NewChatroom) -> Result<Chatroom> {
        let mut state = self.state.lock().unwrap();
        if chatroom
            .participants
            .iter()
            .any(|p| state.fail_insert_chatroom_with.contains(p))
        {
            return Err(anyhow::anyhow!("insert failed for {:?}", chatroom.participants));
        }

        let room = chatroom.into_chatroom(Uuid::new_v4());
        let closing: Vec<String> = room
            .participants
            .iter()
            .filter(|p| state.close_requests_on_chatroom_with.contains(*p))
            .cloned()
            .collect();
        for request in state.requests.iter_mut() {
            if closing.contains(&request.user_id) && request.is_pending() {
                request.status = RequestStatus::Expired;
            }
        }

        state.chatrooms.push(room.clone());
        Ok(room)
    }

    async fn expire_requests(
        &self,
        request_ids: &[Uuid],
        created_before: DateTime<Utc>,
    ) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        if state.fail_expire {
            return Err(anyhow::anyhow!("bulk update failed"));
        }

        let mut expired = 0;
        for request in state.requests.iter_mut() {
            if request_ids.contains(&request.id)
                && request.is_pending()
                && request.created_at < created_before
            {
                request.status = RequestStatus::Expired;
                expired += 1;
            }
        }

        Ok(expired)
    }
}

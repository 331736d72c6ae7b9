use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::store::MatchStore,
    models::{
        Chatroom, ChatroomRow, ConnectRequest, ConnectRequestRow, NewChatroom, Profile,
        RequestStatus, RequestType,
    },
};

#[derive(Debug, Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn find_requests(
        &self,
        request_type: RequestType,
        status: RequestStatus,
    ) -> Result<Vec<ConnectRequest>> {
        let rows = sqlx::query_as::<_, ConnectRequestRow>(
            r#"
            SELECT id, user_id, request_type, status, created_at, matched_user_id, matched_at
            FROM connect_requests
            WHERE request_type = $1 AND status = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(request_type.as_str())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ConnectRequest::try_from).collect()
    }

    async fn find_candidates(
        &self,
        requester_id: &str,
        request_type: RequestType,
    ) -> Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT p.user_id, p.display_name, p.location, p.created_at
            FROM profiles p
            WHERE p.user_id <> $1
            AND NOT EXISTS (
                SELECT 1 FROM chatrooms c
                WHERE $1 = ANY(c.participants) AND p.user_id = ANY(c.participants)
            )
            AND EXISTS (
                SELECT 1 FROM connect_requests r
                WHERE r.user_id = p.user_id AND r.request_type = $2 AND r.status = $3
            )
            ORDER BY p.user_id ASC
            "#,
        )
        .bind(requester_id)
        .bind(request_type.as_str())
        .bind(RequestStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    async fn mark_request_matched(
        &self,
        request_id: Uuid,
        matched_user_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE connect_requests
            SET status = $2, matched_user_id = $3, matched_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(request_id)
        .bind(RequestStatus::Matched.as_str())
        .bind(matched_user_id)
        .bind(matched_at)
        .bind(RequestStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!(
                "Request {} was not pending, nothing matched",
                request_id
            ));
        }

        Ok(())
    }

    async fn mark_user_matched(
        &self,
        user_id: &str,
        request_type: RequestType,
        matched_user_id: &str,
        matched_at: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE connect_requests
            SET status = $3, matched_user_id = $4, matched_at = $5
            WHERE id = (
                SELECT id FROM connect_requests
                WHERE user_id = $1 AND request_type = $2 AND status = $6
                ORDER BY created_at ASC
                LIMIT 1
            )
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(request_type.as_str())
        .bind(RequestStatus::Matched.as_str())
        .bind(matched_user_id)
        .bind(matched_at)
        .bind(RequestStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn insert_chatroom(&self, chatroom: NewChatroom) -> Result<Chatroom> {
        let row = sqlx::query_as::<_, ChatroomRow>(
            r#"
            INSERT INTO chatrooms (id, participants, type, category)
            VALUES ($1, $2, $3, $4)
            RETURNING id, participants, type, category, last_activity
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&chatroom.participants)
        .bind(chatroom.kind.as_str())
        .bind(&chatroom.category)
        .fetch_one(&self.pool)
        .await?;

        Chatroom::try_from(row)
    }

    async fn expire_requests(
        &self,
        request_ids: &[Uuid],
        created_before: DateTime<Utc>,
    ) -> Result<u64> {
        if request_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE connect_requests
            SET status = $1
            WHERE id = ANY($2) AND status = $3 AND created_at < $4
            "#,
        )
        .bind(RequestStatus::Expired.as_str())
        .bind(request_ids)
        .bind(RequestStatus::Pending.as_str())
        .bind(created_before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

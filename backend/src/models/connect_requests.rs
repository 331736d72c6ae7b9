use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "surpriseMe")]
    SurpriseMe,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::SurpriseMe => REQUEST_TYPE_SURPRISE_ME,
        }
    }
}

impl FromStr for RequestType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            REQUEST_TYPE_SURPRISE_ME => Ok(RequestType::SurpriseMe),
            other => Err(anyhow::anyhow!("Unknown request type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Matched,
    Expired,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => REQUEST_STATUS_PENDING,
            RequestStatus::Matched => REQUEST_STATUS_MATCHED,
            RequestStatus::Expired => REQUEST_STATUS_EXPIRED,
        }
    }
}

impl FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            REQUEST_STATUS_PENDING => Ok(RequestStatus::Pending),
            REQUEST_STATUS_MATCHED => Ok(RequestStatus::Matched),
            REQUEST_STATUS_EXPIRED => Ok(RequestStatus::Expired),
            other => Err(anyhow::anyhow!("Unknown request status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: String,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub matched_user_id: Option<String>,
    pub matched_at: Option<DateTime<Utc>>,
}

impl ConnectRequest {
    /// A fresh pending surprise-me request, as the app creates them
    pub fn pending_surprise_me(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            request_type: RequestType::SurpriseMe,
            status: RequestStatus::Pending,
            created_at,
            matched_user_id: None,
            matched_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Raw `connect_requests` row; enum columns are stored as text
#[derive(Debug, Clone, FromRow)]
pub struct ConnectRequestRow {
    pub id: Uuid,
    pub user_id: String,
    pub request_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub matched_user_id: Option<String>,
    pub matched_at: Option<DateTime<Utc>>,
}

impl TryFrom<ConnectRequestRow> for ConnectRequest {
    type Error = anyhow::Error;

    fn try_from(row: ConnectRequestRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            request_type: row.request_type.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
            matched_user_id: row.matched_user_id,
            matched_at: row.matched_at,
        })
    }
}

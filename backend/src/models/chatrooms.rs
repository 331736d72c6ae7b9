use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatroomType {
    Direct,
    Group,
}

impl ChatroomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatroomType::Direct => CHATROOM_TYPE_DIRECT,
            ChatroomType::Group => CHATROOM_TYPE_GROUP,
        }
    }
}

impl FromStr for ChatroomType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            CHATROOM_TYPE_DIRECT => Ok(ChatroomType::Direct),
            CHATROOM_TYPE_GROUP => Ok(ChatroomType::Group),
            other => Err(anyhow::anyhow!("Unknown chatroom type '{}'", other)),
        }
    }
}

/// Chatroom as handed to the downstream backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chatroom {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub participants: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ChatroomType,
    pub category: String,
}

impl Chatroom {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Participants sorted, so {A,B} and {B,A} compare equal
    pub fn pair_key(&self) -> Vec<String> {
        let mut key = self.participants.clone();
        key.sort();
        key
    }
}

/// A chatroom about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatroom {
    pub participants: Vec<String>,
    pub kind: ChatroomType,
    pub category: String,
}

impl NewChatroom {
    /// Direct room between a requester and the candidate picked for them
    pub fn surprise_me(requester_id: &str, candidate_id: &str) -> Result<Self> {
        if requester_id == candidate_id {
            return Err(anyhow::anyhow!(
                "Cannot create a chatroom for user {} with themselves",
                requester_id
            ));
        }

        Ok(Self {
            participants: vec![requester_id.to_string(), candidate_id.to_string()],
            kind: ChatroomType::Direct,
            category: CHATROOM_CATEGORY_SURPRISE_ME.to_string(),
        })
    }

    pub fn into_chatroom(self, id: Uuid) -> Chatroom {
        Chatroom {
            id,
            participants: self.participants,
            kind: self.kind,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatroomRow {
    pub id: Uuid,
    pub participants: Vec<String>,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub category: String,
    pub last_activity: DateTime<Utc>,
}

impl TryFrom<ChatroomRow> for Chatroom {
    type Error = anyhow::Error;

    fn try_from(row: ChatroomRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            participants: row.participants,
            kind: row.kind.parse()?,
            category: row.category,
        })
    }
}

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::models::Chatroom;

/// Tells the main backend which chatrooms a run created
#[async_trait]
pub trait MatchNotifier: Send + Sync {
    async fn notify(&self, chatrooms: &[Chatroom]) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct NotifyPayload<'a> {
    chatrooms: &'a [Chatroom],
}

/// POSTs `{ "chatrooms": [...] }` to the configured backend URL
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl MatchNotifier for HttpNotifier {
    async fn notify(&self, chatrooms: &[Chatroom]) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&NotifyPayload { chatrooms })
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach backend at {}: {}", self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Backend at {} answered {}: {}",
                self.url,
                status,
                body
            ));
        }

        tracing::debug!("Backend acknowledged {} chatroom(s) with {}", chatrooms.len(), status);
        Ok(())
    }
}

/// Used when a run should not reach the backend at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl MatchNotifier for NoopNotifier {
    async fn notify(&self, chatrooms: &[Chatroom]) -> Result<()> {
        tracing::info!("Skipping backend notification for {} chatroom(s)", chatrooms.len());
        Ok(())
    }
}

use tracing::{error, info};

use crate::{
    models::RunResult,
    services::{matcher::MatchProcessor, notifier::MatchNotifier},
};

/// Runs one matching pass and forwards the created chatrooms downstream.
///
/// Notification is best-effort: a failed POST is logged and the run still
/// reports success, since the match state is already committed.
pub async fn run_match_job(processor: &MatchProcessor, notifier: &dyn MatchNotifier) -> RunResult {
    let summary = match processor.run().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("❌ Match run failed: {}", e);
            return RunResult::failure(e);
        }
    };

    if summary.chatrooms.is_empty() {
        info!("📭 No chatrooms created, nothing to notify");
    } else {
        match notifier.notify(&summary.chatrooms).await {
            Ok(()) => info!("📨 Notified backend of {} new chatroom(s)", summary.chatrooms.len()),
            Err(e) => error!("❌ Failed to notify backend: {:#}", e),
        }
    }

    RunResult::success(&summary)
}

use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::error;

use crate::{
    db::MatchStore,
    models::RunResult,
    services::{run_match_job, MatchNotifier, MatchProcessor, MatchRunError, RandomSelector},
    utils::Config,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MatchStore>,
    pub notifier: Arc<dyn MatchNotifier>,
    pub config: Config,
}

/// Runs one matching pass. The request body is ignored.
pub async fn run_matches(State(state): State<AppState>) -> (StatusCode, Json<RunResult>) {
    let result = match state.config.matcher_config() {
        Ok(matcher_config) => {
            let processor = MatchProcessor::new(
                state.store.clone(),
                Arc::new(RandomSelector::from_seed_option(state.config.match_seed)),
                matcher_config,
            );
            run_match_job(&processor, state.notifier.as_ref()).await
        }
        Err(e) => {
            let e = MatchRunError::Config(e);
            error!("❌ {}", e);
            RunResult::failure(e)
        }
    };

    let status = StatusCode::from_u16(result.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(result))
}

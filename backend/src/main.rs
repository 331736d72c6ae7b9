use std::sync::Arc;
use surprise_matcher::{
    db::{self, DatabaseConfig, PgMatchStore},
    get_db_pool,
    handlers::{create_router, AppState},
    services::HttpNotifier,
    utils, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let state = AppState {
        store: Arc::new(PgMatchStore::new(pool)),
        notifier: Arc::new(HttpNotifier::new(config.require_notify_url()?)),
        config,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Match runner listening on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

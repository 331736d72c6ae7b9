use surprise_matcher::{utils, get_db_pool};
use surprise_matcher::db::DatabaseConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    info!("Creating connect request, chatroom and profile tables...");
    surprise_matcher::db::migrations::run_migrations(&pool).await?;
    info!("✅ Match tables are up to date");

    Ok(())
}

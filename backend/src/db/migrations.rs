use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

/// Creates the connect request, chatroom and profile tables if missing
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    info!("Applying {} match table migration(s)", migrator.iter().count());

    migrator
        .run(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}

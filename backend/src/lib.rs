pub mod constants;
pub mod db;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use utils::config::Config;
pub use db::connection::get_db_pool;

// Re-export common types
pub use sqlx::PgPool;
pub use anyhow::Result;
pub use uuid::Uuid;
pub use chrono::{DateTime, Utc};

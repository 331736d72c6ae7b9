pub mod connection;
pub mod migrations;
pub mod postgres;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use connection::{get_db_pool, DatabaseConfig};
pub use postgres::PgMatchStore;
pub use store::MatchStore;

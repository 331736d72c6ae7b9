use anyhow::{Context, Result};
use std::env;

use crate::constants::{DEFAULT_EXPIRY_THRESHOLD_HOURS, DEFAULT_SERVER_PORT};
use crate::services::matcher::MatcherConfig;

/// Runner settings. The database URL lives in `DatabaseConfig`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Only needed when created chatrooms are sent to the backend
    pub backend_notify_url: Option<String>,
    pub expiry_hours: i64,
    pub match_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            backend_notify_url: env::var("BACKEND_NOTIFY_URL").ok(),
            expiry_hours: match env::var("MATCH_EXPIRY_HOURS") {
                Ok(raw) => parse_expiry_hours(&raw)?,
                Err(_) => DEFAULT_EXPIRY_THRESHOLD_HOURS,
            },
            match_seed: match env::var("MATCH_RNG_SEED") {
                Ok(raw) => Some(raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("MATCH_RNG_SEED must be an unsigned integer, got '{}'", raw)
                })?),
                Err(_) => None,
            },
        })
    }

    pub fn matcher_config(&self) -> Result<MatcherConfig> {
        MatcherConfig::with_expiry_hours(self.expiry_hours)
    }

    pub fn require_notify_url(&self) -> Result<String> {
        self.backend_notify_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("BACKEND_NOTIFY_URL must be set"))
    }
}

fn parse_expiry_hours(raw: &str) -> Result<i64> {
    let hours: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("MATCH_EXPIRY_HOURS must be a whole number, got '{}'", raw))?;

    MatcherConfig::with_expiry_hours(hours).context("Invalid MATCH_EXPIRY_HOURS")?;

    Ok(hours)
}

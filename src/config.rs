// src/config.rs

use dotenvy::dotenv;
use std::env;

/// One week, the default cadence of the top-creator recompute job.
const DEFAULT_TOP_CREATOR_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub top_creator_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let top_creator_interval_secs = env::var("TOP_CREATOR_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOP_CREATOR_INTERVAL_SECS);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            top_creator_interval_secs,
        }
    }
}

// src/config.rs

use dotenvy::dotenv;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite://warbler.db?mode=rwc";

/// One week.
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Signs the session cookie.
    pub secret_key: String,
    pub session_ttl: u64,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let secret_key = env::var("SECRET_KEY").expect("SECRET_KEY must be set");

        let session_ttl = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Self {
            database_url,
            secret_key,
            session_ttl,
            rust_log,
            port,
        }
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; the service runs with built-in tables and an
/// in-memory usage store when nothing is set.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres usage store. In-memory store when absent.
    pub database_url: Option<String>,
    /// JSON benchmark rows replacing the built-in table.
    pub benchmark_table_path: Option<PathBuf>,
    /// JSON stage defaults overriding the built-in constants.
    pub stage_defaults_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            benchmark_table_path: optional_env("BENCHMARK_TABLE_PATH").map(PathBuf::from),
            stage_defaults_path: optional_env("STAGE_DEFAULTS_PATH").map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset and blank are the same thing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

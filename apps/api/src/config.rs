use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::resume::export::ExportTimings;
use crate::resume::sync::OverwritePolicy;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub export_timings: ExportTimings,
    pub overwrite_policy: OverwritePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ExportTimings::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            export_timings: ExportTimings {
                print_delay: millis_env("EXPORT_PRINT_DELAY_MS", defaults.print_delay)?,
                load_fallback: millis_env("EXPORT_LOAD_FALLBACK_MS", defaults.load_fallback)?,
                close_delay: millis_env("EXPORT_CLOSE_DELAY_MS", defaults.close_delay)?,
            },
            overwrite_policy: match std::env::var("RESUME_OVERWRITE_POLICY") {
                Ok(value) => value
                    .parse::<OverwritePolicy>()
                    .map_err(|e| anyhow!("RESUME_OVERWRITE_POLICY: {e}"))?,
                Err(_) => OverwritePolicy::default(),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn millis_env(key: &str, default: Duration) -> Result<Duration> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("{key} must be a number of milliseconds")),
        Err(_) => Ok(default),
    }
}

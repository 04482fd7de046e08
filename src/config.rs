//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on malformed values. Nothing is
//! required; every key has a default.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::lifecycle::LifecyclePolicy;

pub const DEFAULT_SEED_PATH: &str = "data/seed.toml";

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixture file loaded into the in-memory stores.
    pub seed_path: PathBuf,
    pub policy: LifecyclePolicy,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            seed_path: std::env::var("BARANGAY_SEED")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEED_PATH)),
            policy: LifecyclePolicy {
                clear_schedule_on_progress: bool_var("BARANGAY_CLEAR_SCHEDULE_ON_PROGRESS")?
                    .unwrap_or(false),
            },
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn bool_var(name: &str) -> Result<Option<bool>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(Error::Config(format!(
            "environment variable {name} must be a boolean, got {raw:?}"
        ))),
    }
}

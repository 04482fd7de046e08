//! Error types for barangay.
//!
//! Lifecycle outcomes (needs-input, rejected) are values, not errors; see
//! [`crate::lifecycle::TransitionResult`]. This enum covers the collaborators
//! around the engine: stores, fixtures, configuration, telemetry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} id prefix {prefix:?} matches {matches} records")]
    AmbiguousId {
        kind: &'static str,
        prefix: String,
        matches: usize,
    },

    #[error("{kind} already exists: {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("seed error: {0}")]
    Seed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

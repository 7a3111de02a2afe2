//! Unified error types for NameWatch.

use thiserror::Error;

/// Result type alias using NameWatchError.
pub type Result<T> = std::result::Result<T, NameWatchError>;

#[derive(Error, Debug)]
pub enum NameWatchError {
    // Availability lookup errors. Never evidence of availability either way.
    #[error("Probe error: {0}")]
    Probe(String),

    // Notification errors
    #[error("Delivery error: {0}")]
    Delivery(String),

    // State file errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl NameWatchError {
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

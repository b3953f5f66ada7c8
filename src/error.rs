//! Crate-level error type.
//!
//! The classifier and the trackers never fail on their own account; these
//! variants cover the surrounding plumbing (configuration, the HTTP front
//! door, report serialization).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("malformed HTTP request: {0}")]
    Http(String),

    #[error("request body of {declared} bytes exceeds the {limit} byte limit")]
    RequestTooLarge { declared: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, TutorError>;

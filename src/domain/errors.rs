//! Domain error types
//!
//! This module defines the error hierarchy for sqlport. The submission and
//! status-query taxonomies are closed: every failure of the remote exchange is
//! classified into one of their variants before it leaves the adapter layer,
//! so no HTTP client or XML parser type is exposed here.

use thiserror::Error;

/// Main sqlport error type
///
/// Used for configuration and setup failures. The outcome of an
/// orchestration run is reported through
/// [`OperationResult`](super::OperationResult), not through this type.
#[derive(Debug, Error)]
pub enum SqlPortError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/connection setup errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Failure to hand an export/import request to the service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Connection, TLS or timeout failure
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status
    #[error("Request rejected: {status_code} - {description}")]
    RemoteRejection { status_code: u16, description: String },

    /// The response carried no recognizable request identifier
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure of a single status query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// Connection, TLS, timeout or HTTP status failure
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response could not be read as a non-empty status list
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl PollError {
    /// Transport failures may clear up on their own; malformed responses will not
    pub fn is_transient(&self) -> bool {
        matches!(self, PollError::Transport(_))
    }
}

/// Why a run ended without a terminal status from the service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortCause {
    /// The request never reached the service
    #[error("{0}")]
    Submission(#[from] SubmissionError),

    /// Tracking stopped after a status query failed
    #[error("{0}")]
    Poll(#[from] PollError),

    /// The shutdown signal was raised while waiting
    #[error("Operation cancelled")]
    Cancelled,
}

// Conversion from std::io::Error
impl From<std::io::Error> for SqlPortError {
    fn from(err: std::io::Error) -> Self {
        SqlPortError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SqlPortError {
    fn from(err: serde_json::Error) -> Self {
        SqlPortError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SqlPortError {
    fn from(err: toml::de::Error) -> Self {
        SqlPortError::Configuration(format!("TOML parse error: {err}"))
    }
}

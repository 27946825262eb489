//! Failure classification for service exchanges
//!
//! Every failure of an HTTP exchange with the service is first described as a
//! [`WireFailure`], then folded into the closed taxonomy of the operation that
//! was running ([`SubmissionError`] or [`PollError`]).

use crate::domain::{PollError, SubmissionError};
use reqwest::StatusCode;

/// Longest response excerpt kept in an error description
const MAX_BODY_EXCERPT: usize = 200;

/// What went wrong underneath a single request/response exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFailure {
    /// The exchange did not complete: connect, TLS, timeout, body read
    Transport(String),
    /// The service answered with a non-success HTTP status
    Status { code: u16, description: String },
    /// The service answered successfully but the body was unusable
    Body(String),
}

impl WireFailure {
    /// Describes a reqwest failure
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "connection failed"
        } else if err.is_body() || err.is_decode() {
            "failed to read response body"
        } else {
            "request failed"
        };
        WireFailure::Transport(format!("{kind}: {err}"))
    }

    /// Describes a non-success HTTP response
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        let excerpt = excerpt(body);
        let description = if excerpt.is_empty() {
            reason.to_string()
        } else {
            format!("{reason}: {excerpt}")
        };
        WireFailure::Status {
            code: status.as_u16(),
            description,
        }
    }
}

impl From<WireFailure> for SubmissionError {
    fn from(failure: WireFailure) -> Self {
        match failure {
            WireFailure::Transport(message) => SubmissionError::Transport(message),
            WireFailure::Status { code, description } => SubmissionError::RemoteRejection {
                status_code: code,
                description,
            },
            WireFailure::Body(message) => SubmissionError::MalformedResponse(message),
        }
    }
}

impl From<WireFailure> for PollError {
    fn from(failure: WireFailure) -> Self {
        match failure {
            WireFailure::Transport(message) => PollError::Transport(message),
            // The status query has no rejection variant; a refused query is
            // retried or aborted like any other transport failure
            WireFailure::Status { code, description } => {
                PollError::Transport(format!("HTTP {code}: {description}"))
            }
            WireFailure::Body(message) => PollError::MalformedResponse(message),
        }
    }
}

/// Collapses whitespace and truncates a response body for error messages
fn excerpt(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_BODY_EXCERPT {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_BODY_EXCERPT).collect();
    truncated.push_str("...");
    truncated
}

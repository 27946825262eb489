//! Status snapshots and operation outcomes

use super::errors::AbortCause;
use super::ids::OperationHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status text the service reports once an operation finished successfully
pub const STATUS_COMPLETED: &str = "Completed";

/// Status text the service reports once an operation failed
pub const STATUS_FAILED: &str = "Failed";

/// Bookkeeping fields the service returns alongside the status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetails {
    pub request_id: Option<String>,
    pub request_type: Option<String>,
    pub server_name: Option<String>,
    pub queued_time: Option<String>,
    pub last_modified_time: Option<String>,
}

/// One point-in-time status record for a submitted request
///
/// The status text is kept exactly as the service sent it. Only the exact
/// strings `"Completed"` and `"Failed"` are terminal; comparisons are
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Free-form status text, e.g. `Pending`, `Running, Progress = 40%`
    pub status: String,

    /// Error reported by the service, usually only set for `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Blob URI for exports, database name for imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_location: Option<String>,

    #[serde(default)]
    pub details: StatusDetails,
}

impl StatusSnapshot {
    /// Creates a snapshot with only the status text set
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            error_message: None,
            result_location: None,
            details: StatusDetails::default(),
        }
    }

    /// Sets the error message
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Sets the result location
    pub fn with_result_location(mut self, location: impl Into<String>) -> Self {
        self.result_location = Some(location.into());
        self
    }

    /// True when the status is exactly `"Completed"`
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }

    /// True when the status is exactly `"Failed"`
    pub fn is_failed(&self) -> bool {
        self.status == STATUS_FAILED
    }

    /// True when no further polling should happen
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failed()
    }
}

/// The single outcome of one orchestration run
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// The service reported `Completed`; carries the result location if one was reported
    Success(Option<String>),

    /// The service reported `Failed`; carries its error message
    Failure(String),

    /// A local or transport problem stopped the run before a terminal status
    Aborted(AbortCause),

    /// Dry run: the serialized request body that would have been sent
    Preview(String),

    /// Non-blocking import: submitted, not tracked further
    Submitted(OperationHandle),
}

impl OperationResult {
    /// True for outcomes the remote service decided (`Success`/`Failure`)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationResult::Success(_) | OperationResult::Failure(_))
    }

    /// True for `Success`, `Preview` and `Submitted`
    pub fn is_ok(&self) -> bool {
        matches!(
            self,
            OperationResult::Success(_) | OperationResult::Preview(_) | OperationResult::Submitted(_)
        )
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationResult::Success(Some(location)) => write!(f, "Completed: {location}"),
            OperationResult::Success(None) => write!(f, "Completed"),
            OperationResult::Failure(message) => write!(f, "Failed: {message}"),
            OperationResult::Aborted(cause) => write!(f, "Aborted: {cause}"),
            OperationResult::Preview(_) => write!(f, "Dry run, request not submitted"),
            OperationResult::Submitted(handle) => write!(f, "Submitted request {handle}"),
        }
    }
}

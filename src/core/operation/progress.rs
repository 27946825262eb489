//! Progress events emitted while an operation runs
//!
//! The orchestrator never formats log lines itself. It reports what happened
//! through an optional [`ProgressCallback`]; the CLI wires that to
//! [`crate::logging::progress::log_progress`].

use crate::domain::{AbortCause, OperationHandle};

/// Progress events emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The service accepted the request
    Submitted { handle: OperationHandle },

    /// The reported status differs from the previous one
    StatusChanged {
        handle: OperationHandle,
        status: String,
        error_message: Option<String>,
    },

    /// The service reported `Completed`
    Succeeded {
        handle: OperationHandle,
        location: Option<String>,
    },

    /// The service reported `Failed`
    Failed {
        handle: OperationHandle,
        message: String,
    },

    /// The run stopped before a terminal status
    Aborted { cause: AbortCause },
}

/// Callback type for progress updates
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Invokes the callback if one is registered
pub(crate) fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

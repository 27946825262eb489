//! Log lines for orchestrator progress events

use crate::core::operation::{ProgressCallback, ProgressEvent};
use crate::domain::AbortCause;

/// Writes one log line for a progress event
pub fn log_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::Submitted { handle } => {
            tracing::info!(request_id = %handle, kind = %handle.kind(), "Request accepted");
        }
        ProgressEvent::StatusChanged {
            handle,
            status,
            error_message,
        } => match error_message {
            Some(message) => {
                tracing::info!(request_id = %handle, status = %status, error = %message, "Status changed")
            }
            None => tracing::info!(request_id = %handle, status = %status, "Status changed"),
        },
        ProgressEvent::Succeeded { handle, location } => {
            tracing::info!(
                request_id = %handle,
                location = location.as_deref().unwrap_or("unknown"),
                "{} complete",
                handle.kind().endpoint()
            );
        }
        ProgressEvent::Failed { handle, message } => {
            tracing::error!(
                request_id = %handle,
                error = %message,
                "{} failed",
                handle.kind().endpoint()
            );
        }
        ProgressEvent::Aborted { cause } => match cause {
            AbortCause::Cancelled => tracing::warn!("Operation cancelled before completion"),
            other => tracing::error!(error = %other, "Operation aborted"),
        },
    }
}

/// A progress callback that logs every event
pub fn progress_logger() -> ProgressCallback {
    Box::new(|event| log_progress(&event))
}

//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - Configurable log levels (`RUST_LOG` overrides the configured level)
//! - JSON file logging with daily or hourly rotation
//! - Log lines for orchestrator progress events ([`progress`])
//!
//! # Example
//!
//! ```no_run
//! use sqlport::logging::init_logging;
//! use sqlport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod progress;
pub mod structured;

// Re-export commonly used items
pub use progress::{log_progress, progress_logger};
pub use structured::{init_logging, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sqlport::log_error_with_context;
/// use sqlport::domain::SqlPortError;
///
/// let error = SqlPortError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use sqlport::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!(2, 3, Duration::from_millis(500), "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

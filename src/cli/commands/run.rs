//! Shared driver for the `export` and `import` commands

use crate::adapters::dac::models::redact_payload;
use crate::adapters::dac::DacClient;
use crate::config::load_config;
use crate::core::operation::{OperationMode, OperationOrchestrator, PollSettings};
use crate::domain::{AbortCause, OperationKind, OperationResult, SqlPortError};
use crate::log_error_with_context;
use crate::logging::progress_logger;
use std::sync::Arc;
use tokio::sync::watch;

/// Completed, previewed or submitted
pub const EXIT_SUCCESS: i32 = 0;
/// The service reported `Failed`
pub const EXIT_REMOTE_FAILURE: i32 = 1;
/// Configuration could not be loaded or is invalid
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Transport or response format problem stopped the run
pub const EXIT_ABORTED: i32 = 3;
/// Unexpected error
pub const EXIT_FATAL: i32 = 5;
/// Interrupted by SIGINT/SIGTERM
pub const EXIT_CANCELLED: i32 = 130;

/// Command-line options shared by `export` and `import`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub no_wait: bool,
    pub blob_uri: Option<String>,
}

/// Maps an operation outcome to a process exit code
pub fn exit_code(result: &OperationResult) -> i32 {
    match result {
        OperationResult::Success(_)
        | OperationResult::Preview(_)
        | OperationResult::Submitted(_) => EXIT_SUCCESS,
        OperationResult::Failure(_) => EXIT_REMOTE_FAILURE,
        OperationResult::Aborted(AbortCause::Cancelled) => EXIT_CANCELLED,
        OperationResult::Aborted(_) => EXIT_ABORTED,
    }
}

/// Loads configuration, runs one operation and reports its outcome
pub async fn run_operation(
    config_path: &str,
    kind: OperationKind,
    options: &RunOptions,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    tracing::info!(kind = %kind, "Starting {} command", kind);

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            log_error_with_context!(&e, "Failed to load configuration");
            eprintln!("❌ Failed to load configuration: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let dry_run = options.dry_run || config.application.dry_run;

    let client = match DacClient::new(&config.service) {
        Ok(c) => Arc::new(c),
        Err(e @ SqlPortError::Configuration(_)) => {
            log_error_with_context!(&e, "Invalid service endpoint");
            eprintln!("❌ {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }
        Err(e) => {
            log_error_with_context!(&e, "Failed to create service client");
            eprintln!("❌ Failed to initialize {kind}: {e}");
            return Ok(EXIT_FATAL);
        }
    };

    let mode = if options.no_wait {
        if kind == OperationKind::Export {
            tracing::warn!("--no-wait has no effect on exports, waiting for completion");
        }
        OperationMode::NonBlocking
    } else {
        OperationMode::Blocking
    };

    let orchestrator = OperationOrchestrator::new(
        client.clone(),
        client,
        PollSettings::from_config(&config.service),
        shutdown_signal,
    )
    .with_dry_run(dry_run)
    .with_progress(progress_logger());

    let request = config.operation_request(kind, options.blob_uri.as_deref());

    if dry_run {
        println!("🔍 DRY RUN MODE - the request will not be submitted");
        println!();
    } else {
        println!(
            "🚀 Starting {kind} of '{}' on {}...",
            request.connection().database_name,
            request.connection().server_name
        );
    }

    let result = orchestrator.run(&request, mode).await;
    print_outcome(kind, &result);

    Ok(exit_code(&result))
}

fn print_outcome(kind: OperationKind, result: &OperationResult) {
    match result {
        OperationResult::Success(location) => {
            println!("✅ {} complete", kind.endpoint());
            if let Some(location) = location {
                println!("   Location: {location}");
            }
        }
        OperationResult::Failure(message) => {
            println!("❌ {} failed: {message}", kind.endpoint());
        }
        OperationResult::Aborted(AbortCause::Cancelled) => {
            println!();
            println!("⚠️  Stopped tracking the request. The service may still complete it.");
        }
        OperationResult::Aborted(cause) => {
            println!("❌ {} aborted: {cause}", kind.endpoint());
        }
        OperationResult::Preview(payload) => {
            println!("Request body (secrets redacted):");
            println!("{}", redact_payload(payload));
        }
        OperationResult::Submitted(handle) => {
            println!("✅ {} submitted", kind.endpoint());
            println!("   Request id: {handle}");
            println!("   Check progress with: sqlport status --request-id {handle} --kind {kind}");
        }
    }
}

//! Status command implementation
//!
//! This module implements the `status` command, a single status query for a
//! request submitted earlier (e.g. by `import --no-wait`).

use super::run::{EXIT_ABORTED, EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_REMOTE_FAILURE, EXIT_SUCCESS};
use crate::adapters::dac::{DacClient, StatusPoller};
use crate::config::load_config;
use crate::domain::{OperationHandle, OperationKind, StatusSnapshot};
use crate::log_error_with_context;
use clap::{Args, ValueEnum};

/// Request kind, which decides what the result location means
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestKind {
    #[default]
    Export,
    Import,
}

impl From<RequestKind> for OperationKind {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Export => OperationKind::Export,
            RequestKind::Import => OperationKind::Import,
        }
    }
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Request id returned when the request was submitted
    #[arg(long)]
    pub request_id: String,

    /// Kind of the submitted request
    #[arg(long, value_enum, default_value_t = RequestKind::Export)]
    pub kind: RequestKind,

    /// Print the status record as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(request_id = %self.request_id, "Checking request status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let handle = match OperationHandle::new(self.request_id.as_str(), self.kind.into()) {
            Ok(h) => h,
            Err(e) => {
                println!("❌ Invalid request id: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let client = match DacClient::new(&config.service) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to create service client");
                println!("❌ Failed to create service client: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let credentials = config.connection_info().status_credentials();
        let snapshot = match client.poll(&handle, &credentials).await {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(&e, "Status query failed");
                println!("❌ Status query failed: {e}");
                return Ok(EXIT_ABORTED);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            print_snapshot(&handle, &snapshot);
        }

        Ok(if snapshot.is_failed() {
            EXIT_REMOTE_FAILURE
        } else {
            EXIT_SUCCESS
        })
    }
}

fn print_snapshot(handle: &OperationHandle, snapshot: &StatusSnapshot) {
    println!("📊 Request Status");
    println!();
    println!("  Request id: {handle}");
    println!("  Status: {}", snapshot.status);
    if let Some(message) = &snapshot.error_message {
        println!("  Error: {message}");
    }
    if let Some(location) = &snapshot.result_location {
        println!("  Location: {location}");
    }

    let details = &snapshot.details;
    let rows = [
        ("Request type", &details.request_type),
        ("Server", &details.server_name),
        ("Queued", &details.queued_time),
        ("Last modified", &details.last_modified_time),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("  {label}: {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind_conversion() {
        assert_eq!(OperationKind::from(RequestKind::Export), OperationKind::Export);
        assert_eq!(OperationKind::from(RequestKind::Import), OperationKind::Import);
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = StatusArgs {
            request_id: "abc".to_string(),
            kind: RequestKind::Export,
            json: false,
        };
        let code = args.execute("/nonexistent/sqlport.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }
}

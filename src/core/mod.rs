//! Core business logic for sqlport.
//!
//! # Modules
//!
//! - [`operation`] - Submit/poll/result orchestration for exports and imports
//!
//! # Operation Workflow
//!
//! 1. **Build**: Turn configuration into an [`OperationRequest`](crate::domain::OperationRequest)
//! 2. **Submit**: Send it to the import/export service and receive a request id
//! 3. **Poll**: Query the request status at a fixed interval
//! 4. **Report**: Return `Success`, `Failure` or `Aborted`
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlport::adapters::dac::DacClient;
//! use sqlport::config::load_config;
//! use sqlport::core::operation::{OperationMode, OperationOrchestrator, PollSettings};
//! use sqlport::domain::OperationKind;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration
//! let config = load_config("sqlport.toml")?;
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let client = Arc::new(DacClient::new(&config.service)?);
//! let orchestrator = OperationOrchestrator::new(
//!     client.clone(),
//!     client,
//!     PollSettings::from_config(&config.service),
//!     shutdown_rx,
//! );
//!
//! let request = config.operation_request(OperationKind::Import, None);
//! let result = orchestrator.run(&request, OperationMode::Blocking).await;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod operation;

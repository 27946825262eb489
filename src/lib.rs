// sqlport - Azure SQL Database Import/Export Orchestrator
// Copyright (c) 2025 sqlport Contributors
// Licensed under the MIT License

//! # sqlport - Azure SQL Database Import/Export
//!
//! sqlport drives the Azure DAC import/export service: it submits an export
//! (database to bacpac blob) or import (bacpac blob to database) request,
//! polls the service until it reports a terminal status, and returns a single
//! outcome.
//!
//! ## Overview
//!
//! - **Submitting** `ExportInput`/`ImportInput` requests to a regional endpoint
//! - **Polling** the request status at a fixed interval
//! - **Reporting** `Success`, `Failure`, `Aborted`, `Preview` (dry run) or
//!   `Submitted` (non-blocking import)
//!
//! ## Architecture
//!
//! sqlport follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Submit/poll/result orchestration
//! - [`adapters`] - The DAC import/export service client
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and progress reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sqlport::adapters::dac::DacClient;
//! use sqlport::config::load_config;
//! use sqlport::core::operation::{OperationMode, OperationOrchestrator, PollSettings};
//! use sqlport::domain::{OperationKind, OperationResult};
//! use sqlport::logging::progress_logger;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("sqlport.toml")?;
//!     let client = Arc::new(DacClient::new(&config.service)?);
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let orchestrator = OperationOrchestrator::new(
//!         client.clone(),
//!         client,
//!         PollSettings::from_config(&config.service),
//!         shutdown_rx,
//!     )
//!     .with_progress(progress_logger());
//!
//!     let request = config.operation_request(OperationKind::Export, None);
//!     match orchestrator.run(&request, OperationMode::Blocking).await {
//!         OperationResult::Success(location) => println!("Exported to {location:?}"),
//!         other => println!("{other}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Setup problems use [`domain::SqlPortError`]. A run itself never returns an
//! error: a remote `Failed` status is [`domain::OperationResult::Failure`],
//! while transport and format problems end in
//! [`domain::OperationResult::Aborted`] with an [`domain::AbortCause`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

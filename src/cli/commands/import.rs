//! Import command implementation
//!
//! This module implements the `import` command, which creates the configured
//! database from a bacpac blob. With `--no-wait` the command returns as soon
//! as the service has accepted the request.

use super::run::{run_operation, RunOptions};
use crate::domain::OperationKind;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Dry run mode - print the request instead of submitting it
    #[arg(long)]
    pub dry_run: bool,

    /// Return after submission and print the request id
    #[arg(long)]
    pub no_wait: bool,

    /// Blob to import from, overriding the configured template
    #[arg(long, value_name = "URI")]
    pub blob_uri: Option<String>,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let options = RunOptions {
            dry_run: self.dry_run,
            no_wait: self.no_wait,
            blob_uri: self.blob_uri.clone(),
        };
        run_operation(config_path, OperationKind::Import, &options, shutdown_signal).await
    }
}

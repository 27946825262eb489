//! Export command implementation
//!
//! This module implements the `export` command, which exports the configured
//! database to a bacpac blob and waits for the service to finish.

use super::run::{run_operation, RunOptions};
use crate::domain::OperationKind;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dry run mode - print the request instead of submitting it
    #[arg(long)]
    pub dry_run: bool,

    /// Accepted for symmetry with `import`; exports are always tracked to completion
    #[arg(long)]
    pub no_wait: bool,

    /// Override the blob URI template (`{0}` database name, `{1}` UTC ticks)
    #[arg(long, value_name = "TEMPLATE")]
    pub blob_uri: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
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
        run_operation(config_path, OperationKind::Export, &options, shutdown_signal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs {
            dry_run: false,
            no_wait: false,
            blob_uri: None,
        };

        assert!(!args.dry_run);
        assert!(!args.no_wait);
        assert!(args.blob_uri.is_none());
    }
}

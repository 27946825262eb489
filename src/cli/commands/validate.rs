//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the sqlport configuration file.

use super::run::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::{load_config, SqlPortConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `load_config` validates as it loads, so any error here is reported as
    /// a configuration error.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_CONFIG_ERROR)
            }
        }
    }
}

/// Prints the effective settings; secrets are never shown
fn print_summary(config: &SqlPortConfig) {
    println!("Configuration Summary:");
    println!("  Environment: {:?}", config.environment);
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  Service Endpoint: {}", config.service.endpoint);
    println!(
        "  Poll Interval: {}s (retries: {})",
        config.service.poll_interval_seconds, config.service.retry.max_retries
    );
    println!("  Server: {}", config.database.server_name);
    println!("  Database: {}", config.database.database_name);
    println!("  Username: {}", config.database.username);
    println!("  Password: ********");
    println!("  Storage Key: ********");
    println!("  Blob URI Template: {}", config.storage.blob_uri_template);
    println!(
        "  Import Target: {} edition, {} GB",
        config.import.edition, config.import.size_gb
    );
    println!();
}

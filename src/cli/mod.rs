//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for sqlport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// sqlport - Azure SQL database import/export via the DAC service
#[derive(Parser, Debug)]
#[command(name = "sqlport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sqlport.toml", env = "SQLPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SQLPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the configured database to a bacpac blob
    Export(commands::export::ExportArgs),

    /// Import a bacpac blob into the configured database
    Import(commands::import::ImportArgs),

    /// Query the status of a submitted request once
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

//! Configuration schema types
//!
//! This module defines the configuration structure for sqlport.

use crate::config::SecretString;
use crate::domain::{BlobTarget, ConnectionInfo, ImportSettings, OperationKind, OperationRequest};
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main sqlport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlPortConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Import/export service endpoint and polling behaviour
    pub service: ServiceConfig,

    /// SQL server connection
    pub database: DatabaseConfig,

    /// Blob storage target
    pub storage: StorageConfig,

    /// Import-only target settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SqlPortConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.service.validate(&self.environment)?;
        self.database.validate()?;
        self.storage.validate()?;
        self.import.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Connection details for requests built from this configuration
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::new(
            self.database.server_name.clone(),
            self.database.database_name.clone(),
            self.database.username.clone(),
            self.database.password.clone(),
        )
    }

    /// Builds an export or import request
    ///
    /// `blob_uri` replaces the configured URI template when given.
    pub fn operation_request(&self, kind: OperationKind, blob_uri: Option<&str>) -> OperationRequest {
        let template = blob_uri.unwrap_or(&self.storage.blob_uri_template);
        let blob = BlobTarget::new(self.storage.access_key.clone(), template);

        match kind {
            OperationKind::Export => OperationRequest::export(self.connection_info(), blob),
            OperationKind::Import => OperationRequest::import(
                self.connection_info(),
                blob,
                ImportSettings {
                    edition: self.import.edition.clone(),
                    size_gb: self.import.size_gb,
                },
            ),
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (build and show requests without submitting them)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration for transient status-query failures
///
/// With `max_retries = 0` (the default) the first transport failure while
/// tracking an operation aborts the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts per failed status query
    #[serde(default)]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 20 {
            return Err(format!(
                "service.retry.max_retries must be at most 20, got {}",
                self.max_retries
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "service.retry.backoff_multiplier must be at least 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("service.retry.initial_delay_ms cannot exceed max_delay_ms".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Import/export service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URI of the regional DAC import/export endpoint, e.g.
    /// `https://by1prod-dacsvc.azure.com/DACWebService.svc`
    pub endpoint: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Delay between status queries in seconds
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Retry policy for status queries
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ServiceConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("service.endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("service.endpoint must start with http:// or https://".to_string());
        }

        // Credentials travel in the status query string
        if *environment == Environment::Production && !self.endpoint.starts_with("https://") {
            return Err(
                "service.endpoint must use https:// in production environments".to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("service.timeout_seconds must be greater than 0".to_string());
        }

        if self.poll_interval_seconds == 0 || self.poll_interval_seconds > 600 {
            return Err(format!(
                "service.poll_interval_seconds must be between 1 and 600, got {}",
                self.poll_interval_seconds
            ));
        }

        self.retry.validate()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost/DACWebService.svc".to_string(),
            timeout_seconds: default_timeout_seconds(),
            poll_interval_seconds: default_poll_interval_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// SQL server connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Server name, e.g. `myserver.database.windows.net`
    pub server_name: String,

    /// Database to export from or import into
    pub database_name: String,

    /// SQL login
    pub username: String,

    /// SQL password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.server_name.trim().is_empty() {
            return Err("database.server_name cannot be empty".to_string());
        }
        if self.database_name.trim().is_empty() {
            return Err("database.database_name cannot be empty".to_string());
        }
        if self.username.trim().is_empty() {
            return Err("database.username cannot be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("database.password cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage account access key
    pub access_key: SecretString,

    /// Blob URI template; `{0}` is the database name, `{1}` the UTC ticks
    pub blob_uri_template: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.access_key.expose_secret().is_empty() {
            return Err("storage.access_key cannot be empty".to_string());
        }
        if !self.blob_uri_template.starts_with("http://")
            && !self.blob_uri_template.starts_with("https://")
        {
            return Err("storage.blob_uri_template must start with http:// or https://".to_string());
        }
        Ok(())
    }
}

/// Import target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Azure SQL edition of the imported database
    #[serde(default = "default_edition")]
    pub edition: String,

    /// Maximum database size in GB
    #[serde(default = "default_size_gb")]
    pub size_gb: u32,
}

impl ImportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.edition.trim().is_empty() {
            return Err("import.edition cannot be empty".to_string());
        }
        if self.size_gb == 0 {
            return Err("import.size_gb must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            edition: default_edition(),
            size_gb: default_size_gb(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    100
}

fn default_poll_interval_seconds() -> u64 {
    5
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_edition() -> String {
    "Web".to_string()
}

fn default_size_gb() -> u32 {
    1
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

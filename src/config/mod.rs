//! Configuration management for sqlport.
//!
//! sqlport reads a single TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SQLPORT_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [service]
//! endpoint = "https://by1prod-dacsvc.azure.com/DACWebService.svc"
//! poll_interval_seconds = 5
//!
//! [database]
//! server_name = "myserver.database.windows.net"
//! database_name = "orders"
//! username = "admin"
//! password = "${SQLPORT_DB_PASSWORD}"
//!
//! [storage]
//! access_key = "${SQLPORT_STORAGE_KEY}"
//! blob_uri_template = "https://acct.blob.core.windows.net/backups/{0}-{1}.bacpac"
//!
//! [import]
//! edition = "Web"
//! size_gb = 1
//! ```
//!
//! ```rust,no_run
//! use sqlport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sqlport.toml")?;
//! println!("Service: {}", config.service.endpoint);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseConfig, Environment, ImportConfig, LoggingConfig, RetryConfig,
    ServiceConfig, SqlPortConfig, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SqlPortConfig;
use super::secret::secret_string;
use crate::domain::errors::SqlPortError;
use crate::domain::result::Result;
use regex::{Captures, Regex};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SqlPortConfig
/// 4. Applies environment variable overrides (SQLPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SqlPortError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use sqlport::config::loader::load_config;
///
/// let config = load_config("sqlport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SqlPortConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SqlPortError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SqlPortError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SqlPortConfig = toml::from_str(&contents)
        .map_err(|e| SqlPortError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SqlPortError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Values are escaped for a TOML basic
/// string, so quotes and backslashes in a secret survive parsing.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SqlPortError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed_line = re.replace_all(line, |cap: &Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => escape_toml_value(&value),
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        lines.push(processed_line.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(SqlPortError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Escapes a substituted value for use inside a TOML basic string
fn escape_toml_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Parses a boolean override; `true`/`false` and `1`/`0` are accepted
fn parse_bool_override(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(SqlPortError::Configuration(format!(
            "{name} must be true or false, got '{value}'"
        ))),
    }
}

/// Parses a numeric override
fn parse_override<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e| {
        SqlPortError::Configuration(format!("{name} has an invalid value '{value}': {e}"))
    })
}

/// Applies environment variable overrides using the SQLPORT_* prefix
///
/// Environment variables follow the pattern: SQLPORT_<SECTION>_<KEY>
/// For example: SQLPORT_SERVICE_ENDPOINT, SQLPORT_DATABASE_PASSWORD
///
/// # Errors
///
/// Returns [`SqlPortError::Configuration`] if a boolean or numeric override
/// cannot be parsed.
fn apply_env_overrides(config: &mut SqlPortConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("SQLPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SQLPORT_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_bool_override("SQLPORT_APPLICATION_DRY_RUN", &val)?;
    }

    // Service overrides
    if let Ok(val) = std::env::var("SQLPORT_SERVICE_ENDPOINT") {
        config.service.endpoint = val;
    }
    if let Ok(val) = std::env::var("SQLPORT_SERVICE_TIMEOUT_SECONDS") {
        config.service.timeout_seconds = parse_override("SQLPORT_SERVICE_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("SQLPORT_SERVICE_POLL_INTERVAL_SECONDS") {
        config.service.poll_interval_seconds =
            parse_override("SQLPORT_SERVICE_POLL_INTERVAL_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("SQLPORT_SERVICE_RETRY_MAX_RETRIES") {
        config.service.retry.max_retries =
            parse_override("SQLPORT_SERVICE_RETRY_MAX_RETRIES", &val)?;
    }

    // Database overrides
    if let Ok(val) = std::env::var("SQLPORT_DATABASE_SERVER_NAME") {
        config.database.server_name = val;
    }
    if let Ok(val) = std::env::var("SQLPORT_DATABASE_DATABASE_NAME") {
        config.database.database_name = val;
    }
    if let Ok(val) = std::env::var("SQLPORT_DATABASE_USERNAME") {
        config.database.username = val;
    }
    if let Ok(val) = std::env::var("SQLPORT_DATABASE_PASSWORD") {
        config.database.password = secret_string(val);
    }

    // Storage overrides
    if let Ok(val) = std::env::var("SQLPORT_STORAGE_ACCESS_KEY") {
        config.storage.access_key = secret_string(val);
    }
    if let Ok(val) = std::env::var("SQLPORT_STORAGE_BLOB_URI_TEMPLATE") {
        config.storage.blob_uri_template = val;
    }

    // Import overrides
    if let Ok(val) = std::env::var("SQLPORT_IMPORT_EDITION") {
        config.import.edition = val;
    }
    if let Ok(val) = std::env::var("SQLPORT_IMPORT_SIZE_GB") {
        config.import.size_gb = parse_override("SQLPORT_IMPORT_SIZE_GB", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SQLPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled =
            parse_bool_override("SQLPORT_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("SQLPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

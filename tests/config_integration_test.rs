//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold `ENV_MUTEX` to avoid
//! interference between tests.

use secrecy::ExposeSecret;
use sqlport::config::{load_config, Environment};
use sqlport::domain::{OperationKind, SqlPortError};
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const MINIMAL_CONFIG: &str = r#"
[service]
endpoint = "https://by1prod-dacsvc.azure.com/DACWebService.svc"

[database]
server_name = "srv.database.windows.net"
database_name = "orders"
username = "admin"
password = "db-pass"

[storage]
access_key = "storage-key"
blob_uri_template = "https://acct.blob.core.windows.net/backups/{0}-{1}.bacpac"
"#;

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("SQLPORT_APPLICATION_LOG_LEVEL");
    std::env::remove_var("SQLPORT_APPLICATION_DRY_RUN");
    std::env::remove_var("SQLPORT_SERVICE_POLL_INTERVAL_SECONDS");
    std::env::remove_var("SQLPORT_DATABASE_DATABASE_NAME");
    std::env::remove_var("SQLPORT_DATABASE_PASSWORD");
    std::env::remove_var("SQLPORT_IMPORT_SIZE_GB");
    std::env::remove_var("TEST_SQLPORT_DB_PASSWORD");
    std::env::remove_var("TEST_SQLPORT_STORAGE_KEY");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
environment = "production"

[application]
log_level = "debug"
dry_run = true

[service]
endpoint = "https://db3prod-dacsvc.azure.com/DACWebService.svc"
timeout_seconds = 60
poll_interval_seconds = 10

[service.retry]
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 1.5

[database]
server_name = "srv.database.windows.net"
database_name = "orders"
username = "admin"
password = "db-pass"

[storage]
access_key = "storage-key"
blob_uri_template = "https://acct.blob.core.windows.net/backups/{0}-{1}.bacpac"

[import]
edition = "Standard"
size_gb = 10

[logging]
local_enabled = true
local_path = "/var/log/sqlport"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.service.timeout_seconds, 60);
    assert_eq!(config.service.poll_interval_seconds, 10);
    assert_eq!(config.service.retry.max_retries, 3);
    assert_eq!(config.service.retry.backoff_multiplier, 1.5);
    assert_eq!(config.database.password.expose_secret().as_str(), "db-pass");
    assert_eq!(config.import.edition, "Standard");
    assert_eq!(config.import.size_gb, 10);
    assert_eq!(config.logging.local_rotation, "hourly");

    let request = config.operation_request(OperationKind::Import, None);
    let settings = request.import_settings().unwrap();
    assert_eq!(settings.edition, "Standard");
    assert_eq!(settings.size_gb, 10);
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(MINIMAL_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.service.timeout_seconds, 100);
    assert_eq!(config.service.poll_interval_seconds, 5);
    assert_eq!(config.service.retry.max_retries, 0);
    assert_eq!(config.import.edition, "Web");
    assert_eq!(config.import.size_gb, 1);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    std::env::set_var("TEST_SQLPORT_DB_PASSWORD", "from-env");
    std::env::set_var("TEST_SQLPORT_STORAGE_KEY", "key-from-env");

    let contents = MINIMAL_CONFIG
        .replace("\"db-pass\"", "\"${TEST_SQLPORT_DB_PASSWORD}\"")
        .replace("\"storage-key\"", "\"${TEST_SQLPORT_STORAGE_KEY}\"");
    let file = write_config(&contents);

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.database.password.expose_secret().as_str(), "from-env");
    assert_eq!(
        config.storage.access_key.expose_secret().as_str(),
        "key-from-env"
    );

    cleanup_env_vars();
}

#[test]
fn test_env_var_substitution_with_quotes_and_backslashes() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    std::env::set_var("TEST_SQLPORT_DB_PASSWORD", r#"pa"ss\word"#);

    let contents = MINIMAL_CONFIG.replace("\"db-pass\"", "\"${TEST_SQLPORT_DB_PASSWORD}\"");
    let file = write_config(&contents);

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.database.password.expose_secret().as_str(),
        r#"pa"ss\word"#
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let contents = MINIMAL_CONFIG.replace("\"db-pass\"", "\"${TEST_SQLPORT_DB_PASSWORD}\"");
    let file = write_config(&contents);

    match load_config(file.path()) {
        Err(SqlPortError::Configuration(message)) => {
            assert!(message.contains("TEST_SQLPORT_DB_PASSWORD"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    std::env::set_var("SQLPORT_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("SQLPORT_SERVICE_POLL_INTERVAL_SECONDS", "30");
    std::env::set_var("SQLPORT_DATABASE_DATABASE_NAME", "orders_copy");
    std::env::set_var("SQLPORT_DATABASE_PASSWORD", "override-pass");
    std::env::set_var("SQLPORT_IMPORT_SIZE_GB", "5");

    let file = write_config(MINIMAL_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.service.poll_interval_seconds, 30);
    assert_eq!(config.database.database_name, "orders_copy");
    assert_eq!(
        config.database.password.expose_secret().as_str(),
        "override-pass"
    );
    assert_eq!(config.import.size_gb, 5);

    cleanup_env_vars();
}

#[test]
fn test_boolean_override_accepts_digits() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    std::env::set_var("SQLPORT_APPLICATION_DRY_RUN", "1");

    let file = write_config(MINIMAL_CONFIG);
    let config = load_config(file.path()).unwrap();
    assert!(config.application.dry_run);

    cleanup_env_vars();
}

#[test]
fn test_unparsable_overrides_are_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();

    for (name, value) in [
        ("SQLPORT_APPLICATION_DRY_RUN", "maybe"),
        ("SQLPORT_SERVICE_POLL_INTERVAL_SECONDS", "soon"),
    ] {
        cleanup_env_vars();
        std::env::set_var(name, value);

        let file = write_config(MINIMAL_CONFIG);
        match load_config(file.path()) {
            Err(SqlPortError::Configuration(message)) => assert!(message.contains(name)),
            other => panic!("expected configuration error for {name}, got {other:?}"),
        }
    }

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        MINIMAL_CONFIG.replace(
            "[service]\n",
            "[service]\npoll_interval_seconds = 0\n",
        ),
        MINIMAL_CONFIG.replace("https://by1prod", "ftp://by1prod"),
        format!("environment = \"production\"\n{}", MINIMAL_CONFIG.replace("https://", "http://")),
        MINIMAL_CONFIG.replace("database_name = \"orders\"", "database_name = \"\""),
        format!("{MINIMAL_CONFIG}\n[application]\nlog_level = \"verbose\"\n"),
    ];

    for contents in cases {
        let file = write_config(&contents);
        let result = load_config(file.path());
        assert!(
            matches!(result, Err(SqlPortError::Configuration(_))),
            "config should be rejected:\n{contents}"
        );
    }
}

#[test]
fn test_missing_config_file() {
    let result = load_config("/nonexistent/sqlport.toml");
    assert!(matches!(result, Err(SqlPortError::Configuration(_))));
}

#[test]
fn test_blob_uri_override() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(MINIMAL_CONFIG);
    let config = load_config(file.path()).unwrap();

    let request = config.operation_request(
        OperationKind::Import,
        Some("https://acct.blob.core.windows.net/backups/orders-123.bacpac"),
    );
    assert_eq!(
        request.blob_uri(),
        "https://acct.blob.core.windows.net/backups/orders-123.bacpac"
    );
}

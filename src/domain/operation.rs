//! Export and import operation requests
//!
//! An [`OperationRequest`] captures everything the import/export service needs
//! to start one attempt: where the database lives, the credentials to reach
//! it, and the blob storage location that receives (export) or supplies
//! (import) the `.bacpac` file.

use crate::config::SecretString;
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// .NET ticks (100 ns intervals since 0001-01-01) at the Unix epoch
const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;

/// Which of the two service operations a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Database to blob storage
    Export,
    /// Blob storage to database
    Import,
}

impl OperationKind {
    /// Path segment of the submission endpoint (`/Export` or `/Import`)
    pub fn endpoint(&self) -> &'static str {
        match self {
            OperationKind::Export => "Export",
            OperationKind::Import => "Import",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Export => write!(f, "export"),
            OperationKind::Import => write!(f, "import"),
        }
    }
}

/// SQL server connection details sent with every request
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Fully qualified server name, e.g. `myserver.database.windows.net`
    pub server_name: String,
    /// Database to export from or import into
    pub database_name: String,
    /// SQL login
    pub username: String,
    /// SQL password
    pub password: SecretString,
}

impl ConnectionInfo {
    /// Creates connection details
    pub fn new(
        server_name: impl Into<String>,
        database_name: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            database_name: database_name.into(),
            username: username.into(),
            password,
        }
    }

    /// The subset of connection details the status endpoint asks for
    pub fn status_credentials(&self) -> StatusCredentials {
        StatusCredentials {
            server_name: self.server_name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Credentials passed as query parameters to the status endpoint
#[derive(Debug, Clone)]
pub struct StatusCredentials {
    /// Server the request was submitted for
    pub server_name: String,
    /// SQL login
    pub username: String,
    /// SQL password
    pub password: SecretString,
}

/// Blob storage location for the `.bacpac` file
#[derive(Debug, Clone)]
pub struct BlobTarget {
    /// Storage account access key
    pub storage_key: SecretString,
    /// URI template; `{0}` is replaced by the database name and `{1}` by the
    /// request timestamp in UTC ticks. `{database}` and `{ticks}` are accepted
    /// as named aliases.
    pub uri_template: String,
}

impl BlobTarget {
    /// Creates a blob target
    pub fn new(storage_key: SecretString, uri_template: impl Into<String>) -> Self {
        Self {
            storage_key,
            uri_template: uri_template.into(),
        }
    }

    /// Formats the URI template for a database and point in time
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlport::config::secret_string;
    /// use sqlport::domain::BlobTarget;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let target = BlobTarget::new(
    ///     secret_string("key".to_string()),
    ///     "https://acct.blob.core.windows.net/backups/{0}-{1}.bacpac",
    /// );
    /// let at = Utc.timestamp_opt(0, 0).unwrap();
    /// assert_eq!(
    ///     target.resolve("orders", at),
    ///     "https://acct.blob.core.windows.net/backups/orders-621355968000000000.bacpac"
    /// );
    /// ```
    pub fn resolve(&self, database_name: &str, at: DateTime<Utc>) -> String {
        static PLACEHOLDERS: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDERS.get_or_init(|| {
            Regex::new(r"\{(0|1|database|ticks)\}").expect("placeholder pattern is valid")
        });

        // Single pass: substituted values are never scanned again
        let ticks = utc_ticks(at).to_string();
        re.replace_all(&self.uri_template, |caps: &Captures<'_>| match &caps[1] {
            "0" | "database" => database_name.to_string(),
            _ => ticks.clone(),
        })
        .into_owned()
    }
}

/// Converts a UTC timestamp to .NET ticks
pub fn utc_ticks(at: DateTime<Utc>) -> i64 {
    TICKS_AT_UNIX_EPOCH
        + at.timestamp() * 10_000_000
        + i64::from(at.timestamp_subsec_nanos() / 100)
}

/// Target settings that only apply to imports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Azure SQL edition of the database created by the import
    pub edition: String,
    /// Maximum database size in GB
    pub size_gb: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            edition: "Web".to_string(),
            size_gb: 1,
        }
    }
}

/// One export or import request, immutable once constructed
#[derive(Debug, Clone)]
pub struct OperationRequest {
    kind: OperationKind,
    connection: ConnectionInfo,
    blob: BlobTarget,
    import: Option<ImportSettings>,
    requested_at: DateTime<Utc>,
}

impl OperationRequest {
    /// Creates an export request stamped with the current time
    pub fn export(connection: ConnectionInfo, blob: BlobTarget) -> Self {
        Self {
            kind: OperationKind::Export,
            connection,
            blob,
            import: None,
            requested_at: Utc::now(),
        }
    }

    /// Creates an import request stamped with the current time
    pub fn import(connection: ConnectionInfo, blob: BlobTarget, settings: ImportSettings) -> Self {
        Self {
            kind: OperationKind::Import,
            connection,
            blob,
            import: Some(settings),
            requested_at: Utc::now(),
        }
    }

    /// Replaces the request timestamp used when formatting the blob URI
    pub fn requested_at(mut self, at: DateTime<Utc>) -> Self {
        self.requested_at = at;
        self
    }

    /// Operation kind
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Server connection details
    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    /// Blob storage target
    pub fn blob(&self) -> &BlobTarget {
        &self.blob
    }

    /// Import settings; `None` for exports
    pub fn import_settings(&self) -> Option<&ImportSettings> {
        self.import.as_ref()
    }

    /// Timestamp the blob URI is derived from
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// Blob URI for this attempt
    pub fn blob_uri(&self) -> String {
        self.blob
            .resolve(&self.connection.database_name, self.requested_at)
    }
}

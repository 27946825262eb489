//! Domain models and types for sqlport.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Requests** ([`OperationRequest`], [`ConnectionInfo`], [`BlobTarget`])
//! - **Correlation handles** ([`OperationHandle`])
//! - **Status and outcomes** ([`StatusSnapshot`], [`OperationResult`])
//! - **Error types** ([`SqlPortError`], [`SubmissionError`], [`PollError`], [`AbortCause`])
//!
//! # Example
//!
//! ```rust
//! use sqlport::config::secret_string;
//! use sqlport::domain::{BlobTarget, ConnectionInfo, OperationKind, OperationRequest};
//!
//! let request = OperationRequest::export(
//!     ConnectionInfo::new(
//!         "myserver.database.windows.net",
//!         "orders",
//!         "admin",
//!         secret_string("secret".to_string()),
//!     ),
//!     BlobTarget::new(
//!         secret_string("storage-key".to_string()),
//!         "https://acct.blob.core.windows.net/backups/{0}-{1}.bacpac",
//!     ),
//! );
//! assert_eq!(request.kind(), OperationKind::Export);
//! ```

pub mod errors;
pub mod ids;
pub mod operation;
pub mod result;
pub mod status;

// Re-export commonly used types for convenience
pub use errors::{AbortCause, PollError, SqlPortError, SubmissionError};
pub use ids::OperationHandle;
pub use operation::{
    BlobTarget, ConnectionInfo, ImportSettings, OperationKind, OperationRequest, StatusCredentials,
};
pub use result::Result;
pub use status::{OperationResult, StatusDetails, StatusSnapshot, STATUS_COMPLETED, STATUS_FAILED};

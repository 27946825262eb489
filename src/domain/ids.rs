//! Correlation identifiers issued by the import/export service
//!
//! The service answers a successful submission with a GUID that identifies the
//! request for every later status query. [`OperationHandle`] pairs that token
//! with the kind of operation it was issued for, so the status reader knows
//! which result field carries the outcome location.

use super::operation::OperationKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for one submitted export or import attempt
///
/// # Examples
///
/// ```
/// use sqlport::domain::{OperationHandle, OperationKind};
///
/// let handle = OperationHandle::new("abc-123", OperationKind::Export).unwrap();
/// assert_eq!(handle.as_str(), "abc-123");
/// assert_eq!(handle.kind(), OperationKind::Export);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationHandle {
    id: String,
    kind: OperationKind,
}

impl OperationHandle {
    /// Creates a handle from the request identifier returned by the service
    ///
    /// Surrounding whitespace is stripped; an empty identifier is rejected.
    pub fn new(id: impl Into<String>, kind: OperationKind) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Request identifier cannot be empty".to_string());
        }
        Ok(Self {
            id: trimmed.to_string(),
            kind,
        })
    }

    /// Returns the request identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// The operation kind this handle was issued for
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

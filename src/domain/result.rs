//! Result type alias for sqlport

use super::errors::SqlPortError;

/// Result type alias for sqlport operations
///
/// # Examples
///
/// ```
/// use sqlport::domain::result::Result;
/// use sqlport::domain::errors::SqlPortError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SqlPortError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SqlPortError>;

//! Error types for sqlkit

use thiserror::Error;

/// Result type alias for sqlkit operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for SQL compilation
#[derive(Debug, Error)]
pub enum QueryError {
    /// A mandatory field was blank or missing (field name, logic type, ...)
    #[error("Required field missing: {0}")]
    RequiredField(String),

    /// Structurally malformed input only the caller can fix
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Field names that failed column resolution during one full traversal.
    /// Carries every offender found, not just the first.
    #[error("Unresolved fields: {}", .0.join(", "))]
    UnresolvedFields(Vec<String>),

    /// The configured dialect identifier has no matching strategy
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),
}

impl QueryError {
    /// Create a required-field error
    pub fn required(message: impl Into<String>) -> Self {
        Self::RequiredField(message.into())
    }

    /// Create an invalid-argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Check if this is an unresolved-fields error
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedFields(_))
    }

    /// Check if this is an invalid-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// The offending field names, if this is an unresolved-fields error.
    pub fn unresolved_fields(&self) -> Option<&[String]> {
        match self {
            Self::UnresolvedFields(fields) => Some(fields),
            _ => None,
        }
    }
}

//! Query layer errors

use thiserror::Error;

/// Errors raised while building or translating queries
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The pagination token could not be decoded or its value does not
    /// match the kind of the field it claims to continue from
    #[error("Invalid cursor: {reason}")]
    InvalidCursor { reason: String },

    /// A filter value cannot be read as the type of its column
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl QueryError {
    pub fn invalid_cursor(reason: impl Into<String>) -> Self {
        Self::InvalidCursor {
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<QueryError> for inv_core::InvError {
    fn from(err: QueryError) -> Self {
        inv_core::InvError::invalid_input(err.to_string())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

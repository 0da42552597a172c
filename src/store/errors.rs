//! # Store Errors
//!
//! Failures raised by a store implementation. The mapping layer never
//! rewrites these: they reach the caller unchanged.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid layout for table '{table}': {reason}")]
    Layout { table: String, reason: String },

    #[error("Row key for table '{table}' expects {expected} components, got {actual}")]
    KeyArity {
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row key component '{component}' expects {expected}, got {actual}")]
    KeyComponentType {
        component: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Cursor is closed")]
    Closed,

    #[error("Store has been released")]
    Released,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl StoreError {
    /// Create an I/O error from any displayable cause
    pub fn io(cause: impl std::fmt::Display) -> Self {
        StoreError::Io(cause.to_string())
    }

    /// Create a layout error
    pub fn layout(table: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Layout {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = StoreError::KeyArity {
            table: "user_table".into(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Row key for table 'user_table' expects 1 components, got 2"
        );
        assert_eq!(
            StoreError::Unsupported("scan".into()).to_string(),
            "Unsupported operation: scan"
        );
    }
}

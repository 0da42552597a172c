//! DAO errors
//!
//! - spec errors are raised before any row is read
//! - store errors reach the caller unchanged
//! - release errors are reported after every paged field was attempted

use thiserror::Error;

use crate::decode::{DecodeError, ReleaseError};
use crate::entity::SpecError;
use crate::store::StoreError;

/// Result type for DAO operations
pub type DaoResult<T> = Result<T, DaoError>;

/// DAO errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DaoError {
    /// Entity bindings do not fit the table
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Store failure (table open, key resolution, get, scan, page fetch)
    #[error(transparent)]
    Store(StoreError),

    /// Cell value does not convert into the field type
    #[error("Field '{field}' expects {expected}, found {actual}")]
    ValueType {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// One or more paged fields failed to close
    #[error(transparent)]
    ResourceRelease(#[from] ReleaseError),

    /// The store does not implement the operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid DAO configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DaoError {
    pub fn config(msg: impl Into<String>) -> Self {
        DaoError::Config(msg.into())
    }

    pub fn is_spec(&self) -> bool {
        matches!(self, DaoError::Spec(_))
    }

    pub fn is_store(&self) -> bool {
        matches!(self, DaoError::Store(_))
    }

    /// The underlying store error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            DaoError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for DaoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unsupported(op) => DaoError::Unsupported(op),
            other => DaoError::Store(other),
        }
    }
}

impl From<DecodeError> for DaoError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Store(e) => e.into(),
            DecodeError::ValueType {
                field,
                expected,
                actual,
            } => DaoError::ValueType {
                field,
                expected,
                actual,
            },
        }
    }
}

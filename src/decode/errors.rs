//! Decode errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Store failure, passed through unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Field '{field}' expects {expected}, found {actual}")]
    ValueType {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

impl DecodeError {
    pub fn value_type(field: &'static str, expected: &'static str, actual: &'static str) -> Self {
        DecodeError::ValueType {
            field,
            expected,
            actual,
        }
    }
}

/// One paged field that failed to close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    pub field: &'static str,
    pub error: StoreError,
}

/// Failures collected while releasing an entity's paged fields
///
/// Only raised after every paged field was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to release {} paged field(s): {}", .failures.len(), describe(.failures))]
pub struct ReleaseError {
    pub failures: Vec<ReleaseFailure>,
    /// Cursors that did close
    pub released: usize,
}

impl ReleaseError {
    /// The first failure encountered
    pub fn first(&self) -> Option<&ReleaseFailure> {
        self.failures.first()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.failures.iter().map(|f| f.field).collect()
    }
}

fn describe(failures: &[ReleaseFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.field, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

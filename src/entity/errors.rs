//! Entity spec errors
//!
//! Error codes:
//! - OHM_BINDING_CONFLICT: a field carries both a column and an entity-id binding
//! - OHM_SCHEMA_MISMATCH: a binding does not fit the table layout or the field type
//! - OHM_INVALID_DESCRIPTOR: the descriptor itself is malformed
//!
//! All of these are raised while building a spec, before any row is read.

use std::fmt;

use super::binding::FieldShape;

/// Spec error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorCode {
    /// Field carries both bindings
    OhmBindingConflict,
    /// Unknown family/qualifier/component, or shape not allowed for the binding
    OhmSchemaMismatch,
    /// Malformed descriptor (duplicate field, zero versions, wrong table)
    OhmInvalidDescriptor,
}

impl SpecErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SpecErrorCode::OhmBindingConflict => "OHM_BINDING_CONFLICT",
            SpecErrorCode::OhmSchemaMismatch => "OHM_SCHEMA_MISMATCH",
            SpecErrorCode::OhmInvalidDescriptor => "OHM_INVALID_DESCRIPTOR",
        }
    }
}

impl fmt::Display for SpecErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error raised while building an entity spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
    code: SpecErrorCode,
    message: String,
    table: String,
    field: Option<String>,
}

impl SpecError {
    fn new(
        code: SpecErrorCode,
        table: &str,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            table: table.to_string(),
            field: field.map(String::from),
        }
    }

    /// Field declared with both a column and an entity-id binding
    pub fn binding_conflict(table: &str, field: &str) -> Self {
        Self::new(
            SpecErrorCode::OhmBindingConflict,
            table,
            Some(field),
            "field carries both a column binding and an entity-id binding",
        )
    }

    pub fn unknown_family(table: &str, field: &str, family: &str) -> Self {
        Self::new(
            SpecErrorCode::OhmSchemaMismatch,
            table,
            Some(field),
            format!("unknown family '{}'", family),
        )
    }

    /// Empty qualifier against a group-type family
    pub fn not_map_family(table: &str, field: &str, family: &str) -> Self {
        Self::new(
            SpecErrorCode::OhmSchemaMismatch,
            table,
            Some(field),
            format!(
                "family '{}' is not a map-type family and requires a qualifier",
                family
            ),
        )
    }

    /// Qualifier given against a map-type family
    pub fn map_family_qualifier(table: &str, field: &str, family: &str, qualifier: &str) -> Self {
        Self::new(
            SpecErrorCode::OhmSchemaMismatch,
            table,
            Some(field),
            format!(
                "family '{}' is a map-type family; column '{}:{}' cannot be bound",
                family, family, qualifier
            ),
        )
    }

    pub fn unknown_column(table: &str, field: &str, family: &str, qualifier: &str) -> Self {
        Self::new(
            SpecErrorCode::OhmSchemaMismatch,
            table,
            Some(field),
            format!("unknown column '{}:{}'", family, qualifier),
        )
    }

    /// Field type not allowed for the binding's qualifier/paging combination
    pub fn shape_mismatch(table: &str, field: &str, shape: FieldShape, allowed: &[FieldShape]) -> Self {
        let allowed: Vec<&str> = allowed.iter().map(FieldShape::as_str).collect();
        Self::new(
            SpecErrorCode::OhmSchemaMismatch,
            table,
            Some(field),
            format!(
                "field type '{}' does not fit this binding (expected one of: {})",
                shape.as_str(),
                allowed.join(", ")
            ),
        )
    }

    pub fn unknown_component(table: &str, field: &str, component: &str) -> Self {
        Self::new(
            SpecErrorCode::OhmSchemaMismatch,
            table,
            Some(field),
            format!("unknown entity-id component '{}'", component),
        )
    }

    pub fn invalid_descriptor(table: &str, field: Option<&str>, reason: impl Into<String>) -> Self {
        Self::new(SpecErrorCode::OhmInvalidDescriptor, table, field, reason)
    }

    pub fn code(&self) -> SpecErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn is_binding_conflict(&self) -> bool {
        self.code == SpecErrorCode::OhmBindingConflict
    }

    pub fn is_schema_mismatch(&self) -> bool {
        self.code == SpecErrorCode::OhmSchemaMismatch
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] table '{}'", self.code, self.table)?;
        if let Some(field) = &self.field {
            write!(f, ", field '{}'", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for SpecError {}

/// Result type for spec construction
pub type SpecResult<T> = Result<T, SpecError>;

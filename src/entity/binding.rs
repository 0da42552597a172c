//! Field bindings
//!
//! A [`ColumnDef`] is what an entity declares for a field; a
//! [`ColumnBinding`] is the same declaration after it was checked against
//! the table layout and paired with the field's shape.

use std::fmt;

/// `max_versions` value requesting every stored version
pub const ALL_VERSIONS: u32 = u32::MAX;

/// Shape of a bound field, fixed by its Rust type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// Most recent value of one column
    Scalar,
    /// Most recent cell of one column, timestamp included
    RawCell,
    /// All requested versions of one column
    TimeSeries,
    /// Most recent value of every qualifier in a map-type family
    MapOfScalar,
    /// All requested versions of every qualifier in a map-type family
    MapOfTimeSeries,
    /// Lazily paged versions of one column
    PagedColumn,
    /// Lazily paged cells of a whole map-type family
    PagedMap,
}

impl FieldShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldShape::Scalar => "scalar",
            FieldShape::RawCell => "raw-cell",
            FieldShape::TimeSeries => "time-series",
            FieldShape::MapOfScalar => "map-of-scalar",
            FieldShape::MapOfTimeSeries => "map-of-time-series",
            FieldShape::PagedColumn => "paged-column",
            FieldShape::PagedMap => "paged-map",
        }
    }

    /// Whether the field holds an open cursor after decoding
    pub fn is_paged(&self) -> bool {
        matches!(self, FieldShape::PagedColumn | FieldShape::PagedMap)
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared column binding of a field
///
/// Defaults: empty qualifier (whole map-type family), one version, no paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub family: String,
    pub qualifier: String,
    pub max_versions: u32,
    pub page_size: u32,
}

impl ColumnDef {
    /// Binds one column of a group-type family
    pub fn new(family: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            max_versions: 1,
            page_size: 0,
        }
    }

    /// Binds a whole map-type family
    pub fn family(family: impl Into<String>) -> Self {
        Self::new(family, "")
    }

    pub fn max_versions(mut self, max_versions: u32) -> Self {
        self.max_versions = max_versions;
        self
    }

    pub fn all_versions(self) -> Self {
        self.max_versions(ALL_VERSIONS)
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Validated column binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    field: &'static str,
    family: String,
    qualifier: Option<String>,
    max_versions: u32,
    page_size: u32,
    shape: FieldShape,
}

impl ColumnBinding {
    pub(crate) fn new(field: &'static str, def: ColumnDef, shape: FieldShape) -> Self {
        let qualifier = if def.qualifier.is_empty() {
            None
        } else {
            Some(def.qualifier)
        };
        Self {
            field,
            family: def.family,
            qualifier,
            max_versions: def.max_versions,
            page_size: def.page_size,
            shape,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Qualifier, or `None` for a map-type family binding
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn max_versions(&self) -> u32 {
        self.max_versions
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn is_paged(&self) -> bool {
        self.page_size > 0
    }

    /// Number of versions to keep per column, as a length bound
    pub(crate) fn version_limit(&self) -> usize {
        usize::try_from(self.max_versions).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for ColumnBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{} -> {}:{}", self.field, self.family, q),
            None => write!(f, "{} -> {}", self.field, self.family),
        }
    }
}

/// Validated entity-id binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIdBinding {
    field: &'static str,
    component: String,
    index: usize,
}

impl EntityIdBinding {
    pub(crate) fn new(field: &'static str, component: String, index: usize) -> Self {
        Self {
            field,
            component,
            index,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Position of the component in the row key
    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_def_defaults() {
        let def = ColumnDef::new("info", "zip_code");
        assert_eq!(def.max_versions, 1);
        assert_eq!(def.page_size, 0);

        let def = ColumnDef::family("query_count").all_versions().page_size(5);
        assert_eq!(def.qualifier, "");
        assert_eq!(def.max_versions, ALL_VERSIONS);
        assert_eq!(def.page_size, 5);
    }

    #[test]
    fn test_empty_qualifier_becomes_none() {
        let binding = ColumnBinding::new(
            "counts",
            ColumnDef::family("query_count"),
            FieldShape::MapOfScalar,
        );
        assert_eq!(binding.qualifier(), None);
        assert_eq!(binding.to_string(), "counts -> query_count");

        let binding = ColumnBinding::new(
            "zip",
            ColumnDef::new("info", "zip_code"),
            FieldShape::Scalar,
        );
        assert_eq!(binding.qualifier(), Some("zip_code"));
        assert_eq!(binding.to_string(), "zip -> info:zip_code");
    }

    #[test]
    fn test_shape_predicates() {
        assert!(FieldShape::PagedMap.is_paged());
        assert!(FieldShape::PagedColumn.is_paged());
        assert!(!FieldShape::TimeSeries.is_paged());
        assert!(!FieldShape::MapOfTimeSeries.is_paged());
    }
}

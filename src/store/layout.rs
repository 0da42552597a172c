//! Table layouts
//!
//! A layout describes the families of a table and its key schema:
//! - group-type families declare a fixed set of qualifiers
//! - map-type families accept any qualifier (the qualifier is data)
//!
//! Layouts are plain serde types and can be loaded from JSON files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::key::KeySchema;

/// Layout of one column family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyLayout {
    /// Family name
    pub name: String,
    /// Whether qualifiers are caller-defined data
    #[serde(default)]
    pub map_type: bool,
    /// Declared qualifiers (group-type families only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<String>,
}

impl FamilyLayout {
    /// Create a group-type family with the given columns
    pub fn group<'a>(name: impl Into<String>, qualifiers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            name: name.into(),
            map_type: false,
            qualifiers: qualifiers.into_iter().map(String::from).collect(),
        }
    }

    /// Create a map-type family
    pub fn map(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map_type: true,
            qualifiers: Vec::new(),
        }
    }

    pub fn is_map_type(&self) -> bool {
        self.map_type
    }

    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers.iter().any(|q| q == qualifier)
    }
}

/// Layout of a table: its families and key schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Table name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Row key components
    pub key_schema: KeySchema,
    /// Column families
    pub families: Vec<FamilyLayout>,
}

impl TableLayout {
    /// Create a layout with no families
    pub fn new(name: impl Into<String>, key_schema: KeySchema) -> Self {
        Self {
            name: name.into(),
            description: None,
            key_schema,
            families: Vec::new(),
        }
    }

    /// Adds a group-type family
    pub fn with_group_family<'a>(
        mut self,
        name: impl Into<String>,
        qualifiers: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.families.push(FamilyLayout::group(name, qualifiers));
        self
    }

    /// Adds a map-type family
    pub fn with_map_family(mut self, name: impl Into<String>) -> Self {
        self.families.push(FamilyLayout::map(name));
        self
    }

    pub fn family(&self, name: &str) -> Option<&FamilyLayout> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Whether `family:qualifier` names a column of a group-type family
    pub fn has_column(&self, family: &str, qualifier: &str) -> bool {
        self.family(family)
            .map_or(false, |f| !f.map_type && f.has_qualifier(qualifier))
    }

    /// Validates the layout structure itself
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("table name must not be empty".into());
        }

        self.key_schema.validate_structure()?;

        let mut families = HashSet::new();
        for family in &self.families {
            if family.name.is_empty() {
                return Err("family names must not be empty".into());
            }
            if !families.insert(family.name.as_str()) {
                return Err(format!("duplicate family '{}'", family.name));
            }

            if family.map_type {
                if !family.qualifiers.is_empty() {
                    return Err(format!(
                        "map-type family '{}' must not declare qualifiers",
                        family.name
                    ));
                }
                continue;
            }

            if family.qualifiers.is_empty() {
                return Err(format!(
                    "group-type family '{}' must declare at least one qualifier",
                    family.name
                ));
            }

            let mut qualifiers = HashSet::new();
            for qualifier in &family.qualifiers {
                if qualifier.is_empty() {
                    return Err(format!("family '{}' has an empty qualifier", family.name));
                }
                if !qualifiers.insert(qualifier.as_str()) {
                    return Err(format!(
                        "duplicate qualifier '{}:{}'",
                        family.name, qualifier
                    ));
                }
            }
        }

        Ok(())
    }

    /// Parses and validates a layout from JSON text.
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let layout: TableLayout = serde_json::from_str(json)
            .map_err(|e| StoreError::layout("<json>", format!("Invalid JSON: {}", e)))?;

        layout
            .validate_structure()
            .map_err(|reason| StoreError::layout(&layout.name, reason))?;

        Ok(layout)
    }

    /// Loads and validates a layout from a JSON file.
    pub fn from_json_file(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::layout(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        Self::from_json_str(&content)
    }
}

//! Row keys and the key schema they are resolved against.
//!
//! A row key is an ordered list of typed components. The key schema names
//! each component so entity fields can bind to them by name.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::value::Value;

/// Type of a row key component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    String,
    Integer,
    Long,
}

impl ComponentType {
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentType::String => "string",
            ComponentType::Integer => "integer",
            ComponentType::Long => "long",
        }
    }
}

/// Named component of a key schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyComponentDef {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
}

impl KeyComponentDef {
    pub fn new(name: impl Into<String>, component_type: ComponentType) -> Self {
        Self {
            name: name.into(),
            component_type,
        }
    }
}

/// Ordered list of named row key components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub components: Vec<KeyComponentDef>,
}

impl KeySchema {
    pub fn new(components: Vec<KeyComponentDef>) -> Self {
        Self { components }
    }

    /// Key schema made of string components only
    pub fn strings<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            components: names
                .into_iter()
                .map(|name| KeyComponentDef::new(name, ComponentType::String))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Position of the named component, if the schema has it
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name == name)
    }

    /// Checks that component names are unique and non-empty
    pub fn validate_structure(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for component in &self.components {
            if component.name.is_empty() {
                return Err("key component names must not be empty".into());
            }
            if !seen.insert(component.name.as_str()) {
                return Err(format!("duplicate key component '{}'", component.name));
            }
        }
        Ok(())
    }

    /// Builds a row key from caller-supplied components, checking arity and types.
    pub fn resolve(&self, table: &str, components: &[KeyValue]) -> StoreResult<RowKey> {
        if components.len() != self.components.len() {
            return Err(StoreError::KeyArity {
                table: table.to_string(),
                expected: self.components.len(),
                actual: components.len(),
            });
        }

        for (def, value) in self.components.iter().zip(components) {
            if !value.matches(def.component_type) {
                return Err(StoreError::KeyComponentType {
                    component: def.name.clone(),
                    expected: def.component_type.type_name(),
                    actual: value.type_name(),
                });
            }
        }

        Ok(RowKey::new(components.to_vec()))
    }
}

/// Value of a single row key component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    String(String),
    Integer(i32),
    Long(i64),
}

impl KeyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            KeyValue::String(_) => "string",
            KeyValue::Integer(_) => "integer",
            KeyValue::Long(_) => "long",
        }
    }

    fn matches(&self, component_type: ComponentType) -> bool {
        matches!(
            (self, component_type),
            (KeyValue::String(_), ComponentType::String)
                | (KeyValue::Integer(_), ComponentType::Integer)
                | (KeyValue::Long(_), ComponentType::Long)
        )
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        KeyValue::String(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        KeyValue::String(v)
    }
}

impl From<i32> for KeyValue {
    fn from(v: i32) -> Self {
        KeyValue::Integer(v)
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        KeyValue::Long(v)
    }
}

impl From<KeyValue> for Value {
    fn from(v: KeyValue) -> Self {
        match v {
            KeyValue::String(s) => Value::String(s),
            KeyValue::Integer(i) => Value::Int(i),
            KeyValue::Long(l) => Value::Long(l),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::String(s) => write!(f, "'{}'", s),
            KeyValue::Integer(i) => write!(f, "{}", i),
            KeyValue::Long(l) => write!(f, "{}", l),
        }
    }
}

/// Resolved row key (the store's entity id)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    components: Vec<KeyValue>,
}

impl RowKey {
    pub fn new(components: Vec<KeyValue>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[KeyValue] {
        &self.components
    }

    pub fn component_at(&self, index: usize) -> Option<&KeyValue> {
        self.components.get(index)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", component)?;
        }
        write!(f, "]")
    }
}

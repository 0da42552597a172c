//! Fluent seeding of an in-memory store
//!
//! ```ignore
//! let store = MemoryStore::builder()
//!     .with_table(layout)
//!         .with_row(["taton"])
//!             .with_family("info")
//!                 .with_qualifier("login").with_value("taton")
//!                 .with_qualifier("zip_code")
//!                     .with_value_at(1, 94110)
//!                     .with_value_at(2, 94131)
//!     .build()?;
//! ```
//!
//! Each call applies to the most recently selected table, row, family and
//! qualifier. The first error is kept and reported by `build`.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{MemoryStore, RowCells, TableData};
use crate::store::errors::{StoreError, StoreResult};
use crate::store::key::{KeyValue, RowKey};
use crate::store::layout::TableLayout;
use crate::store::value::Value;

/// Builder for [`MemoryStore`]
#[derive(Debug, Default)]
pub struct StoreBuilder {
    tables: BTreeMap<String, TableData>,
    table: Option<String>,
    row: Option<RowKey>,
    family: Option<String>,
    qualifier: Option<String>,
    error: Option<StoreError>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(mut self, error: StoreError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    fn current_table(&self) -> StoreResult<&TableData> {
        self.table
            .as_ref()
            .and_then(|name| self.tables.get(name))
            .ok_or_else(|| StoreError::layout("<builder>", "no table selected"))
    }

    /// Adds a table and selects it
    pub fn with_table(mut self, layout: TableLayout) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(reason) = layout.validate_structure() {
            let name = layout.name.clone();
            return self.fail(StoreError::layout(name, reason));
        }
        if self.tables.contains_key(&layout.name) {
            let name = layout.name.clone();
            return self.fail(StoreError::layout(name, "table added twice"));
        }

        let name = layout.name.clone();
        self.tables.insert(
            name.clone(),
            TableData {
                layout,
                rows: BTreeMap::new(),
            },
        );
        self.table = Some(name);
        self.row = None;
        self.family = None;
        self.qualifier = None;
        self
    }

    /// Selects (creating if needed) a row of the current table
    pub fn with_row<K: Into<KeyValue>>(mut self, components: impl IntoIterator<Item = K>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let components: Vec<KeyValue> = components.into_iter().map(Into::into).collect();

        let key = match self.current_table() {
            Ok(table) => table.layout.key_schema.resolve(&table.layout.name, &components),
            Err(e) => Err(e),
        };
        let key = match key {
            Ok(key) => key,
            Err(e) => return self.fail(e),
        };

        if let Some(table) = self.table.as_ref().and_then(|t| self.tables.get_mut(t)) {
            table.rows.entry(key.clone()).or_insert_with(RowCells::new);
        }
        self.row = Some(key);
        self.family = None;
        self.qualifier = None;
        self
    }

    /// Selects a family of the current row
    pub fn with_family(mut self, family: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let check = self.current_table().and_then(|table| {
            if table.layout.family(family).is_none() {
                return Err(StoreError::layout(
                    &table.layout.name,
                    format!("unknown family '{}'", family),
                ));
            }
            if self.row.is_none() {
                return Err(StoreError::layout(&table.layout.name, "no row selected"));
            }
            Ok(())
        });
        if let Err(e) = check {
            return self.fail(e);
        }

        self.family = Some(family.to_string());
        self.qualifier = None;
        self
    }

    /// Selects a qualifier of the current family
    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let check = self.current_table().and_then(|table| {
            let family = self
                .family
                .as_deref()
                .and_then(|f| table.layout.family(f))
                .ok_or_else(|| StoreError::layout(&table.layout.name, "no family selected"))?;

            if qualifier.is_empty() || (!family.map_type && !family.has_qualifier(qualifier)) {
                return Err(StoreError::layout(
                    &table.layout.name,
                    format!("unknown column '{}:{}'", family.name, qualifier),
                ));
            }
            Ok(())
        });
        if let Err(e) = check {
            return self.fail(e);
        }

        self.qualifier = Some(qualifier.to_string());
        self
    }

    /// Writes a value one tick after the newest version of the current column
    /// (timestamp 1 for an empty column).
    pub fn with_value(self, value: impl Into<Value>) -> Self {
        let next = self
            .current_versions()
            .and_then(|versions| versions.keys().next().map(|ts| ts.0 + 1))
            .unwrap_or(1);
        self.with_value_at(next, value)
    }

    /// Writes a value at an explicit timestamp of the current column
    pub fn with_value_at(mut self, timestamp: i64, value: impl Into<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if timestamp < 0 {
            let table = self.table.clone().unwrap_or_default();
            return self.fail(StoreError::layout(
                table,
                format!("negative timestamp {}", timestamp),
            ));
        }

        let (Some(table), Some(row), Some(family), Some(qualifier)) = (
            self.table.clone(),
            self.row.clone(),
            self.family.clone(),
            self.qualifier.clone(),
        ) else {
            return self.fail(StoreError::layout("<builder>", "no column selected"));
        };

        if let Some(data) = self.tables.get_mut(&table) {
            data.rows
                .entry(row)
                .or_default()
                .entry(family)
                .or_default()
                .entry(qualifier)
                .or_default()
                .insert(Reverse(timestamp), value.into());
        }
        self
    }

    fn current_versions(&self) -> Option<&super::Versions> {
        let table = self.tables.get(self.table.as_ref()?)?;
        table
            .rows
            .get(self.row.as_ref()?)?
            .get(self.family.as_ref()?)?
            .get(self.qualifier.as_ref()?)
    }

    /// Finishes seeding
    pub fn build(self) -> StoreResult<MemoryStore> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let tables = self
            .tables
            .into_iter()
            .map(|(name, data)| (name, Arc::new(data)))
            .collect();
        Ok(MemoryStore::from_tables(tables))
    }
}

//! Field types and their decode routines
//!
//! The Rust type of a bound field fixes its [`FieldShape`]:
//!
//! | type | shape |
//! |---|---|
//! | `i32`, `i64`, `f32`, `f64`, `bool`, `String`, `Vec<u8>`, `Option<T>` | scalar |
//! | [`RawCell<T>`] | raw cell |
//! | [`TimeSeries<T>`] | time series |
//! | [`MapValues<T>`] | map of scalars |
//! | [`MapTimeSeries<T>`] | map of time series |
//! | [`PagedColumn<T>`](super::PagedColumn) | paged column |
//! | [`PagedMap<T>`](super::PagedMap) | paged map |
//!
//! Missing cells never fail: scalars keep their default, containers stay
//! empty.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};

use crate::entity::{ColumnBinding, FieldShape};
use crate::store::{Cell, RowData, StoreResult, Value};

use super::errors::DecodeResult;
use super::value::{convert, FromValue};

/// A field type that can be decoded from a row
pub trait ColumnField: Sized + Send + 'static {
    const SHAPE: FieldShape;

    /// Reads the bound column or family out of `row`
    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self>;

    /// Closes any store resource held by the field.
    ///
    /// Returns `Ok(true)` when something was open.
    fn release(&mut self) -> StoreResult<bool> {
        Ok(false)
    }
}

/// Qualifier of a group-column binding; validated non-empty at spec build
fn column_qualifier(binding: &ColumnBinding) -> &str {
    binding.qualifier().unwrap_or_default()
}

fn decode_scalar<T: FromValue + Default>(
    row: &dyn RowData,
    binding: &ColumnBinding,
) -> DecodeResult<T> {
    match row.most_recent_cell(binding.family(), column_qualifier(binding))? {
        Some(cell) => convert(binding.field(), cell.value),
        None => Ok(T::default()),
    }
}

fn decode_versions<T: FromValue>(
    row: &dyn RowData,
    binding: &ColumnBinding,
    qualifier: &str,
) -> DecodeResult<TimeSeries<T>> {
    let mut series = TimeSeries::new();
    for cell in row
        .cells(binding.family(), qualifier)?
        .into_iter()
        .take(binding.version_limit())
    {
        series.insert(cell.timestamp, convert(binding.field(), cell.value)?);
    }
    Ok(series)
}

macro_rules! scalar_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ColumnField for $ty {
                const SHAPE: FieldShape = FieldShape::Scalar;

                fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
                    decode_scalar(row, binding)
                }
            }
        )*
    };
}

scalar_field!(bool, i32, i64, f32, f64, String, Vec<u8>, Value);

impl<T: FromValue + Send + 'static> ColumnField for Option<T> {
    const SHAPE: FieldShape = FieldShape::Scalar;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        decode_scalar(row, binding)
    }
}

/// Versions of one column, most recent first
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    cells: BTreeMap<Reverse<i64>, T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }
}

impl<T> TimeSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a version, replacing any value at the same timestamp
    pub fn insert(&mut self, timestamp: i64, value: T) -> Option<T> {
        self.cells.insert(Reverse(timestamp), value)
    }

    pub fn get(&self, timestamp: i64) -> Option<&T> {
        self.cells.get(&Reverse(timestamp))
    }

    /// Most recent version
    pub fn latest(&self) -> Option<(i64, &T)> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Versions in descending timestamp order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> {
        self.cells.iter().map(|(ts, v)| (ts.0, v))
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.cells.keys().map(|ts| ts.0).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.cells.values()
    }

    /// Versions as cells, most recent first
    pub fn into_cells(self) -> Vec<Cell<T>> {
        self.cells
            .into_iter()
            .map(|(ts, value)| Cell::new(ts.0, value))
            .collect()
    }
}

impl<T> FromIterator<(i64, T)> for TimeSeries<T> {
    fn from_iter<I: IntoIterator<Item = (i64, T)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (timestamp, value) in iter {
            series.insert(timestamp, value);
        }
        series
    }
}

impl<T: FromValue + Send + 'static> ColumnField for TimeSeries<T> {
    const SHAPE: FieldShape = FieldShape::TimeSeries;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        decode_versions(row, binding, column_qualifier(binding))
    }
}

/// Most recent cell of one column, timestamp included
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell<T> {
    cell: Option<Cell<T>>,
}

impl<T> Default for RawCell<T> {
    fn default() -> Self {
        Self { cell: None }
    }
}

impl<T> RawCell<T> {
    pub fn new(cell: Option<Cell<T>>) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> Option<&Cell<T>> {
        self.cell.as_ref()
    }

    pub fn value(&self) -> Option<&T> {
        self.cell.as_ref().map(|c| &c.value)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.cell.as_ref().map(|c| c.timestamp)
    }

    /// Write time of the cell, for stores that stamp cells in epoch millis
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        self.cell.as_ref().and_then(Cell::written_at)
    }

    pub fn is_empty(&self) -> bool {
        self.cell.is_none()
    }

    pub fn into_cell(self) -> Option<Cell<T>> {
        self.cell
    }
}

impl<T: FromValue + Send + 'static> ColumnField for RawCell<T> {
    const SHAPE: FieldShape = FieldShape::RawCell;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        let cell = row
            .most_recent_cell(binding.family(), column_qualifier(binding))?
            .map(|cell| cell.try_map(|value| convert(binding.field(), value)))
            .transpose()?;
        Ok(Self { cell })
    }
}

/// Most recent value of every qualifier in a map-type family
#[derive(Debug, Clone, PartialEq)]
pub struct MapValues<T> {
    values: BTreeMap<String, T>,
}

impl<T> Default for MapValues<T> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<T> MapValues<T> {
    pub fn into_inner(self) -> BTreeMap<String, T> {
        self.values
    }
}

impl<T> Deref for MapValues<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T> FromIterator<(String, T)> for MapValues<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T: FromValue + Send + 'static> ColumnField for MapValues<T> {
    const SHAPE: FieldShape = FieldShape::MapOfScalar;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        let mut values = BTreeMap::new();
        for qualifier in row.qualifiers(binding.family())? {
            if let Some(cell) = row.most_recent_cell(binding.family(), &qualifier)? {
                values.insert(qualifier, convert(binding.field(), cell.value)?);
            }
        }
        Ok(Self { values })
    }
}

/// Versions of every qualifier in a map-type family
#[derive(Debug, Clone, PartialEq)]
pub struct MapTimeSeries<T> {
    series: BTreeMap<String, TimeSeries<T>>,
}

impl<T> Default for MapTimeSeries<T> {
    fn default() -> Self {
        Self {
            series: BTreeMap::new(),
        }
    }
}

impl<T> MapTimeSeries<T> {
    pub fn into_inner(self) -> BTreeMap<String, TimeSeries<T>> {
        self.series
    }
}

impl<T> Deref for MapTimeSeries<T> {
    type Target = BTreeMap<String, TimeSeries<T>>;

    fn deref(&self) -> &Self::Target {
        &self.series
    }
}

impl<T: FromValue + Send + 'static> ColumnField for MapTimeSeries<T> {
    const SHAPE: FieldShape = FieldShape::MapOfTimeSeries;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        let mut series = BTreeMap::new();
        for qualifier in row.qualifiers(binding.family())? {
            let versions = decode_versions(row, binding, &qualifier)?;
            if !versions.is_empty() {
                series.insert(qualifier, versions);
            }
        }
        Ok(Self { series })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::entity::ColumnDef;
    use crate::store::{FamilyCell, KeyValue, PagedCursor, RowKey, StoreError};

    /// Row with fixed cells and no paging support
    struct FixedRow {
        key: RowKey,
        cells: Vec<(&'static str, &'static str, i64, Value)>,
    }

    impl FixedRow {
        fn new(cells: Vec<(&'static str, &'static str, i64, Value)>) -> Self {
            Self {
                key: RowKey::new(vec![KeyValue::from("taton")]),
                cells,
            }
        }
    }

    impl RowData for FixedRow {
        fn entity_id(&self) -> &RowKey {
            &self.key
        }

        fn most_recent_cell(&self, family: &str, qualifier: &str) -> StoreResult<Option<Cell<Value>>> {
            Ok(self.cells(family, qualifier)?.into_iter().next())
        }

        fn cells(&self, family: &str, qualifier: &str) -> StoreResult<Vec<Cell<Value>>> {
            let mut cells: Vec<Cell<Value>> = self
                .cells
                .iter()
                .filter(|(f, q, _, _)| *f == family && *q == qualifier)
                .map(|(_, _, ts, v)| Cell::new(*ts, v.clone()))
                .collect();
            cells.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(cells)
        }

        fn qualifiers(&self, family: &str) -> StoreResult<Vec<String>> {
            let mut qualifiers: Vec<String> = self
                .cells
                .iter()
                .filter(|(f, _, _, _)| *f == family)
                .map(|(_, q, _, _)| q.to_string())
                .collect();
            qualifiers.sort();
            qualifiers.dedup();
            Ok(qualifiers)
        }

        fn column_pager(
            &self,
            _family: &str,
            _qualifier: &str,
            _max_versions: u32,
            _page_size: u32,
        ) -> StoreResult<Box<dyn PagedCursor<Cell<Value>>>> {
            Err(StoreError::Unsupported("paging".into()))
        }

        fn family_pager(
            &self,
            _family: &str,
            _max_versions: u32,
            _page_size: u32,
        ) -> StoreResult<Box<dyn PagedCursor<FamilyCell<Value>>>> {
            Err(StoreError::Unsupported("paging".into()))
        }
    }

    fn binding(field: &'static str, def: ColumnDef, shape: FieldShape) -> ColumnBinding {
        ColumnBinding::new(field, def, shape)
    }

    fn zip_row() -> FixedRow {
        FixedRow::new(vec![
            ("info", "zip_code", 1, Value::Int(94110)),
            ("info", "zip_code", 2, Value::Int(94131)),
            ("query_count", "hello", 1, Value::Int(20)),
            ("query_count", "hello", 2, Value::Int(30)),
            ("query_count", "world", 1, Value::Int(40)),
        ])
    }

    #[test]
    fn test_scalar_takes_most_recent() {
        let b = binding("zip", ColumnDef::new("info", "zip_code"), FieldShape::Scalar);
        assert_eq!(i32::decode(&zip_row(), &b).unwrap(), 94131);
        assert_eq!(i64::decode(&zip_row(), &b).unwrap(), 94131);
    }

    #[test]
    fn test_scalar_missing_cell_is_default() {
        let b = binding("name", ColumnDef::new("info", "full_name"), FieldShape::Scalar);
        assert_eq!(String::decode(&zip_row(), &b).unwrap(), "");
        assert_eq!(Option::<String>::decode(&zip_row(), &b).unwrap(), None);
        assert_eq!(i32::decode(&zip_row(), &b).unwrap(), 0);
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let b = binding("zip", ColumnDef::new("info", "zip_code"), FieldShape::Scalar);
        let err = String::decode(&zip_row(), &b).unwrap_err();
        assert_eq!(err, DecodeError::value_type("zip", "string", "int"));
    }

    #[test]
    fn test_time_series_descending() {
        let b = binding(
            "zips",
            ColumnDef::new("info", "zip_code").all_versions(),
            FieldShape::TimeSeries,
        );
        let series = TimeSeries::<i32>::decode(&zip_row(), &b).unwrap();
        assert_eq!(series.timestamps(), vec![2, 1]);
        assert_eq!(series.latest(), Some((2, &94131)));
        assert_eq!(
            series.into_cells(),
            vec![Cell::new(2, 94131), Cell::new(1, 94110)]
        );
    }

    #[test]
    fn test_time_series_truncated_to_max_versions() {
        let b = binding(
            "zips",
            ColumnDef::new("info", "zip_code").max_versions(1),
            FieldShape::TimeSeries,
        );
        let series = TimeSeries::<i32>::decode(&zip_row(), &b).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(2), Some(&94131));
    }

    #[test]
    fn test_raw_cell_keeps_timestamp() {
        let b = binding("zip", ColumnDef::new("info", "zip_code"), FieldShape::RawCell);
        let cell = RawCell::<i32>::decode(&zip_row(), &b).unwrap();
        assert_eq!(cell.timestamp(), Some(2));
        assert_eq!(cell.value(), Some(&94131));

        let b = binding("name", ColumnDef::new("info", "full_name"), FieldShape::RawCell);
        assert!(RawCell::<String>::decode(&zip_row(), &b).unwrap().is_empty());
    }

    #[test]
    fn test_map_values_most_recent_per_qualifier() {
        let b = binding("counts", ColumnDef::family("query_count"), FieldShape::MapOfScalar);
        let counts = MapValues::<i32>::decode(&zip_row(), &b).unwrap();
        let expected: MapValues<i32> = [("hello".to_string(), 30), ("world".to_string(), 40)]
            .into_iter()
            .collect();
        assert_eq!(counts, expected);
        assert_eq!(counts.get("hello"), Some(&30));
    }

    #[test]
    fn test_map_time_series() {
        let b = binding(
            "history",
            ColumnDef::family("query_count").all_versions(),
            FieldShape::MapOfTimeSeries,
        );
        let history = MapTimeSeries::<i64>::decode(&zip_row(), &b).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history["hello"].timestamps(), vec![2, 1]);
        assert_eq!(history["hello"].get(1), Some(&20));
        assert_eq!(history["world"].latest(), Some((1, &40)));
    }

    #[test]
    fn test_empty_family_yields_empty_map() {
        let b = binding("counts", ColumnDef::family("query_count"), FieldShape::MapOfScalar);
        let counts = MapValues::<i32>::decode(&FixedRow::new(vec![]), &b).unwrap();
        assert!(counts.is_empty());
    }
}

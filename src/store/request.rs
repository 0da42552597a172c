//! Read requests
//!
//! A read request lists the columns to fetch, each with its own version
//! bound and page size, plus the time range every cell must fall into.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::RowKey;

/// Half-open timestamp interval `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min: i64,
    pub max: i64,
}

impl TimeRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Every timestamp the store can hold
    pub fn all() -> Self {
        Self {
            min: 0,
            max: i64::MAX,
        }
    }

    /// Range between two instants, as millisecond timestamps
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            min: start.timestamp_millis().max(0),
            max: end.timestamp_millis(),
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.min && timestamp < self.max
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.min, self.max)
    }
}

/// One clause of a read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRequest {
    /// Family to read
    pub family: String,
    /// Qualifier to read; `None` requests the whole (map-type) family
    pub qualifier: Option<String>,
    /// Maximum number of versions per column
    pub max_versions: u32,
    /// Cells per page; 0 disables paging
    pub page_size: u32,
}

impl ColumnRequest {
    /// Request every qualifier of a family
    pub fn family(family: impl Into<String>, max_versions: u32, page_size: u32) -> Self {
        Self {
            family: family.into(),
            qualifier: None,
            max_versions,
            page_size,
        }
    }

    /// Request a single column
    pub fn column(
        family: impl Into<String>,
        qualifier: impl Into<String>,
        max_versions: u32,
        page_size: u32,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: Some(qualifier.into()),
            max_versions,
            page_size,
        }
    }

    /// Whether this clause covers `family:qualifier`
    pub fn covers(&self, family: &str, qualifier: &str) -> bool {
        self.family == family && self.qualifier.as_deref().map_or(true, |q| q == qualifier)
    }

    pub fn is_paged(&self) -> bool {
        self.page_size > 0
    }
}

impl fmt::Display for ColumnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}:{}", self.family, q)?,
            None => write!(f, "{}", self.family)?,
        }
        write!(f, " (versions={}, page_size={})", self.max_versions, self.page_size)
    }
}

/// Read request handed to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadRequest {
    pub time_range: TimeRange,
    pub columns: Vec<ColumnRequest>,
}

impl ReadRequest {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            columns: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether any clause requests data from the family
    pub fn requests_family(&self, family: &str) -> bool {
        self.columns.iter().any(|c| c.family == family)
    }

    /// Largest version bound over the clauses covering `family:qualifier`,
    /// or `None` when the column was not requested.
    pub fn max_versions(&self, family: &str, qualifier: &str) -> Option<u32> {
        self.columns
            .iter()
            .filter(|c| c.covers(family, qualifier))
            .map(|c| c.max_versions)
            .max()
    }
}

/// Scan options, passed through to the store untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// First row to return (inclusive)
    pub start_row: Option<RowKey>,
    /// Row to stop at (exclusive)
    pub stop_row: Option<RowKey>,
    /// Maximum number of rows
    pub limit: Option<usize>,
    /// Rows fetched per round trip; 0 lets the store decide
    pub batch_size: u32,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_row(mut self, key: RowKey) -> Self {
        self.start_row = Some(key);
        self
    }

    pub fn with_stop_row(mut self, key: RowKey) -> Self {
        self.stop_row = Some(key);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }
}

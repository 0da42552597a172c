//! In-memory store
//!
//! Implements the whole store contract over immutable, process-local data:
//! - layouts and rows are seeded once through [`StoreBuilder`]
//! - reads honor the request's time range and per-column version bounds
//! - paged cursors hand out cells one page per fetch
//! - scans walk rows in key order
//!
//! Every open table, reader, scanner and cursor is counted so callers can
//! check that handles were released. Fault points let tests make selected
//! operations fail with an I/O error.

mod builder;
mod row;

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::errors::{StoreError, StoreResult};
use super::key::RowKey;
use super::layout::TableLayout;
use super::request::{ReadRequest, ScanOptions};
use super::table::{RowData, RowScanner, Store, Table, TableReader};
use super::value::Value;

pub use builder::StoreBuilder;

use row::{MemoryRow, MemoryScanner};

/// Versions of one column, most recent first
pub(crate) type Versions = BTreeMap<Reverse<i64>, Value>;
/// Columns of one family by qualifier
pub(crate) type Columns = BTreeMap<String, Versions>;
/// Families of one row
pub(crate) type RowCells = BTreeMap<String, Columns>;

/// Operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `TableReader::get`
    Get,
    /// `TableReader::scan`
    Scan,
    /// `PagedCursor::next_page`
    PageFetch,
    /// `PagedCursor::close`
    CursorClose,
}

impl FaultPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultPoint::Get => "get",
            FaultPoint::Scan => "scan",
            FaultPoint::PageFetch => "page_fetch",
            FaultPoint::CursorClose => "cursor_close",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HandleKind {
    Table,
    Reader,
    Scanner,
    Cursor,
}

/// Counters and fault points shared by a store and all of its handles
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    open_tables: AtomicUsize,
    open_readers: AtomicUsize,
    open_scanners: AtomicUsize,
    open_cursors: AtomicUsize,
    pages_fetched: AtomicUsize,
    released: AtomicBool,
    faults: Mutex<HashSet<FaultPoint>>,
}

impl StoreState {
    fn counter(&self, kind: HandleKind) -> &AtomicUsize {
        match kind {
            HandleKind::Table => &self.open_tables,
            HandleKind::Reader => &self.open_readers,
            HandleKind::Scanner => &self.open_scanners,
            HandleKind::Cursor => &self.open_cursors,
        }
    }

    /// Fails with an I/O error if the fault point is armed
    pub(crate) fn check(&self, point: FaultPoint) -> StoreResult<()> {
        let faults = self.faults.lock().unwrap_or_else(PoisonError::into_inner);
        if faults.contains(&point) {
            return Err(StoreError::Io(format!("injected fault at {}", point.as_str())));
        }
        Ok(())
    }

    pub(crate) fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }
}

/// Counts one open handle until dropped
#[derive(Debug)]
pub(crate) struct HandleGuard {
    state: Arc<StoreState>,
    kind: HandleKind,
}

impl HandleGuard {
    fn new(state: &Arc<StoreState>, kind: HandleKind) -> Self {
        state.counter(kind).fetch_add(1, Ordering::SeqCst);
        Self {
            state: Arc::clone(state),
            kind,
        }
    }

    pub(crate) fn cursor(state: &Arc<StoreState>) -> Self {
        Self::new(state, HandleKind::Cursor)
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.state.counter(self.kind).fetch_sub(1, Ordering::SeqCst);
    }
}

/// Immutable contents of one table
#[derive(Debug)]
pub(crate) struct TableData {
    pub(crate) layout: TableLayout,
    pub(crate) rows: BTreeMap<RowKey, RowCells>,
}

impl TableData {
    /// Restricts a row to the requested columns, time range and version bounds.
    pub(crate) fn project(&self, key: &RowKey, request: &ReadRequest) -> RowCells {
        let mut projected = RowCells::new();
        let Some(cells) = self.rows.get(key) else {
            return projected;
        };

        for (family, columns) in cells {
            if !request.requests_family(family) {
                continue;
            }

            for (qualifier, versions) in columns {
                let Some(max_versions) = request.max_versions(family, qualifier) else {
                    continue;
                };

                let kept: Versions = versions
                    .iter()
                    .filter(|(ts, _)| request.time_range.contains(ts.0))
                    .take(max_versions as usize)
                    .map(|(ts, value)| (*ts, value.clone()))
                    .collect();

                if !kept.is_empty() {
                    projected
                        .entry(family.clone())
                        .or_default()
                        .insert(qualifier.clone(), kept);
                }
            }
        }

        projected
    }
}

struct Inner {
    tables: BTreeMap<String, Arc<TableData>>,
    state: Arc<StoreState>,
}

/// In-memory store. Clones share the same data and counters.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Starts seeding a new store
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub(crate) fn from_tables(tables: BTreeMap<String, Arc<TableData>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables,
                state: Arc::new(StoreState::default()),
            }),
        }
    }

    /// Makes the given operation fail until cleared
    pub fn inject_fault(&self, point: FaultPoint) {
        let mut faults = self
            .inner
            .state
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        faults.insert(point);
    }

    /// Clears an injected fault
    pub fn clear_fault(&self, point: FaultPoint) {
        let mut faults = self
            .inner
            .state
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        faults.remove(&point);
    }

    pub fn open_tables(&self) -> usize {
        self.inner.state.open_tables.load(Ordering::SeqCst)
    }

    pub fn open_readers(&self) -> usize {
        self.inner.state.open_readers.load(Ordering::SeqCst)
    }

    pub fn open_scanners(&self) -> usize {
        self.inner.state.open_scanners.load(Ordering::SeqCst)
    }

    pub fn open_cursors(&self) -> usize {
        self.inner.state.open_cursors.load(Ordering::SeqCst)
    }

    /// Total pages handed out by paged cursors
    pub fn pages_fetched(&self) -> usize {
        self.inner.state.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn is_released(&self) -> bool {
        self.inner.state.released.load(Ordering::SeqCst)
    }
}

impl Store for MemoryStore {
    fn open_table(&self, name: &str) -> StoreResult<Box<dyn Table>> {
        if self.is_released() {
            return Err(StoreError::Released);
        }

        let data = self
            .inner
            .tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;

        Ok(Box::new(MemoryTable {
            data: Arc::clone(data),
            state: Arc::clone(&self.inner.state),
            _guard: HandleGuard::new(&self.inner.state, HandleKind::Table),
        }))
    }

    fn release(&self) -> StoreResult<()> {
        self.inner.state.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MemoryTable {
    data: Arc<TableData>,
    state: Arc<StoreState>,
    _guard: HandleGuard,
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.data.layout.name
    }

    fn layout(&self) -> &TableLayout {
        &self.data.layout
    }

    fn open_reader(&self) -> StoreResult<Box<dyn TableReader>> {
        Ok(Box::new(MemoryReader {
            data: Arc::clone(&self.data),
            state: Arc::clone(&self.state),
            _guard: HandleGuard::new(&self.state, HandleKind::Reader),
        }))
    }
}

struct MemoryReader {
    data: Arc<TableData>,
    state: Arc<StoreState>,
    _guard: HandleGuard,
}

impl TableReader for MemoryReader {
    fn get(&self, key: &RowKey, request: &ReadRequest) -> StoreResult<Box<dyn RowData>> {
        self.state.check(FaultPoint::Get)?;

        let cells = self.data.project(key, request);
        Ok(Box::new(MemoryRow::new(
            key.clone(),
            cells,
            Arc::clone(&self.state),
        )))
    }

    fn scan(&self, request: &ReadRequest, options: &ScanOptions) -> StoreResult<RowScanner> {
        self.state.check(FaultPoint::Scan)?;

        let keys: Vec<RowKey> = self
            .data
            .rows
            .keys()
            .filter(|key| options.start_row.as_ref().map_or(true, |start| *key >= start))
            .filter(|key| options.stop_row.as_ref().map_or(true, |stop| *key < stop))
            .take(options.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Box::new(MemoryScanner::new(
            Arc::clone(&self.data),
            keys,
            request.clone(),
            Arc::clone(&self.state),
            HandleGuard::new(&self.state, HandleKind::Scanner),
        )))
    }
}

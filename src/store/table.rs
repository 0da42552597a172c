//! Store contract
//!
//! The mapping layer talks to a store only through these traits. Handles are
//! owned values: dropping a table, reader, scanner or cursor releases it.

use std::sync::Arc;

use super::errors::{StoreError, StoreResult};
use super::key::{KeyValue, RowKey};
use super::layout::TableLayout;
use super::request::{ReadRequest, ScanOptions};
use super::value::{Cell, FamilyCell, Value};

/// Rows produced by a scan, fetched lazily
pub type RowScanner = Box<dyn Iterator<Item = StoreResult<Box<dyn RowData>>> + Send>;

/// Entry point of a store
pub trait Store: Send + Sync {
    /// Opens a table handle
    fn open_table(&self, name: &str) -> StoreResult<Box<dyn Table>>;

    /// Releases the store handle held by the caller
    fn release(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn open_table(&self, name: &str) -> StoreResult<Box<dyn Table>> {
        (**self).open_table(name)
    }

    fn release(&self) -> StoreResult<()> {
        (**self).release()
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn open_table(&self, name: &str) -> StoreResult<Box<dyn Table>> {
        (**self).open_table(name)
    }

    fn release(&self) -> StoreResult<()> {
        (**self).release()
    }
}

/// Open table handle
pub trait Table: Send {
    fn name(&self) -> &str;

    /// Family layouts and key schema of the table
    fn layout(&self) -> &TableLayout;

    /// Resolves key components into a row key
    fn entity_id(&self, components: &[KeyValue]) -> StoreResult<RowKey> {
        let layout = self.layout();
        layout.key_schema.resolve(&layout.name, components)
    }

    fn open_reader(&self) -> StoreResult<Box<dyn TableReader>>;
}

/// Reader over a table
pub trait TableReader: Send {
    /// Fetches one row. A row with no data is returned empty, not as an error.
    fn get(&self, key: &RowKey, request: &ReadRequest) -> StoreResult<Box<dyn RowData>>;

    /// Scans rows. Stores without scan support keep this default.
    fn scan(&self, _request: &ReadRequest, _options: &ScanOptions) -> StoreResult<RowScanner> {
        Err(StoreError::Unsupported("scan".into()))
    }
}

/// Data of one row, restricted to what the read request asked for
pub trait RowData: Send {
    fn entity_id(&self) -> &RowKey;

    /// Most recent cell of a column, if any
    fn most_recent_cell(&self, family: &str, qualifier: &str) -> StoreResult<Option<Cell<Value>>>;

    /// All fetched versions of a column, most recent first
    fn cells(&self, family: &str, qualifier: &str) -> StoreResult<Vec<Cell<Value>>>;

    /// Qualifiers present under a family, in ascending order
    fn qualifiers(&self, family: &str) -> StoreResult<Vec<String>>;

    /// Opens a paged cursor over at most `max_versions` versions of one
    /// column, most recent first
    fn column_pager(
        &self,
        family: &str,
        qualifier: &str,
        max_versions: u32,
        page_size: u32,
    ) -> StoreResult<Box<dyn PagedCursor<Cell<Value>>>>;

    /// Opens a paged cursor over every cell of a family, keeping at most
    /// `max_versions` versions per qualifier
    fn family_pager(
        &self,
        family: &str,
        max_versions: u32,
        page_size: u32,
    ) -> StoreResult<Box<dyn PagedCursor<FamilyCell<Value>>>>;
}

/// Store-side cursor fetching one page per call
pub trait PagedCursor<T>: Send {
    /// Fetches the next page; `None` once exhausted
    fn next_page(&mut self) -> StoreResult<Option<Vec<T>>>;

    /// Releases the store-side cursor
    fn close(&mut self) -> StoreResult<()>;
}

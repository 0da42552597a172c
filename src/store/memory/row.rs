//! Rows, paged cursors and scanners of the in-memory store.

use std::collections::VecDeque;
use std::sync::Arc;

use super::{FaultPoint, HandleGuard, RowCells, StoreState, TableData};
use crate::store::errors::{StoreError, StoreResult};
use crate::store::key::RowKey;
use crate::store::request::ReadRequest;
use crate::store::table::{PagedCursor, RowData};
use crate::store::value::{Cell, FamilyCell, Value};

/// A projected row
pub(crate) struct MemoryRow {
    key: RowKey,
    cells: RowCells,
    state: Arc<StoreState>,
}

impl MemoryRow {
    pub(crate) fn new(key: RowKey, cells: RowCells, state: Arc<StoreState>) -> Self {
        Self { key, cells, state }
    }

    fn column(&self, family: &str, qualifier: &str) -> impl Iterator<Item = Cell<Value>> + '_ {
        self.cells
            .get(family)
            .and_then(|columns| columns.get(qualifier))
            .into_iter()
            .flat_map(|versions| versions.iter())
            .map(|(ts, value)| Cell::new(ts.0, value.clone()))
    }
}

impl RowData for MemoryRow {
    fn entity_id(&self) -> &RowKey {
        &self.key
    }

    fn most_recent_cell(&self, family: &str, qualifier: &str) -> StoreResult<Option<Cell<Value>>> {
        Ok(self.column(family, qualifier).next())
    }

    fn cells(&self, family: &str, qualifier: &str) -> StoreResult<Vec<Cell<Value>>> {
        Ok(self.column(family, qualifier).collect())
    }

    fn qualifiers(&self, family: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .cells
            .get(family)
            .map(|columns| columns.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn column_pager(
        &self,
        family: &str,
        qualifier: &str,
        max_versions: u32,
        page_size: u32,
    ) -> StoreResult<Box<dyn PagedCursor<Cell<Value>>>> {
        let items = self
            .column(family, qualifier)
            .take(max_versions as usize)
            .collect();
        Ok(Box::new(MemoryCursor::new(
            items,
            page_size,
            Arc::clone(&self.state),
        )))
    }

    fn family_pager(
        &self,
        family: &str,
        max_versions: u32,
        page_size: u32,
    ) -> StoreResult<Box<dyn PagedCursor<FamilyCell<Value>>>> {
        let items = self
            .cells
            .get(family)
            .into_iter()
            .flat_map(|columns| columns.iter())
            .flat_map(|(qualifier, versions)| {
                versions
                    .iter()
                    .take(max_versions as usize)
                    .map(move |(ts, value)| FamilyCell::new(qualifier.clone(), ts.0, value.clone()))
            })
            .collect();

        Ok(Box::new(MemoryCursor::new(
            items,
            page_size,
            Arc::clone(&self.state),
        )))
    }
}

/// Cursor handing out buffered items one page at a time.
///
/// A page size of 0 returns everything in one page.
pub(crate) struct MemoryCursor<T> {
    items: VecDeque<T>,
    page_size: usize,
    state: Arc<StoreState>,
    guard: Option<HandleGuard>,
}

impl<T> MemoryCursor<T> {
    fn new(items: VecDeque<T>, page_size: u32, state: Arc<StoreState>) -> Self {
        let guard = Some(HandleGuard::cursor(&state));
        Self {
            items,
            page_size: page_size as usize,
            state,
            guard,
        }
    }
}

impl<T: Send> PagedCursor<T> for MemoryCursor<T> {
    fn next_page(&mut self) -> StoreResult<Option<Vec<T>>> {
        if self.guard.is_none() {
            return Err(StoreError::Closed);
        }
        self.state.check(FaultPoint::PageFetch)?;

        if self.items.is_empty() {
            return Ok(None);
        }

        let take = if self.page_size == 0 {
            self.items.len()
        } else {
            self.page_size.min(self.items.len())
        };
        self.state.record_page();
        Ok(Some(self.items.drain(..take).collect()))
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.guard.is_none() {
            return Ok(());
        }
        self.state.check(FaultPoint::CursorClose)?;

        self.items.clear();
        self.guard = None;
        Ok(())
    }
}

/// Lazily projects scanned rows
pub(crate) struct MemoryScanner {
    data: Arc<TableData>,
    keys: std::vec::IntoIter<RowKey>,
    request: ReadRequest,
    state: Arc<StoreState>,
    _guard: HandleGuard,
}

impl MemoryScanner {
    pub(crate) fn new(
        data: Arc<TableData>,
        keys: Vec<RowKey>,
        request: ReadRequest,
        state: Arc<StoreState>,
        guard: HandleGuard,
    ) -> Self {
        Self {
            data,
            keys: keys.into_iter(),
            request,
            state,
            _guard: guard,
        }
    }
}

impl Iterator for MemoryScanner {
    type Item = StoreResult<Box<dyn RowData>>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        if let Err(e) = self.state.check(FaultPoint::Scan) {
            return Some(Err(e));
        }

        let cells = self.data.project(&key, &self.request);
        Some(Ok(Box::new(MemoryRow::new(
            key,
            cells,
            Arc::clone(&self.state),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::KeyValue;
    use std::cmp::Reverse;

    fn row() -> (Arc<StoreState>, MemoryRow) {
        let state = Arc::new(StoreState::default());
        let mut cells = RowCells::new();
        let family = cells.entry("query_count".to_string()).or_default();
        let hello = family.entry("hello".to_string()).or_default();
        hello.insert(Reverse(1), Value::Int(20));
        hello.insert(Reverse(2), Value::Int(30));
        let world = family.entry("world".to_string()).or_default();
        world.insert(Reverse(1), Value::Int(40));

        let key = RowKey::new(vec![KeyValue::from("taton")]);
        (Arc::clone(&state), MemoryRow::new(key, cells, state))
    }

    #[test]
    fn test_versions_most_recent_first() {
        let (_, row) = row();
        let cells = row.cells("query_count", "hello").unwrap();
        assert_eq!(
            cells,
            vec![Cell::new(2, Value::Int(30)), Cell::new(1, Value::Int(20))]
        );
        assert_eq!(
            row.most_recent_cell("query_count", "hello").unwrap(),
            Some(Cell::new(2, Value::Int(30)))
        );
        assert_eq!(
            row.qualifiers("query_count").unwrap(),
            vec!["hello".to_string(), "world".to_string()]
        );
    }

    #[test]
    fn test_family_pager_pages() {
        let (state, row) = row();
        let mut pager = row.family_pager("query_count", u32::MAX, 2).unwrap();

        let first = pager.next_page().unwrap().unwrap();
        assert_eq!(
            first,
            vec![
                FamilyCell::new("hello", 2, Value::Int(30)),
                FamilyCell::new("hello", 1, Value::Int(20)),
            ]
        );
        let second = pager.next_page().unwrap().unwrap();
        assert_eq!(second, vec![FamilyCell::new("world", 1, Value::Int(40))]);
        assert!(pager.next_page().unwrap().is_none());

        assert_eq!(state.open_cursors.load(std::sync::atomic::Ordering::SeqCst), 1);
        pager.close().unwrap();
        assert_eq!(state.open_cursors.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(pager.next_page().unwrap_err(), StoreError::Closed);
    }

    #[test]
    fn test_pagers_honor_version_bound() {
        let (_, row) = row();

        let mut column = row.column_pager("query_count", "hello", 1, 0).unwrap();
        assert_eq!(
            column.next_page().unwrap().unwrap(),
            vec![Cell::new(2, Value::Int(30))]
        );
        assert!(column.next_page().unwrap().is_none());

        let mut family = row.family_pager("query_count", 1, 0).unwrap();
        assert_eq!(
            family.next_page().unwrap().unwrap(),
            vec![
                FamilyCell::new("hello", 2, Value::Int(30)),
                FamilyCell::new("world", 1, Value::Int(40)),
            ]
        );
        column.close().unwrap();
        family.close().unwrap();
    }

    #[test]
    fn test_failed_close_keeps_cursor_open() {
        let (state, row) = row();
        let mut pager = row.column_pager("query_count", "hello", u32::MAX, 1).unwrap();

        state.faults.lock().unwrap().insert(FaultPoint::CursorClose);
        assert!(pager.close().is_err());
        assert_eq!(state.open_cursors.load(std::sync::atomic::Ordering::SeqCst), 1);

        state.faults.lock().unwrap().clear();
        pager.close().unwrap();
        assert_eq!(state.open_cursors.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}

//! Paged fields
//!
//! A paged field wraps an open store cursor. Cells are fetched one page at
//! a time as the field is iterated. The cursor stays open until the field
//! is released; an entity holding paged fields must be handed to
//! `Dao::release_entity` once the caller is done with it.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

use log::warn;

use crate::entity::{ColumnBinding, FieldShape};
use crate::store::{Cell, FamilyCell, PagedCursor, RowData, StoreResult, Value};

use super::errors::DecodeResult;
use super::fields::ColumnField;
use super::value::{convert, FromValue};

/// Page-buffered reader over a cursor, shared by both paged shapes
struct Pager<C> {
    field: &'static str,
    cursor: Option<Box<dyn PagedCursor<C>>>,
    buffer: VecDeque<C>,
    exhausted: bool,
}

impl<C> Pager<C> {
    fn empty() -> Self {
        Self {
            field: "",
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: true,
        }
    }

    fn open(field: &'static str, cursor: Box<dyn PagedCursor<C>>) -> Self {
        Self {
            field,
            cursor: Some(cursor),
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn is_open(&self) -> bool {
        self.cursor.is_some()
    }

    fn next_raw(&mut self) -> Option<StoreResult<C>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.exhausted {
                return None;
            }
            let cursor = self.cursor.as_mut()?;
            match cursor.next_page() {
                Ok(Some(page)) => self.buffer.extend(page),
                Ok(None) => self.exhausted = true,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Closes the cursor. On failure the cursor is kept so the close can
    /// be retried.
    fn close(&mut self) -> StoreResult<bool> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(false);
        };
        cursor.close()?;
        self.cursor = None;
        self.buffer.clear();
        self.exhausted = true;
        Ok(true)
    }
}

impl<C> Drop for Pager<C> {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            warn!(
                "Paged field '{}' dropped without being released; closing its cursor",
                self.field
            );
            if let Err(e) = cursor.close() {
                warn!("Failed to close cursor of paged field '{}': {}", self.field, e);
            }
        }
    }
}

/// Lazily paged versions of one column, most recent first
pub struct PagedColumn<T> {
    pager: Pager<Cell<Value>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PagedColumn<T> {
    pub(crate) fn new(field: &'static str, cursor: Box<dyn PagedCursor<Cell<Value>>>) -> Self {
        Self {
            pager: Pager::open(field, cursor),
            _marker: PhantomData,
        }
    }

    /// Whether the underlying cursor is still open
    pub fn is_open(&self) -> bool {
        self.pager.is_open()
    }

    /// Closes the cursor; a closed column yields no more cells
    pub fn close(&mut self) -> StoreResult<()> {
        self.pager.close().map(|_| ())
    }
}

impl<T> Default for PagedColumn<T> {
    fn default() -> Self {
        Self {
            pager: Pager::empty(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PagedColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedColumn")
            .field("field", &self.pager.field)
            .field("open", &self.is_open())
            .field("buffered", &self.pager.buffer.len())
            .finish()
    }
}

impl<T: FromValue> PagedColumn<T> {
    /// Iterates values only, dropping timestamps. The column stays
    /// borrowed, so it can still be released afterwards.
    pub fn values(&mut self) -> impl Iterator<Item = DecodeResult<T>> + '_ {
        self.by_ref().map(|cell| cell.map(|c| c.value))
    }
}

impl<T: FromValue> Iterator for PagedColumn<T> {
    type Item = DecodeResult<Cell<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.pager.field;
        let item = match self.pager.next_raw()? {
            Ok(cell) => cell.try_map(|value| convert(field, value)),
            Err(e) => Err(e.into()),
        };
        Some(item)
    }
}

impl<T: FromValue + 'static> ColumnField for PagedColumn<T> {
    const SHAPE: FieldShape = FieldShape::PagedColumn;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        let cursor = row.column_pager(
            binding.family(),
            binding.qualifier().unwrap_or_default(),
            binding.max_versions(),
            binding.page_size(),
        )?;
        Ok(Self::new(binding.field(), cursor))
    }

    fn release(&mut self) -> StoreResult<bool> {
        self.pager.close()
    }
}

/// Lazily paged cells of a whole map-type family, ordered by qualifier and
/// then most recent first
pub struct PagedMap<T> {
    pager: Pager<FamilyCell<Value>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PagedMap<T> {
    pub(crate) fn new(
        field: &'static str,
        cursor: Box<dyn PagedCursor<FamilyCell<Value>>>,
    ) -> Self {
        Self {
            pager: Pager::open(field, cursor),
            _marker: PhantomData,
        }
    }

    pub fn is_open(&self) -> bool {
        self.pager.is_open()
    }

    pub fn close(&mut self) -> StoreResult<()> {
        self.pager.close().map(|_| ())
    }
}

impl<T> Default for PagedMap<T> {
    fn default() -> Self {
        Self {
            pager: Pager::empty(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PagedMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedMap")
            .field("field", &self.pager.field)
            .field("open", &self.is_open())
            .field("buffered", &self.pager.buffer.len())
            .finish()
    }
}

impl<T: FromValue> Iterator for PagedMap<T> {
    type Item = DecodeResult<FamilyCell<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.pager.field;
        let item = match self.pager.next_raw()? {
            Ok(cell) => cell.try_map(|value| convert(field, value)),
            Err(e) => Err(e.into()),
        };
        Some(item)
    }
}

impl<T: FromValue + 'static> ColumnField for PagedMap<T> {
    const SHAPE: FieldShape = FieldShape::PagedMap;

    fn decode(row: &dyn RowData, binding: &ColumnBinding) -> DecodeResult<Self> {
        let cursor = row.family_pager(
            binding.family(),
            binding.max_versions(),
            binding.page_size(),
        )?;
        Ok(Self::new(binding.field(), cursor))
    }

    fn release(&mut self) -> StoreResult<bool> {
        self.pager.close()
    }
}

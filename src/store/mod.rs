//! Store subsystem
//!
//! The wide-column store is an external collaborator. This module defines
//! the contract the mapping layer consumes:
//!
//! - tables with a layout (families + key schema)
//! - key resolution from named components
//! - single-row reads and scans driven by a [`ReadRequest`]
//! - row accessors for most recent cells, version lists and qualifiers
//! - paged cursors that must be closed explicitly
//!
//! [`memory::MemoryStore`] implements the contract in process.

mod errors;
mod key;
mod layout;
pub mod memory;
mod request;
mod table;
mod value;

pub use errors::{StoreError, StoreResult};
pub use key::{ComponentType, KeyComponentDef, KeySchema, KeyValue, RowKey};
pub use layout::{FamilyLayout, TableLayout};
pub use request::{ColumnRequest, ReadRequest, ScanOptions, TimeRange};
pub use table::{PagedCursor, RowData, RowScanner, Store, Table, TableReader};
pub use value::{Cell, FamilyCell, Value};

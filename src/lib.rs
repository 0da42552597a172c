//! ohm - Object mapping over a wide-column store
//!
//! Maps plain Rust types onto rows of a multi-versioned family/qualifier
//! store. Reads only: entities are selected by key or scanned, never
//! written back.

pub mod dao;
pub mod decode;
pub mod entity;
pub mod observability;
pub mod request;
pub mod store;

pub use dao::{Dao, DaoConfig, DaoError, DaoResult, EntityScanner};
pub use decode::{
    MapTimeSeries, MapValues, PagedColumn, PagedMap, RawCell, ResourceReleaser, RowDecoder,
    TimeSeries,
};
pub use entity::{ColumnDef, Entity, EntityDescriptor, EntitySpec, FieldShape, SpecError};
pub use request::RequestBuilder;

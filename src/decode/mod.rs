//! Decode subsystem
//!
//! Turns rows into entities:
//!
//! - [`FromValue`] converts store values into field types
//! - [`ColumnField`] decodes one bound field; the field's type fixes its shape
//! - [`RowDecoder`] populates a whole entity from a row
//! - [`ResourceReleaser`] closes the cursors of paged fields

mod decoder;
mod errors;
mod fields;
mod paged;
mod release;
mod value;

pub use decoder::RowDecoder;
pub use errors::{DecodeError, DecodeResult, ReleaseError, ReleaseFailure};
pub use fields::{ColumnField, MapTimeSeries, MapValues, RawCell, TimeSeries};
pub use paged::{PagedColumn, PagedMap};
pub use release::ResourceReleaser;
pub use value::FromValue;

pub(crate) use value::convert;

//! Entity subsystem
//!
//! Entity types declare their bindings once through an
//! [`EntityDescriptor`]. A descriptor is validated against the table
//! layout into an immutable [`EntitySpec`], memoized per type in a
//! [`SpecRegistry`].
//!
//! Every binding error is raised here, before any row is read.

mod binding;
mod descriptor;
mod errors;
mod registry;
mod spec;

pub use binding::{ColumnBinding, ColumnDef, EntityIdBinding, FieldShape, ALL_VERSIONS};
pub use descriptor::{Entity, EntityDescriptor};
pub use errors::{SpecError, SpecErrorCode, SpecResult};
pub use registry::{SpecLookup, SpecRegistry};
pub use spec::EntitySpec;

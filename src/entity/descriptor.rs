//! Entity descriptors
//!
//! An entity type lists its fields once, with explicit accessors. Each
//! declaration captures a typed setter so that decoding a row is a single
//! indirect call per field.
//!
//! ```ignore
//! #[derive(Default)]
//! struct User {
//!     login: String,
//!     zip_code: i32,
//!     zip_history: TimeSeries<i32>,
//! }
//!
//! impl Entity for User {
//!     fn describe() -> EntityDescriptor<Self> {
//!         EntityDescriptor::<Self>::new("user_table")
//!             .entity_id("login", "login", |u| &mut u.login)
//!             .column("zip_code", ColumnDef::new("info", "zip_code"), |u| &mut u.zip_code)
//!             .column(
//!                 "zip_history",
//!                 ColumnDef::new("info", "zip_code").all_versions(),
//!                 |u| &mut u.zip_history,
//!             )
//!     }
//! }
//! ```

use crate::decode::{convert, ColumnField, DecodeResult, FromValue};
use crate::store::{RowData, StoreResult, Value};

use super::binding::{ColumnBinding, ColumnDef, FieldShape};

/// A type that can be populated from a table row
pub trait Entity: Default + Send + 'static {
    /// Declares the table and field bindings of this type
    fn describe() -> EntityDescriptor<Self>;
}

pub(crate) type DecodeFn<E> =
    Box<dyn Fn(&mut E, &dyn RowData, &ColumnBinding) -> DecodeResult<()> + Send + Sync>;

/// Closes the field's cursor; `Ok(true)` when one was open
pub(crate) type ReleaseFn<E> = Box<dyn Fn(&mut E) -> StoreResult<bool> + Send + Sync>;

pub(crate) type AssignFn<E> = Box<dyn Fn(&mut E, Value) -> DecodeResult<()> + Send + Sync>;

pub(crate) enum FieldKind<E> {
    Column {
        def: ColumnDef,
        shape: FieldShape,
        decode: DecodeFn<E>,
        release: ReleaseFn<E>,
    },
    EntityId {
        component: String,
        assign: AssignFn<E>,
    },
    Unbound,
}

impl<E> FieldKind<E> {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            FieldKind::Column { .. } => "column",
            FieldKind::EntityId { .. } => "entity-id",
            FieldKind::Unbound => "unbound",
        }
    }
}

pub(crate) struct FieldDecl<E> {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind<E>,
}

/// Declared table and fields of an entity type
pub struct EntityDescriptor<E> {
    table: String,
    fields: Vec<FieldDecl<E>>,
}

impl<E: Entity> EntityDescriptor<E> {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    /// Binds a field to a column or a map-type family
    pub fn column<F: ColumnField>(
        mut self,
        name: &'static str,
        def: ColumnDef,
        accessor: fn(&mut E) -> &mut F,
    ) -> Self {
        let decode: DecodeFn<E> = Box::new(
            move |entity: &mut E, row: &dyn RowData, binding: &ColumnBinding| {
                let value = F::decode(row, binding)?;
                *accessor(entity) = value;
                Ok(())
            },
        );
        let release: ReleaseFn<E> = Box::new(move |entity: &mut E| accessor(entity).release());

        self.fields.push(FieldDecl {
            name,
            kind: FieldKind::Column {
                def,
                shape: F::SHAPE,
                decode,
                release,
            },
        });
        self
    }

    /// Binds a field to a row-key component
    pub fn entity_id<F: FromValue + Send + 'static>(
        mut self,
        name: &'static str,
        component: impl Into<String>,
        accessor: fn(&mut E) -> &mut F,
    ) -> Self {
        let assign: AssignFn<E> = Box::new(move |entity: &mut E, value: Value| {
            *accessor(entity) = convert(name, value)?;
            Ok(())
        });

        self.fields.push(FieldDecl {
            name,
            kind: FieldKind::EntityId {
                component: component.into(),
                assign,
            },
        });
        self
    }

    /// Lists a field that is not read from the table
    pub fn field(mut self, name: &'static str) -> Self {
        self.fields.push(FieldDecl {
            name,
            kind: FieldKind::Unbound,
        });
        self
    }
}

impl<E> EntityDescriptor<E> {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<FieldDecl<E>>) {
        (self.table, self.fields)
    }
}

//! Entity specs
//!
//! An [`EntitySpec`] is a descriptor checked against a table layout.
//! Building one performs every check up front:
//!
//! - a field is declared at most once, and never as both a column and an
//!   entity id
//! - column bindings name an existing family; an empty qualifier needs a
//!   map-type family, a qualifier needs a known column of a group family
//! - the field shape fits the binding (paged shapes need a page size, every
//!   other shape forbids one)
//! - entity-id bindings name a component of the key schema
//!
//! Once built, a spec is immutable and decoding never re-validates.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::store::TableLayout;

use super::binding::{ColumnBinding, ColumnDef, EntityIdBinding, FieldShape};
use super::descriptor::{AssignFn, DecodeFn, Entity, EntityDescriptor, FieldKind, ReleaseFn};
use super::errors::{SpecError, SpecResult};

const GROUP_SHAPES: &[FieldShape] = &[FieldShape::Scalar, FieldShape::TimeSeries, FieldShape::RawCell];
const MAP_SHAPES: &[FieldShape] = &[FieldShape::MapOfScalar, FieldShape::MapOfTimeSeries];

pub(crate) struct ColumnSlot<E> {
    pub(crate) binding: ColumnBinding,
    pub(crate) decode: DecodeFn<E>,
    pub(crate) release: ReleaseFn<E>,
}

pub(crate) struct EntityIdSlot<E> {
    pub(crate) binding: EntityIdBinding,
    pub(crate) assign: AssignFn<E>,
}

/// Validated, immutable mapping of an entity type onto a table
pub struct EntitySpec<E> {
    table: String,
    columns: Vec<ColumnSlot<E>>,
    entity_ids: Vec<EntityIdSlot<E>>,
}

impl<E: Entity> EntitySpec<E> {
    /// Describes `E` and validates it against `layout`
    pub fn for_entity(layout: &TableLayout) -> SpecResult<Self> {
        Self::build(E::describe(), layout)
    }
}

impl<E> EntitySpec<E> {
    /// Validates a descriptor against a table layout
    pub fn build(descriptor: EntityDescriptor<E>, layout: &TableLayout) -> SpecResult<Self> {
        let (table, fields) = descriptor.into_parts();

        if table.is_empty() {
            return Err(SpecError::invalid_descriptor(
                &layout.name,
                None,
                "descriptor names no table",
            ));
        }
        if table != layout.name {
            return Err(SpecError::invalid_descriptor(
                &table,
                None,
                format!("descriptor is checked against layout of table '{}'", layout.name),
            ));
        }

        // Duplicate declarations first: a column + entity-id pair is the
        // binding conflict, anything else declared twice is malformed.
        let mut seen: HashMap<&'static str, &'static str> = HashMap::new();
        for decl in &fields {
            let label = decl.kind.label();
            if let Some(previous) = seen.insert(decl.name, label) {
                let pair = [previous, label];
                if pair.contains(&"column") && pair.contains(&"entity-id") {
                    return Err(SpecError::binding_conflict(&table, decl.name));
                }
                return Err(SpecError::invalid_descriptor(
                    &table,
                    Some(decl.name),
                    "field declared more than once",
                ));
            }
        }

        let mut columns = Vec::new();
        let mut entity_ids = Vec::new();

        for decl in fields {
            match decl.kind {
                FieldKind::Unbound => {
                    debug!("Ignoring field with no binding: {}", decl.name);
                }
                FieldKind::Column {
                    def,
                    shape,
                    decode,
                    release,
                } => {
                    check_column(&table, layout, decl.name, &def, shape)?;
                    debug!(
                        "Binding field {} to {}:{} as {}",
                        decl.name, def.family, def.qualifier, shape
                    );
                    columns.push(ColumnSlot {
                        binding: ColumnBinding::new(decl.name, def, shape),
                        decode,
                        release,
                    });
                }
                FieldKind::EntityId { component, assign } => {
                    let index = layout.key_schema.index_of(&component).ok_or_else(|| {
                        SpecError::unknown_component(&table, decl.name, &component)
                    })?;
                    debug!(
                        "Binding field {} to entity-id component {} (index {})",
                        decl.name, component, index
                    );
                    entity_ids.push(EntityIdSlot {
                        binding: EntityIdBinding::new(decl.name, component, index),
                        assign,
                    });
                }
            }
        }

        Ok(Self {
            table,
            columns,
            entity_ids,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column bindings in declaration order
    pub fn column_bindings(&self) -> impl Iterator<Item = &ColumnBinding> {
        self.columns.iter().map(|slot| &slot.binding)
    }

    /// Entity-id bindings in declaration order
    pub fn entity_id_bindings(&self) -> impl Iterator<Item = &EntityIdBinding> {
        self.entity_ids.iter().map(|slot| &slot.binding)
    }

    pub fn column_binding(&self, field: &str) -> Option<&ColumnBinding> {
        self.column_bindings().find(|b| b.field() == field)
    }

    pub fn has_paged_fields(&self) -> bool {
        self.columns.iter().any(|slot| slot.binding.is_paged())
    }

    pub(crate) fn column_slots(&self) -> &[ColumnSlot<E>] {
        &self.columns
    }

    pub(crate) fn entity_id_slots(&self) -> &[EntityIdSlot<E>] {
        &self.entity_ids
    }
}

fn check_column(
    table: &str,
    layout: &TableLayout,
    field: &str,
    def: &ColumnDef,
    shape: FieldShape,
) -> SpecResult<()> {
    if def.family.is_empty() {
        return Err(SpecError::invalid_descriptor(
            table,
            Some(field),
            "column binding names no family",
        ));
    }
    if def.max_versions == 0 {
        return Err(SpecError::invalid_descriptor(
            table,
            Some(field),
            "max_versions must be at least 1",
        ));
    }

    let family = layout
        .family(&def.family)
        .ok_or_else(|| SpecError::unknown_family(table, field, &def.family))?;

    let allowed: &[FieldShape] = if def.qualifier.is_empty() {
        if !family.is_map_type() {
            return Err(SpecError::not_map_family(table, field, &def.family));
        }
        if def.page_size > 0 {
            &[FieldShape::PagedMap]
        } else {
            MAP_SHAPES
        }
    } else {
        if family.is_map_type() {
            return Err(SpecError::map_family_qualifier(
                table,
                field,
                &def.family,
                &def.qualifier,
            ));
        }
        if !layout.has_column(&def.family, &def.qualifier) {
            return Err(SpecError::unknown_column(
                table,
                field,
                &def.family,
                &def.qualifier,
            ));
        }
        if def.page_size > 0 {
            &[FieldShape::PagedColumn]
        } else {
            GROUP_SHAPES
        }
    };

    if !allowed.contains(&shape) {
        return Err(SpecError::shape_mismatch(table, field, shape, allowed));
    }
    Ok(())
}

impl<E> PartialEq for EntitySpec<E> {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.column_bindings().eq(other.column_bindings())
            && self.entity_id_bindings().eq(other.entity_id_bindings())
    }
}

impl<E> fmt::Debug for EntitySpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySpec")
            .field("table", &self.table)
            .field("columns", &self.column_bindings().collect::<Vec<_>>())
            .field("entity_ids", &self.entity_id_bindings().collect::<Vec<_>>())
            .finish()
    }
}

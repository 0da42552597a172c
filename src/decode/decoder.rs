//! Row decoder
//!
//! Populates an entity from a row using the setters captured in its spec.
//! Entity-id fields come from the row key; column fields run their own
//! decode routine. A decode failure releases any paged field opened before
//! it, so a failed decode never leaks a cursor.

use log::{debug, warn};

use crate::entity::{Entity, EntitySpec};
use crate::store::{RowData, StoreError, Value};

use super::errors::DecodeResult;

/// Decodes rows into entities of one spec
pub struct RowDecoder<'a, E> {
    spec: &'a EntitySpec<E>,
}

impl<'a, E: Entity> RowDecoder<'a, E> {
    pub fn new(spec: &'a EntitySpec<E>) -> Self {
        Self { spec }
    }

    /// Decodes a row into a fresh entity
    pub fn decode(&self, row: &dyn RowData) -> DecodeResult<E> {
        let mut entity = E::default();
        self.decode_into(row, &mut entity)?;
        Ok(entity)
    }

    /// Populates the bound fields of an existing entity. Unbound fields are
    /// left untouched.
    pub fn decode_into(&self, row: &dyn RowData, entity: &mut E) -> DecodeResult<()> {
        let key = row.entity_id();
        debug!("Creating entity from row {} of table {}", key, self.spec.table());

        for slot in self.spec.entity_id_slots() {
            let index = slot.binding.index();
            let component = key.component_at(index).cloned().ok_or_else(|| {
                StoreError::KeyArity {
                    table: self.spec.table().to_string(),
                    expected: index + 1,
                    actual: key.components().len(),
                }
            })?;
            debug!(
                "Populating entity-id field {} from component {}",
                slot.binding.field(),
                slot.binding.component()
            );
            (slot.assign)(&mut *entity, Value::from(component))?;
        }

        let slots = self.spec.column_slots();
        for (position, slot) in slots.iter().enumerate() {
            debug!("Populating field {} from {}", slot.binding.field(), slot.binding);
            if let Err(e) = (slot.decode)(&mut *entity, row, &slot.binding) {
                for opened in slots[..position].iter().filter(|s| s.binding.is_paged()) {
                    if let Err(close) = (opened.release)(&mut *entity) {
                        warn!(
                            "Failed to release paged field {} after decode error: {}",
                            opened.binding.field(),
                            close
                        );
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

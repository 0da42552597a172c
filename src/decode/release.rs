//! Resource releaser
//!
//! Closes the cursors held by an entity's paged fields. Every paged field
//! is attempted; failures are collected and reported together afterwards.

use log::{debug, warn};

use crate::entity::EntitySpec;

use super::errors::{ReleaseError, ReleaseFailure};

/// Releases the paged fields of entities of one spec
pub struct ResourceReleaser<'a, E> {
    spec: &'a EntitySpec<E>,
}

impl<'a, E> ResourceReleaser<'a, E> {
    pub fn new(spec: &'a EntitySpec<E>) -> Self {
        Self { spec }
    }

    /// Closes every open paged field of `entity`.
    ///
    /// Returns the number of cursors closed. Fields that were never opened
    /// or were already released are skipped.
    pub fn release(&self, entity: &mut E) -> Result<usize, ReleaseError> {
        let mut closed = 0;
        let mut failures = Vec::new();

        for slot in self
            .spec
            .column_slots()
            .iter()
            .filter(|slot| slot.binding.is_paged())
        {
            let field = slot.binding.field();
            match (slot.release)(&mut *entity) {
                Ok(true) => {
                    debug!("Released paged field {}", field);
                    closed += 1;
                }
                Ok(false) => {}
                Err(error) => {
                    warn!("Failed to release paged field {}: {}", field, error);
                    failures.push(ReleaseFailure { field, error });
                }
            }
        }

        if failures.is_empty() {
            Ok(closed)
        } else {
            Err(ReleaseError {
                failures,
                released: closed,
            })
        }
    }
}

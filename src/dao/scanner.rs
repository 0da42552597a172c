//! Entity scanner
//!
//! Lazy sequence of entities decoded from a store scan. The scanner owns
//! the table and reader handles of the scan; dropping it releases them.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::decode::RowDecoder;
use crate::entity::{Entity, EntitySpec};
use crate::observability::DaoMetrics;
use crate::store::{RowScanner, Table, TableReader};

use super::errors::DaoResult;

/// Iterator over the entities of a scan
pub struct EntityScanner<'a, E> {
    spec: Arc<EntitySpec<E>>,
    // Field order is drop order: rows before the handles they read from
    rows: RowScanner,
    _reader: Box<dyn TableReader>,
    _table: Box<dyn Table>,
    metrics: &'a DaoMetrics,
    log_rows: bool,
}

impl<'a, E: Entity> EntityScanner<'a, E> {
    pub(crate) fn new(
        spec: Arc<EntitySpec<E>>,
        rows: RowScanner,
        reader: Box<dyn TableReader>,
        table: Box<dyn Table>,
        metrics: &'a DaoMetrics,
        log_rows: bool,
    ) -> Self {
        Self {
            spec,
            rows,
            _reader: reader,
            _table: table,
            metrics,
            log_rows,
        }
    }

    pub fn spec(&self) -> &EntitySpec<E> {
        &self.spec
    }
}

impl<'a, E: Entity> Iterator for EntityScanner<'a, E> {
    type Item = DaoResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };

        let entity = RowDecoder::new(&self.spec)
            .decode(row.as_ref())
            .map_err(Into::into);
        if entity.is_ok() {
            self.metrics.increment_rows_decoded();
            if self.log_rows {
                debug!("Scanned row {} of table {}", row.entity_id(), self.spec.table());
            }
        }
        Some(entity)
    }
}

impl<'a, E> fmt::Debug for EntityScanner<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityScanner")
            .field("table", &self.spec.table())
            .finish()
    }
}

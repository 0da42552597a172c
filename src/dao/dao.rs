//! Data access object
//!
//! # Select Flow (strict order)
//!
//! 1. Look up (or build) the entity spec
//! 2. Build the read request from its column bindings
//! 3. Open the table and resolve the row key
//! 4. Fetch the row through a reader
//! 5. Decode the row into the entity
//!
//! Table and reader handles live only for the duration of one select and
//! are dropped on every return path. Spec errors surface before any row
//! is read.

use std::any::type_name;
use std::sync::Arc;

use log::debug;

use crate::decode::{ResourceReleaser, RowDecoder};
use crate::entity::{Entity, EntitySpec, SpecRegistry};
use crate::observability::{DaoMetrics, Event};
use crate::request::RequestBuilder;
use crate::store::{KeyValue, RowKey, ScanOptions, Store, TimeRange};

use super::config::DaoConfig;
use super::errors::{DaoError, DaoResult};
use super::scanner::EntityScanner;

/// How a select names its row
enum RowRef<'k> {
    Components(&'k [KeyValue]),
    Key(&'k RowKey),
}

/// Read-only data access object over one store
pub struct Dao<S: Store> {
    store: S,
    config: DaoConfig,
    registry: SpecRegistry,
    metrics: DaoMetrics,
    closed: bool,
}

impl<S: Store> Dao<S> {
    pub fn new(store: S) -> Self {
        Self::assemble(store, DaoConfig::default())
    }

    /// Creates a DAO with an explicit configuration.
    ///
    /// The configuration is validated first; on failure the store handle
    /// is released and the error returned.
    pub fn with_config(store: S, config: DaoConfig) -> DaoResult<Self> {
        if let Err(e) = config.validate() {
            if let Err(release) = store.release() {
                log::warn!("Failed to release store handle: {}", release);
            }
            return Err(e);
        }
        Ok(Self::assemble(store, config))
    }

    fn assemble(store: S, config: DaoConfig) -> Self {
        Self {
            store,
            config,
            registry: SpecRegistry::new(),
            metrics: DaoMetrics::new(),
            closed: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    pub fn metrics(&self) -> &DaoMetrics {
        &self.metrics
    }

    /// Returns the spec of `E`, building it against the table layout on
    /// first use
    pub fn spec<E: Entity>(&self) -> DaoResult<Arc<EntitySpec<E>>> {
        let entity = type_name::<E>();
        let lookup = self.registry.get_or_build(|| -> DaoResult<EntitySpec<E>> {
            let descriptor = E::describe();
            let table = self.store.open_table(descriptor.table())?;
            Ok(EntitySpec::build(descriptor, table.layout())?)
        })?;

        if lookup.built {
            self.metrics.increment_specs_built();
            Event::SpecBuilt.emit(&[("entity", entity), ("table", lookup.spec.table())]);
        } else {
            self.metrics.increment_spec_cache_hits();
            Event::SpecCacheHit.emit(&[("entity", entity)]);
        }
        Ok(lookup.spec)
    }

    /// Selects the row with the given key components, within the
    /// configured time range
    pub fn select<E: Entity>(&self, components: &[KeyValue]) -> DaoResult<E> {
        self.select_in_range(components, self.config.time_range)
    }

    /// Selects the row with the given key components, keeping only cells
    /// written within `time_range`
    pub fn select_in_range<E: Entity>(
        &self,
        components: &[KeyValue],
        time_range: TimeRange,
    ) -> DaoResult<E> {
        let mut entity = E::default();
        self.run_select(RowRef::Components(components), time_range, &mut entity)?;
        Ok(entity)
    }

    /// Selects a row by an already resolved key
    pub fn select_by_key<E: Entity>(&self, key: &RowKey, time_range: TimeRange) -> DaoResult<E> {
        let mut entity = E::default();
        self.run_select(RowRef::Key(key), time_range, &mut entity)?;
        Ok(entity)
    }

    /// Populates the bound fields of an existing entity
    pub fn select_into<E: Entity>(
        &self,
        entity: &mut E,
        components: &[KeyValue],
        time_range: TimeRange,
    ) -> DaoResult<()> {
        self.run_select(RowRef::Components(components), time_range, entity)
    }

    /// Scans the entity's table, decoding rows lazily.
    ///
    /// Scan bounds, limit and batch size are handed to the store as given;
    /// a zero batch size falls back to the configured one. Stores without
    /// scan support fail with [`DaoError::Unsupported`].
    pub fn select_all<E: Entity>(&self, options: ScanOptions) -> DaoResult<EntityScanner<'_, E>> {
        let spec = self.spec::<E>()?;

        let mut options = options;
        if options.batch_size == 0 {
            options.batch_size = self.config.scan_batch_size;
        }
        let request = RequestBuilder::new(&spec)
            .with_time_range(self.config.time_range)
            .build();

        let table = self.store.open_table(spec.table())?;
        let reader = table.open_reader()?;
        let rows = reader.scan(&request, &options)?;

        let limit = options.limit.map(|l| l.to_string());
        Event::ScanStart.emit(&[
            ("entity", type_name::<E>()),
            ("table", spec.table()),
            ("limit", limit.as_deref().unwrap_or("none")),
        ]);

        Ok(EntityScanner::new(
            spec,
            rows,
            reader,
            table,
            &self.metrics,
            self.config.log_decoded_rows,
        ))
    }

    /// Closes every open paged field of `entity`.
    ///
    /// Every paged field is attempted even when an earlier one fails.
    /// Returns the number of cursors closed.
    pub fn release_entity<E: Entity>(&self, entity: &mut E) -> DaoResult<usize> {
        let spec = self.spec::<E>()?;
        match ResourceReleaser::new(&spec).release(entity) {
            Ok(released) => {
                self.metrics.add_paged_fields_released(released as u64);
                let count = released.to_string();
                Event::EntityReleased.emit(&[("entity", type_name::<E>()), ("released", &count)]);
                Ok(released)
            }
            Err(e) => {
                self.metrics.add_paged_fields_released(e.released as u64);
                self.metrics.add_release_failures(e.failures.len() as u64);
                let fields = e.fields().join(",");
                Event::ReleaseFailed.emit(&[("entity", type_name::<E>()), ("fields", &fields)]);
                Err(DaoError::ResourceRelease(e))
            }
        }
    }

    /// Releases the store handle
    pub fn close(mut self) -> DaoResult<()> {
        self.closed = true;
        self.store.release()?;
        Event::DaoClosed.emit(&[]);
        Ok(())
    }

    fn run_select<E: Entity>(
        &self,
        row: RowRef<'_>,
        time_range: TimeRange,
        entity: &mut E,
    ) -> DaoResult<()> {
        self.metrics.increment_selects();
        let name = type_name::<E>();

        let result = self.spec::<E>().and_then(|spec| {
            Event::SelectStart.emit(&[("entity", name), ("table", spec.table())]);
            self.read_into(&spec, row, time_range, entity)
        });

        match &result {
            Ok(()) => {
                self.metrics.increment_rows_decoded();
                Event::SelectComplete.emit(&[("entity", name)]);
            }
            Err(e) => {
                self.metrics.increment_select_failures();
                let error = e.to_string();
                Event::SelectFailed.emit(&[("entity", name), ("error", &error)]);
            }
        }
        result
    }

    fn read_into<E: Entity>(
        &self,
        spec: &EntitySpec<E>,
        row: RowRef<'_>,
        time_range: TimeRange,
        entity: &mut E,
    ) -> DaoResult<()> {
        let request = RequestBuilder::new(spec)
            .with_time_range(time_range)
            .build();

        let table = self.store.open_table(spec.table())?;
        let key = match row {
            RowRef::Components(components) => table.entity_id(components)?,
            RowRef::Key(key) => key.clone(),
        };
        let reader = table.open_reader()?;
        let data = reader.get(&key, &request)?;

        RowDecoder::new(spec).decode_into(data.as_ref(), entity)?;
        if self.config.log_decoded_rows {
            debug!("Decoded row {} of table {} in {}", key, spec.table(), time_range);
        }
        Ok(())
    }
}

impl<S: Store> Drop for Dao<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.store.release() {
            log::warn!("Failed to release store handle: {}", e);
        }
    }
}

impl<S: Store> std::fmt::Debug for Dao<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dao")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("closed", &self.closed)
            .finish()
    }
}

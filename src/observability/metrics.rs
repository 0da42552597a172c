//! DAO metrics
//!
//! Counters only, monotonic, relaxed ordering. Values are exact once the
//! operations being counted have returned.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of one DAO
#[derive(Debug, Default)]
pub struct DaoMetrics {
    /// Entity specs built
    specs_built: AtomicU64,
    /// Spec lookups served from the registry
    spec_cache_hits: AtomicU64,
    /// Selects attempted
    selects: AtomicU64,
    /// Selects that returned an error
    select_failures: AtomicU64,
    /// Rows decoded into entities (selects and scans)
    rows_decoded: AtomicU64,
    /// Paged fields closed by release
    paged_fields_released: AtomicU64,
    /// Paged fields that failed to close
    release_failures: AtomicU64,
}

impl DaoMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_specs_built(&self) {
        self.specs_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_spec_cache_hits(&self) {
        self.spec_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_selects(&self) {
        self.selects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_select_failures(&self) {
        self.select_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rows_decoded(&self) {
        self.rows_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_paged_fields_released(&self, count: u64) {
        self.paged_fields_released.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_release_failures(&self, count: u64) {
        self.release_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DaoMetricsSnapshot {
        DaoMetricsSnapshot {
            specs_built: self.specs_built.load(Ordering::Relaxed),
            spec_cache_hits: self.spec_cache_hits.load(Ordering::Relaxed),
            selects: self.selects.load(Ordering::Relaxed),
            select_failures: self.select_failures.load(Ordering::Relaxed),
            rows_decoded: self.rows_decoded.load(Ordering::Relaxed),
            paged_fields_released: self.paged_fields_released.load(Ordering::Relaxed),
            release_failures: self.release_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the DAO counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaoMetricsSnapshot {
    pub specs_built: u64,
    pub spec_cache_hits: u64,
    pub selects: u64,
    pub select_failures: u64,
    pub rows_decoded: u64,
    pub paged_fields_released: u64,
    pub release_failures: u64,
}

impl DaoMetricsSnapshot {
    /// Snapshot as a JSON object with fields in declaration order
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

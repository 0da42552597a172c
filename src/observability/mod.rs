//! Observability subsystem
//!
//! - Lifecycle events written through the `log` facade
//! - Per-DAO counters
//!
//! Observability is read-only: nothing here changes what a DAO returns.
//!
//! ```ignore
//! use ohm::observability::{DaoMetrics, Event};
//!
//! Event::SelectComplete.emit(&[("table", "user_table")]);
//!
//! let metrics = DaoMetrics::new();
//! metrics.increment_selects();
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{DaoMetrics, DaoMetricsSnapshot};

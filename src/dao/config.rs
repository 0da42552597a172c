//! DAO configuration
//!
//! ```json
//! {
//!   "time_range": { "min": 0, "max": 9223372036854775807 },
//!   "scan_batch_size": 100,
//!   "log_decoded_rows": false
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::TimeRange;

use super::errors::{DaoError, DaoResult};

/// DAO configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Time range used by selects that do not pass one (default: all time)
    #[serde(default)]
    pub time_range: TimeRange,

    /// Rows per scan round trip when scan options leave it unset
    /// (default 0, the store's choice)
    #[serde(default)]
    pub scan_batch_size: u32,

    /// Log one debug line per decoded row (default false)
    #[serde(default)]
    pub log_decoded_rows: bool,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            time_range: TimeRange::all(),
            scan_batch_size: 0,
            log_decoded_rows: false,
        }
    }
}

impl DaoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn with_scan_batch_size(mut self, batch_size: u32) -> Self {
        self.scan_batch_size = batch_size;
        self
    }

    pub fn with_decoded_row_logging(mut self, enabled: bool) -> Self {
        self.log_decoded_rows = enabled;
        self
    }

    /// Parses and validates a JSON configuration
    pub fn from_json_str(json: &str) -> DaoResult<Self> {
        let config: DaoConfig = serde_json::from_str(json)
            .map_err(|e| DaoError::config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file
    pub fn from_json_file(path: &Path) -> DaoResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DaoError::config(format!("Failed to read config: {}", e)))?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> DaoResult<()> {
        if self.time_range.min < 0 {
            return Err(DaoError::config(format!(
                "time_range.min must be >= 0, got {}",
                self.time_range.min
            )));
        }
        if self.time_range.min > self.time_range.max {
            return Err(DaoError::config(format!(
                "time_range is inverted: {}",
                self.time_range
            )));
        }
        Ok(())
    }
}

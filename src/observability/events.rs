//! DAO lifecycle events
//!
//! Each event has a stable upper-case name and is written through the
//! `log` facade as one line: the name followed by `key=value` fields in
//! the order given.

use std::fmt;

use log::Level;

/// Observable DAO events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Specs
    /// Entity spec built and cached
    SpecBuilt,
    /// Entity spec served from the registry
    SpecCacheHit,

    // Selects
    /// Single-row select begins
    SelectStart,
    /// Single-row select decoded an entity
    SelectComplete,
    /// Single-row select failed
    SelectFailed,

    // Scans
    /// Scan opened
    ScanStart,

    // Release
    /// Paged fields of an entity released
    EntityReleased,
    /// At least one paged field failed to close
    ReleaseFailed,

    // Lifecycle
    /// DAO closed and store handle released
    DaoClosed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SpecBuilt => "SPEC_BUILT",
            Event::SpecCacheHit => "SPEC_CACHE_HIT",
            Event::SelectStart => "SELECT_BEGIN",
            Event::SelectComplete => "SELECT_COMPLETE",
            Event::SelectFailed => "SELECT_FAILED",
            Event::ScanStart => "SCAN_BEGIN",
            Event::EntityReleased => "ENTITY_RELEASED",
            Event::ReleaseFailed => "RELEASE_FAILED",
            Event::DaoClosed => "DAO_CLOSED",
        }
    }

    /// Returns true if this event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SelectFailed | Event::ReleaseFailed)
    }

    /// Log level the event is written at
    pub fn level(&self) -> Level {
        match self {
            Event::SelectFailed | Event::ReleaseFailed => Level::Warn,
            Event::SpecBuilt | Event::DaoClosed => Level::Info,
            _ => Level::Debug,
        }
    }

    /// Formats the event line
    pub fn format(&self, fields: &[(&str, &str)]) -> String {
        let mut line = String::from(self.as_str());
        for (key, value) in fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    /// Writes the event through the `log` facade
    pub fn emit(&self, fields: &[(&str, &str)]) {
        let level = self.level();
        if log::log_enabled!(level) {
            log::log!(level, "{}", self.format(fields));
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Event; 9] = [
        Event::SpecBuilt,
        Event::SpecCacheHit,
        Event::SelectStart,
        Event::SelectComplete,
        Event::SelectFailed,
        Event::ScanStart,
        Event::EntityReleased,
        Event::ReleaseFailed,
        Event::DaoClosed,
    ];

    #[test]
    fn test_all_events_have_string_representation() {
        for event in ALL {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events_log_as_warnings() {
        for event in ALL {
            assert_eq!(event.is_failure(), event.level() == Level::Warn);
        }
    }

    #[test]
    fn test_format_keeps_field_order() {
        let line = Event::SelectComplete.format(&[("table", "user_table"), ("entity", "User")]);
        assert_eq!(line, "SELECT_COMPLETE table=user_table entity=User");
        assert_eq!(Event::DaoClosed.format(&[]), "DAO_CLOSED");
    }

    #[test]
    fn test_emit_without_logger() {
        // No logger installed; must not panic
        Event::SpecBuilt.emit(&[("table", "user_table")]);
    }
}

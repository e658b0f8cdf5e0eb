//! Observability for the schema engine
//!
//! - Structured JSON logging
//! - Typed lifecycle events
//! - Per-registry counters
//! - Scope-based begin/complete logging
//!
//! Observability is read-only: nothing here changes schema behavior, and a
//! failed log write is ignored.
//!
//! # Usage
//!
//! ```ignore
//! use aeroschema::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::ClassCreated, &[("class", "Person")]);
//!
//! let scope = ObservationScope::new("SCHEMA_RELOAD");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_failure() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_of(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_severity() {
        assert_eq!(severity_of(Event::SchemaCorruption), Severity::Fatal);
        assert_eq!(severity_of(Event::MutationRejected), Severity::Warn);
        assert_eq!(severity_of(Event::ClassCreated), Severity::Info);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event(Event::SchemaOpen);
        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
    }
}

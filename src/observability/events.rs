//! Observable schema events
//!
//! Every lifecycle event the registry, store and CLI emit is a variant here.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Registry opened and loaded from its store
    SchemaOpen,
    /// Registry reloaded from its store
    SchemaReloaded,

    // Structural mutations
    /// Class created
    ClassCreated,
    /// Class dropped
    ClassDropped,
    /// Superclass list replaced
    SuperclassesChanged,
    /// Abstract flag toggled
    ClassAbstractChanged,
    /// Property declared
    PropertyCreated,
    /// Property removed
    PropertyDropped,
    /// Mutation refused, state unchanged
    MutationRejected,

    // Snapshots
    /// Immutable snapshot taken
    SnapshotCreated,

    // Persistence
    /// Store refused a mutation; rolled back
    PersistFailed,
    /// Persisted schema is inconsistent (FATAL)
    SchemaCorruption,
    /// Durable state unknown after a store failure; writes refused (FATAL)
    RegistryHalted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaOpen => "SCHEMA_OPEN",
            Event::SchemaReloaded => "SCHEMA_RELOADED",

            Event::ClassCreated => "CLASS_CREATED",
            Event::ClassDropped => "CLASS_DROPPED",
            Event::SuperclassesChanged => "SUPERCLASSES_CHANGED",
            Event::ClassAbstractChanged => "CLASS_ABSTRACT_CHANGED",
            Event::PropertyCreated => "PROPERTY_CREATED",
            Event::PropertyDropped => "PROPERTY_DROPPED",
            Event::MutationRejected => "SCHEMA_MUTATION_REJECTED",

            Event::SnapshotCreated => "SCHEMA_SNAPSHOT_CREATED",

            Event::PersistFailed => "SCHEMA_PERSIST_FAILED",
            Event::SchemaCorruption => "SCHEMA_CORRUPTION",
            Event::RegistryHalted => "SCHEMA_REGISTRY_HALTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SchemaCorruption | Event::RegistryHalted)
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::MutationRejected
                | Event::PersistFailed
                | Event::SchemaCorruption
                | Event::RegistryHalted
        )
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

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::SchemaOpen,
            Event::SchemaReloaded,
            Event::ClassCreated,
            Event::ClassDropped,
            Event::SuperclassesChanged,
            Event::ClassAbstractChanged,
            Event::PropertyCreated,
            Event::PropertyDropped,
            Event::MutationRejected,
            Event::SnapshotCreated,
            Event::PersistFailed,
            Event::SchemaCorruption,
            Event::RegistryHalted,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::SchemaCorruption.is_fatal());
        assert!(Event::RegistryHalted.is_fatal());
        assert!(!Event::PersistFailed.is_fatal());
        assert!(!Event::ClassCreated.is_fatal());
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::MutationRejected.is_failure());
        assert!(Event::PersistFailed.is_failure());
        assert!(!Event::SnapshotCreated.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::SuperclassesChanged), "SUPERCLASSES_CHANGED");
    }
}

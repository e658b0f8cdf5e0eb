//! Snapshot Isolation Tests
//!
//! A snapshot answers from the state at the time it was taken. Live
//! mutations never reach it; a fresh snapshot sees them.

use aeroschema::schema::{ClassView, PropertyType, SchemaRegistry};

fn setup() -> SchemaRegistry {
    let registry = SchemaRegistry::in_memory();
    registry.create_abstract_class("A", &[]).unwrap();
    registry.create_abstract_class("B", &[]).unwrap();
    registry.create_class("C", &["A", "B"]).unwrap();
    registry.add_property("A", "property", PropertyType::Integer).unwrap();
    registry
}

/// Predicates on a snapshot survive live superclass changes.
#[test]
fn test_snapshot_unchanged_by_live_mutation() {
    let registry = setup();
    let snapshot = registry.snapshot();

    registry.set_super_classes("C", &["B"]).unwrap();
    registry.drop_property("A", "property").unwrap();
    registry.create_class("D", &["C"]).unwrap();

    let c = snapshot.get_class("C").unwrap();
    assert!(c.is_sub_class_of_name("A"));
    assert!(c.is_sub_class_of_name("B"));
    assert_eq!(c.super_classes_names(), vec!["A", "B"]);
    assert_eq!(c.property("property").unwrap().property_type, PropertyType::Integer);
    assert!(!snapshot.exists_class("D"));

    let live = registry.get_class("C").unwrap();
    assert!(!live.is_sub_class_of_name("A"));
    assert!(live.property("property").is_none());
}

/// A snapshot taken after a mutation reflects it.
#[test]
fn test_fresh_snapshot_sees_mutation() {
    let registry = setup();
    let before = registry.snapshot();

    registry.set_super_classes("C", &["B"]).unwrap();
    let after = registry.immutable_snapshot();

    assert!(after.version() > before.version());
    let c = after.get_class("C").unwrap();
    assert!(!c.is_sub_class_of_name("A"));
    assert!(c.is_sub_class_of_name("B"));
    assert!(before.get_class("C").unwrap().is_sub_class_of_name("A"));
}

/// Snapshot class handles navigate within the same snapshot.
#[test]
fn test_snapshot_navigation_stays_in_snapshot() {
    let registry = setup();
    let snapshot = registry.snapshot();
    registry.drop_class("C").unwrap();

    let a = snapshot.get_class("A").unwrap();
    assert_eq!(a.sub_classes_names(), vec!["C"]);

    let c = snapshot.get_class("C").unwrap();
    let supers = c.super_classes();
    assert_eq!(supers.len(), 2);
    assert!(supers[0].is_super_class_of(&c));
    assert!(supers.iter().all(|s| s.is_abstract()));
}

/// Live handles always read current state, even across threads.
#[test]
fn test_live_handle_sees_concurrent_mutation() {
    let registry = setup();
    let c = registry.get_class("C").unwrap();
    let snapshot = registry.snapshot();

    let writer = registry.clone();
    std::thread::spawn(move || {
        writer.set_super_classes("C", &[]).unwrap();
    })
    .join()
    .unwrap();

    assert!(c.super_classes_names().is_empty());
    assert_eq!(snapshot.get_class("C").unwrap().super_classes_names(), vec!["A", "B"]);
}

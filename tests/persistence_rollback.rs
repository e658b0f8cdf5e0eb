//! Persistence Rollback Tests
//!
//! A mutation whose persist fails leaves the in-memory schema exactly as
//! it was. Nothing is half applied.

use aeroschema::schema::{
    ClassView, PropertyType, RegistryOptions, RemovalPolicy, SchemaErrorCode, SchemaRegistry,
    SuperclassOp,
};
use aeroschema::store::{MemorySchemaStore, SchemaMutation, StoredClass};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (MemorySchemaStore, SchemaRegistry) {
    let store = MemorySchemaStore::with_classes(vec![
        StoredClass::new("A", true).with_property("property", PropertyType::Integer),
        StoredClass::new("B", true),
        StoredClass::new("C", false).with_superclasses(["A", "B"]),
    ]);
    let registry = SchemaRegistry::open(Box::new(store.clone()), RegistryOptions::default()).unwrap();
    (store, registry)
}

// =============================================================================
// Rollback Tests
// =============================================================================

/// A failed superclass change keeps the previous list.
#[test]
fn test_failed_persist_rolls_back_superclass_change() {
    let (store, registry) = setup();
    let version = registry.version();

    store.fail_next_persist();
    let err = registry.set_super_classes("C", &["B"]).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::AeroSchemaPersistFailed);

    let c = registry.get_class("C").unwrap();
    assert_eq!(c.super_classes_names(), vec!["A", "B"]);
    assert!(c.is_sub_class_of_name("A"));
    assert_eq!(registry.version(), version);
    assert!(store.mutations().is_empty());
    assert_eq!(registry.metrics().snapshot().persist_failures, 1);
}

/// A failed create leaves no class behind, and the retry succeeds.
#[test]
fn test_failed_persist_rolls_back_create() {
    let (store, registry) = setup();

    store.fail_next_persist();
    assert!(registry.create_class("D", &["C"]).is_err());
    assert!(!registry.exists_class("D"));
    assert!(registry.get_class("C").unwrap().sub_classes_names().is_empty());

    registry.create_class("D", &["C"]).unwrap();
    assert!(registry.get_class("D").unwrap().is_sub_class_of_name("A"));
    assert_eq!(store.mutations().len(), 1);
}

/// A failed property drop keeps the property resolvable.
#[test]
fn test_failed_persist_rolls_back_property_drop() {
    let (store, registry) = setup();

    store.fail_next_persist();
    assert!(registry.drop_property("A", "property").is_err());
    assert_eq!(
        registry.get_class("C").unwrap().property("property").unwrap().owner_class,
        "A"
    );
}

// =============================================================================
// Store Contract Tests
// =============================================================================

/// Every committed mutation reaches the store, in order.
#[test]
fn test_mutations_are_persisted_in_order() {
    let (store, registry) = setup();

    registry.create_class("D", &[]).unwrap();
    registry
        .alter_superclasses("D", SuperclassOp::Add("C".into()))
        .unwrap();
    registry.set_abstract("D", true).unwrap();

    let mutations = store.mutations();
    assert_eq!(mutations.len(), 3);
    assert_eq!(
        mutations[1],
        SchemaMutation::SetSuperclasses {
            name: "D".into(),
            superclasses: vec!["C".into()],
        }
    );
}

/// Classes with records cannot be dropped or made abstract.
#[test]
fn test_record_count_guards() {
    let (store, registry) = setup();
    store.set_record_count("C", 3);

    let err = registry.drop_class("C").unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::AeroSchemaClassInUse);
    assert!(registry.set_abstract("C", true).is_err());
    assert!(registry.exists_class("C"));
    assert!(store.mutations().is_empty());
}

/// Under the reject policy, removing an absent superclass is an error.
#[test]
fn test_reject_policy_for_absent_superclass() {
    let store = MemorySchemaStore::with_classes(vec![
        StoredClass::new("A", false),
        StoredClass::new("B", false),
    ]);
    let options = RegistryOptions {
        missing_superclass_removal: RemovalPolicy::Reject,
    };
    let registry = SchemaRegistry::open(Box::new(store), options).unwrap();

    assert!(registry
        .alter_superclasses("B", SuperclassOp::Remove("A".into()))
        .is_err());
}

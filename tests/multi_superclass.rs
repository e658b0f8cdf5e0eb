//! Multiple Inheritance Tests
//!
//! Hierarchy behavior observed through the public API:
//! - A class may extend several superclasses, in declared order
//! - Subclass and superclass predicates follow every path
//! - Property lookup prefers the first-listed superclass
//! - A cyclic superclass assignment is rejected atomically

use aeroschema::ddl::{DdlStatement, DdlTranslator};
use aeroschema::schema::{
    ClassView, PropertyType, SchemaErrorCode, SchemaRegistry, SuperclassOp,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// A, B abstract roots and C extending [A, B]
fn setup_diamond_top() -> SchemaRegistry {
    let registry = SchemaRegistry::in_memory();
    registry.create_abstract_class("A", &[]).unwrap();
    registry.create_abstract_class("B", &[]).unwrap();
    registry.create_class("C", &["A", "B"]).unwrap();
    registry
}

/// Chain A <- B <- C
fn setup_chain() -> SchemaRegistry {
    let registry = SchemaRegistry::in_memory();
    registry.create_class("A", &[]).unwrap();
    registry.create_class("B", &["A"]).unwrap();
    registry.create_class("C", &["B"]).unwrap();
    registry
}

fn alter(class: &str, attribute: &str, value: &str) -> DdlStatement {
    DdlStatement::AlterClass {
        class: class.into(),
        attribute: attribute.into(),
        value: value.into(),
    }
}

// =============================================================================
// Creation Tests
// =============================================================================

/// C extending [A, B] is a subclass of both; A and B stay roots.
#[test]
fn test_class_with_two_superclasses() {
    let registry = setup_diamond_top();
    let a = registry.get_class("A").unwrap();
    let b = registry.get_class("B").unwrap();
    let c = registry.get_class("C").unwrap();

    assert!(c.is_sub_class_of(&a));
    assert!(c.is_sub_class_of(&b));
    assert!(a.is_super_class_of(&c));
    assert!(b.is_super_class_of(&c));

    assert!(a.super_classes().is_empty());
    assert!(b.super_classes().is_empty());
    assert_eq!(c.super_classes_names(), vec!["A", "B"]);
    assert_eq!(a.sub_classes_names(), vec!["C"]);
}

/// Creating through DDL matches creating through the API.
#[test]
fn test_create_through_ddl() {
    let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
    for line in [
        r#"{"kind":"create_class","name":"A","abstract":true}"#,
        r#"{"kind":"create_class","name":"B","abstract":true}"#,
        r#"{"kind":"create_class","name":"C","extends":["A","B"]}"#,
    ] {
        let statement: DdlStatement = serde_json::from_str(line).unwrap();
        ddl.execute(statement).unwrap();
    }

    let c = ddl.registry().get_class("c").unwrap();
    assert_eq!(c.name(), "C");
    assert!(c.is_sub_class_of_name("A"));
    assert!(c.is_sub_class_of_name("B"));
    assert!(ddl.registry().get_class("A").unwrap().is_abstract());
}

/// Duplicate superclass names collapse onto the first occurrence.
#[test]
fn test_duplicate_superclasses_are_collapsed() {
    let registry = SchemaRegistry::in_memory();
    registry.create_class("A", &[]).unwrap();
    registry.create_class("B", &[]).unwrap();
    let c = registry.create_class("C", &["B", "A", "b"]).unwrap();

    assert_eq!(c.super_classes_names(), vec!["B", "A"]);
}

// =============================================================================
// Property Resolution Tests
// =============================================================================

/// The first-listed superclass wins a property name conflict.
#[test]
fn test_property_tie_break_prefers_first_superclass() {
    let registry = setup_diamond_top();
    let a = registry.get_class("A").unwrap();
    let b = registry.get_class("B").unwrap();
    let c = registry.get_class("C").unwrap();

    a.create_property("property", PropertyType::Integer).unwrap();
    b.create_property("property", PropertyType::Double).unwrap();

    let resolved = c.property("property").unwrap();
    assert_eq!(resolved.property_type, PropertyType::Integer);
    assert_eq!(resolved.owner_class, "A");

    c.set_super_classes(&["B", "A"]).unwrap();
    assert_eq!(c.property("property").unwrap().property_type, PropertyType::Double);
}

/// Own properties shadow inherited ones.
#[test]
fn test_own_property_shadows_ancestors() {
    let registry = setup_chain();
    registry.add_property("A", "name", PropertyType::String).unwrap();
    registry.add_property("C", "name", PropertyType::Link).unwrap();

    let c = registry.get_class("C").unwrap();
    assert_eq!(c.property("name").unwrap().owner_class, "C");
    assert_eq!(
        registry.get_class("B").unwrap().property("name").unwrap().owner_class,
        "A"
    );
    assert!(c.declared_properties().iter().any(|p| p.name == "name"));
}

// =============================================================================
// ALTER CLASS Grammar Tests
// =============================================================================

/// SUPERCLASSES A,B then SUPERCLASS A, +B, -A.
#[test]
fn test_alter_class_grammar_sequence() {
    let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
    ddl.registry().create_abstract_class("A", &[]).unwrap();
    ddl.registry().create_abstract_class("B", &[]).unwrap();
    let c = ddl.registry().create_class("C", &[]).unwrap();

    ddl.execute(alter("C", "SUPERCLASSES", "A,B")).unwrap();
    assert!(c.is_sub_class_of_name("A"));
    assert!(c.is_sub_class_of_name("B"));

    ddl.execute(alter("C", "SUPERCLASS", "A")).unwrap();
    assert!(c.is_sub_class_of_name("A"));
    assert!(!c.is_sub_class_of_name("B"));

    ddl.execute(alter("C", "SUPERCLASS", "+B")).unwrap();
    assert!(c.is_sub_class_of_name("A"));
    assert!(c.is_sub_class_of_name("B"));

    ddl.execute(alter("C", "SUPERCLASS", "-A")).unwrap();
    assert!(!c.is_sub_class_of_name("A"));
    assert!(c.is_sub_class_of_name("B"));
}

/// Removing a superclass that is not listed changes nothing.
#[test]
fn test_remove_absent_superclass_is_noop() {
    let registry = setup_diamond_top();
    registry.create_class("D", &[]).unwrap();
    let version = registry.version();

    registry
        .alter_superclasses("C", SuperclassOp::Remove("D".into()))
        .unwrap();

    assert_eq!(registry.version(), version);
    assert_eq!(
        registry.get_class("C").unwrap().super_classes_names(),
        vec!["A", "B"]
    );
}

// =============================================================================
// Cycle Prevention Tests
// =============================================================================

/// Setting A's superclasses to [C] over A <- B <- C fails and changes nothing.
#[test]
fn test_cycle_is_rejected_atomically() {
    let registry = setup_chain();
    let version = registry.version();

    let err = registry.set_super_classes("A", &["C"]).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::AeroSchemaRecursion);
    assert!(err.message().contains("recursion"));

    let a = registry.get_class("A").unwrap();
    let b = registry.get_class("B").unwrap();
    let c = registry.get_class("C").unwrap();
    assert!(a.super_classes_names().is_empty());
    assert_eq!(b.super_classes_names(), vec!["A"]);
    assert_eq!(c.super_classes_names(), vec!["B"]);
    assert_eq!(a.all_sub_classes_names(), vec!["B", "C"]);
    assert_eq!(registry.version(), version);
    assert_eq!(registry.metrics().snapshot().cycles_rejected, 1);
}

/// A class cannot become its own superclass.
#[test]
fn test_self_superclass_is_rejected() {
    let registry = setup_chain();
    let err = registry
        .alter_superclasses("B", SuperclassOp::Add("b".into()))
        .unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::AeroSchemaRecursion);
    assert_eq!(
        registry.get_class("B").unwrap().super_classes_names(),
        vec!["A"]
    );
}

// =============================================================================
// Drop Tests
// =============================================================================

/// A class with subclasses cannot be dropped; a leaf can.
#[test]
fn test_drop_requires_no_subclasses() {
    let registry = setup_diamond_top();

    let err = registry.drop_class("A").unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::AeroSchemaClassInUse);

    registry.drop_class("C").unwrap();
    assert!(!registry.exists_class("C"));
    assert!(registry.get_class("A").unwrap().sub_classes_names().is_empty());

    registry.drop_class("A").unwrap();
    assert!(!registry.exists_class("A"));
}

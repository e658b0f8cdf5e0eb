//! Applies DDL statements to a registry

use serde::Serialize;

use super::errors::{DdlError, DdlResult};
use super::statement::DdlStatement;
use crate::schema::{ClassView, PropertyDef, SchemaRegistry};

/// What a statement did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DdlAction {
    ClassCreated,
    ClassDropped,
    ClassAltered,
    PropertyCreated,
    PropertyDropped,
}

/// Result of one applied statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdlOutcome {
    pub action: DdlAction,
    /// Affected class, as spelled at creation
    pub class: String,
    /// Its superclasses after the statement, in declared order
    pub superclasses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyDef>,
}

/// Maps statements onto registry calls
#[derive(Debug, Clone)]
pub struct DdlTranslator {
    registry: SchemaRegistry,
}

impl DdlTranslator {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    /// The registry statements are applied to
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn outcome(&self, action: DdlAction, class: &str, property: Option<PropertyDef>) -> DdlOutcome {
        let (class, superclasses) = match self.registry.get_class(class) {
            Some(live) => (live.name().to_string(), live.super_classes_names()),
            None => (class.to_string(), Vec::new()),
        };
        DdlOutcome {
            action,
            class,
            superclasses,
            property,
        }
    }

    /// Applies one statement.
    pub fn execute(&self, statement: DdlStatement) -> DdlResult<DdlOutcome> {
        match statement.normalize()? {
            DdlStatement::CreateClass {
                name,
                superclasses,
                is_abstract,
            } => {
                let refs: Vec<&str> = superclasses.iter().map(String::as_str).collect();
                let class = if is_abstract {
                    self.registry.create_abstract_class(&name, &refs)?
                } else {
                    self.registry.create_class(&name, &refs)?
                };
                Ok(self.outcome(DdlAction::ClassCreated, class.name(), None))
            }
            DdlStatement::DropClass { name } => {
                let canonical = self
                    .registry
                    .get_class(&name)
                    .map(|c| c.name().to_string())
                    .unwrap_or(name);
                self.registry.drop_class(&canonical)?;
                Ok(self.outcome(DdlAction::ClassDropped, &canonical, None))
            }
            DdlStatement::AlterSuperclasses { class, op } => {
                self.registry.alter_superclasses(&class, op)?;
                Ok(self.outcome(DdlAction::ClassAltered, &class, None))
            }
            DdlStatement::AlterAbstract { class, is_abstract } => {
                self.registry.set_abstract(&class, is_abstract)?;
                Ok(self.outcome(DdlAction::ClassAltered, &class, None))
            }
            DdlStatement::CreateProperty {
                class,
                name,
                property_type,
            } => {
                let def = self.registry.add_property(&class, &name, property_type)?;
                Ok(self.outcome(DdlAction::PropertyCreated, &class, Some(def)))
            }
            DdlStatement::DropProperty { class, name } => {
                let def = self.registry.drop_property(&class, &name)?;
                Ok(self.outcome(DdlAction::PropertyDropped, &class, Some(def)))
            }
            DdlStatement::AlterClass { .. } => Err(DdlError::InvalidStatement(
                "ALTER CLASS statement could not be normalized".into(),
            )),
        }
    }

    /// Applies statements in order, stopping at the first failure.
    ///
    /// Statements before the failing one stay applied.
    pub fn execute_all(
        &self,
        statements: impl IntoIterator<Item = DdlStatement>,
    ) -> DdlResult<Vec<DdlOutcome>> {
        statements.into_iter().map(|s| self.execute(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyType;

    fn alter(class: &str, attribute: &str, value: &str) -> DdlStatement {
        DdlStatement::AlterClass {
            class: class.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    fn create(name: &str, extends: &[&str], is_abstract: bool) -> DdlStatement {
        DdlStatement::CreateClass {
            name: name.into(),
            superclasses: extends.iter().map(|s| s.to_string()).collect(),
            is_abstract,
        }
    }

    #[test]
    fn test_alter_superclass_grammar_sequence() {
        let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
        ddl.execute_all(vec![
            create("A", &[], true),
            create("B", &[], true),
            create("C", &[], false),
        ])
        .unwrap();
        let c = ddl.registry().get_class("C").unwrap();

        ddl.execute(alter("C", "SUPERCLASSES", "A,B")).unwrap();
        assert!(c.is_sub_class_of_name("A"));
        assert!(c.is_sub_class_of_name("B"));

        ddl.execute(alter("C", "SUPERCLASS", "A")).unwrap();
        assert!(c.is_sub_class_of_name("A"));
        assert!(!c.is_sub_class_of_name("B"));

        let outcome = ddl.execute(alter("C", "SUPERCLASS", "+B")).unwrap();
        assert_eq!(outcome.superclasses, vec!["A", "B"]);

        ddl.execute(alter("C", "SUPERCLASS", "-A")).unwrap();
        assert!(!c.is_sub_class_of_name("A"));
        assert!(c.is_sub_class_of_name("B"));
    }

    #[test]
    fn test_create_with_extends_and_properties() {
        let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
        ddl.execute(create("A", &[], true)).unwrap();
        ddl.execute(create("B", &[], true)).unwrap();
        ddl.execute(DdlStatement::CreateProperty {
            class: "A".into(),
            name: "property".into(),
            property_type: PropertyType::Integer,
        })
        .unwrap();

        let outcome = ddl.execute(create("c", &["A", "B"], false)).unwrap();
        assert_eq!(outcome.action, DdlAction::ClassCreated);
        assert_eq!(outcome.superclasses, vec!["A", "B"]);

        let c = ddl.registry().get_class("C").unwrap();
        assert_eq!(c.property("property").unwrap().property_type, PropertyType::Integer);
    }

    #[test]
    fn test_errors_pass_through() {
        let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
        ddl.execute(create("A", &[], false)).unwrap();
        ddl.execute(create("B", &["A"], false)).unwrap();

        let err = ddl.execute(alter("A", "superclass", "B")).unwrap_err();
        assert_eq!(err.code(), "AERO_SCHEMA_RECURSION");

        let err = ddl.execute(alter("A", "superclass", "+")).unwrap_err();
        assert_eq!(err.code(), "AERO_DDL_INVALID_STATEMENT");

        let err = ddl.execute(DdlStatement::DropClass { name: "a".into() }).unwrap_err();
        assert_eq!(err.code(), "AERO_SCHEMA_CLASS_IN_USE");
    }

    #[test]
    fn test_drop_and_abstract() {
        let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
        ddl.execute(create("Thing", &[], false)).unwrap();

        ddl.execute(alter("thing", "abstract", "true")).unwrap();
        assert!(ddl.registry().get_class("Thing").unwrap().is_abstract());

        let outcome = ddl.execute(DdlStatement::DropClass { name: "THING".into() }).unwrap();
        assert_eq!(outcome.class, "Thing");
        assert_eq!(outcome.action, DdlAction::ClassDropped);
        assert!(!ddl.registry().exists_class("Thing"));
    }

    #[test]
    fn test_execute_all_stops_at_first_failure() {
        let ddl = DdlTranslator::new(SchemaRegistry::in_memory());
        let result = ddl.execute_all(vec![
            create("A", &[], false),
            create("A", &[], false),
            create("B", &[], false),
        ]);
        assert!(result.is_err());
        assert!(ddl.registry().exists_class("A"));
        assert!(!ddl.registry().exists_class("B"));
    }
}

//! Materialized schema state rebuilt from mutations
//!
//! Both stores fold mutations into a [`StoredSchema`]. Folding only checks
//! that a mutation refers to classes and properties that exist; hierarchy
//! invariants are checked by the registry when it links the loaded classes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::SchemaMutation;
use crate::schema::PropertyType;

/// A persisted property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProperty {
    pub name: String,
    pub property_type: PropertyType,
}

/// A persisted class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredClass {
    pub name: String,
    pub is_abstract: bool,
    /// Superclass names, in declared order
    pub superclasses: Vec<String>,
    pub properties: Vec<StoredProperty>,
}

impl StoredClass {
    /// A class with no superclasses and no properties
    pub fn new(name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            name: name.into(),
            is_abstract,
            superclasses: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Builder-style superclass list
    pub fn with_superclasses<S: Into<String>>(mut self, superclasses: impl IntoIterator<Item = S>) -> Self {
        self.superclasses = superclasses.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style property
    pub fn with_property(mut self, name: impl Into<String>, property_type: PropertyType) -> Self {
        self.properties.push(StoredProperty {
            name: name.into(),
            property_type,
        });
        self
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Classes keyed by lower-cased name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSchema {
    classes: BTreeMap<String, StoredClass>,
}

impl StoredSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a schema from class definitions, bypassing mutation checks
    pub fn from_classes(classes: impl IntoIterator<Item = StoredClass>) -> Self {
        Self {
            classes: classes
                .into_iter()
                .map(|c| (c.name.to_lowercase(), c))
                .collect(),
        }
    }

    /// Classes ordered by lower-cased name
    pub fn classes(&self) -> Vec<StoredClass> {
        self.classes.values().cloned().collect()
    }

    /// Looks up a class, ignoring case
    pub fn class(&self, name: &str) -> Option<&StoredClass> {
        self.classes.get(&name.to_lowercase())
    }

    fn class_mut(&mut self, name: &str) -> Result<&mut StoredClass, String> {
        self.classes
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| format!("class '{}' does not exist", name))
    }

    /// Folds one mutation into the state.
    pub fn apply(&mut self, mutation: &SchemaMutation) -> Result<(), String> {
        match mutation {
            SchemaMutation::CreateClass {
                name,
                is_abstract,
                superclasses,
            } => {
                let key = name.to_lowercase();
                if self.classes.contains_key(&key) {
                    return Err(format!("class '{}' created twice", name));
                }
                self.classes.insert(
                    key,
                    StoredClass::new(name.clone(), *is_abstract)
                        .with_superclasses(superclasses.iter().cloned()),
                );
            }
            SchemaMutation::DropClass { name } => {
                if self.classes.remove(&name.to_lowercase()).is_none() {
                    return Err(format!("class '{}' dropped but does not exist", name));
                }
            }
            SchemaMutation::SetSuperclasses { name, superclasses } => {
                self.class_mut(name)?.superclasses = superclasses.clone();
            }
            SchemaMutation::SetAbstract { name, is_abstract } => {
                self.class_mut(name)?.is_abstract = *is_abstract;
            }
            SchemaMutation::AddProperty {
                class_name,
                name,
                property_type,
            } => {
                let class = self.class_mut(class_name)?;
                if class.properties.iter().any(|p| same_name(&p.name, name)) {
                    return Err(format!(
                        "property '{}' added twice to class '{}'",
                        name, class_name
                    ));
                }
                class.properties.push(StoredProperty {
                    name: name.clone(),
                    property_type: *property_type,
                });
            }
            SchemaMutation::DropProperty { class_name, name } => {
                let class = self.class_mut(class_name)?;
                let before = class.properties.len();
                class.properties.retain(|p| !same_name(&p.name, name));
                if class.properties.len() == before {
                    return Err(format!(
                        "property '{}' dropped from class '{}' but does not exist",
                        name, class_name
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sequence() {
        let mut state = StoredSchema::new();
        state
            .apply(&SchemaMutation::CreateClass {
                name: "A".into(),
                is_abstract: true,
                superclasses: Vec::new(),
            })
            .unwrap();
        state
            .apply(&SchemaMutation::CreateClass {
                name: "C".into(),
                is_abstract: false,
                superclasses: vec!["A".into()],
            })
            .unwrap();
        state
            .apply(&SchemaMutation::AddProperty {
                class_name: "a".into(),
                name: "p".into(),
                property_type: PropertyType::Integer,
            })
            .unwrap();
        state
            .apply(&SchemaMutation::SetSuperclasses {
                name: "C".into(),
                superclasses: Vec::new(),
            })
            .unwrap();

        let a = state.class("A").unwrap();
        assert_eq!(a.properties.len(), 1);
        assert!(state.class("c").unwrap().superclasses.is_empty());
    }

    #[test]
    fn test_apply_rejects_inconsistent_mutations() {
        let mut state = StoredSchema::new();
        assert!(state
            .apply(&SchemaMutation::DropClass { name: "Ghost".into() })
            .is_err());
        assert!(state
            .apply(&SchemaMutation::SetAbstract {
                name: "Ghost".into(),
                is_abstract: true
            })
            .is_err());
    }

    #[test]
    fn test_classes_ordered_by_name() {
        let state = StoredSchema::from_classes(vec![
            StoredClass::new("b", false),
            StoredClass::new("A", false),
        ]);
        let names: Vec<String> = state.classes().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "b"]);
    }
}

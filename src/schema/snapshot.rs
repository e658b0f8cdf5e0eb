//! Immutable point-in-time schema snapshots
//!
//! A snapshot owns a frozen graph behind an `Arc`. The registry never edits
//! a graph in place (every commit swaps in a new one), so a snapshot keeps
//! answering exactly as it did when it was taken, without locks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::hierarchy::HierarchyGraph;
use super::types::{ClassId, PropertyDef};
use super::view::ClassView;

/// Frozen copy of the class graph
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    graph: Arc<HierarchyGraph>,
    version: u64,
}

impl SchemaSnapshot {
    pub(crate) fn new(graph: Arc<HierarchyGraph>, version: u64) -> Self {
        Self { graph, version }
    }

    /// Registry version this snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The frozen graph
    pub fn graph(&self) -> &HierarchyGraph {
        &self.graph
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Looks up a class, ignoring case
    pub fn get_class(&self, name: &str) -> Option<SnapshotClass<'_>> {
        self.graph
            .class_id(name)
            .map(|id| SnapshotClass { snapshot: self, id })
    }

    pub fn exists_class(&self, name: &str) -> bool {
        self.graph.class_id(name).is_some()
    }

    /// Every class, ordered by name
    pub fn classes(&self) -> Vec<SnapshotClass<'_>> {
        self.graph
            .class_names()
            .iter()
            .filter_map(|name| self.get_class(name))
            .collect()
    }

    /// Describes every class, ordered by name
    pub fn describe(&self) -> Vec<ClassDescription> {
        self.classes()
            .iter()
            .map(|c| ClassDescription::of(c, false))
            .collect()
    }

    /// Describes one class, including its resolved properties
    pub fn describe_class(&self, name: &str) -> Option<ClassDescription> {
        self.get_class(name).map(|c| ClassDescription::of(&c, true))
    }
}

/// A class inside a snapshot
#[derive(Debug, Clone, Copy)]
pub struct SnapshotClass<'a> {
    snapshot: &'a SchemaSnapshot,
    id: ClassId,
}

impl<'a> SnapshotClass<'a> {
    /// Arena id inside the snapshot's graph
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// The snapshot this class belongs to
    pub fn snapshot(&self) -> &'a SchemaSnapshot {
        self.snapshot
    }
}

impl ClassView for SnapshotClass<'_> {
    fn read<R>(&self, f: impl FnOnce(&HierarchyGraph, Option<ClassId>) -> R) -> R {
        let graph = self.snapshot.graph();
        f(graph, graph.node(self.id).map(|n| n.id()))
    }

    fn sibling(&self, _graph: &HierarchyGraph, id: ClassId) -> Self {
        SnapshotClass {
            snapshot: self.snapshot,
            id,
        }
    }

    fn name(&self) -> &str {
        self.snapshot.graph.name_of(self.id)
    }
}

/// Serializable description of one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescription {
    pub name: String,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Direct superclasses, in declared order
    pub superclasses: Vec<String>,
    /// Direct subclasses, ordered by name
    pub subclasses: Vec<String>,
    /// Properties declared on the class itself
    pub properties: Vec<PropertyDef>,
    /// Own and inherited properties, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_properties: Option<Vec<PropertyDef>>,
}

impl ClassDescription {
    fn of(class: &SnapshotClass<'_>, resolved: bool) -> Self {
        Self {
            name: class.name().to_string(),
            is_abstract: class.is_abstract(),
            superclasses: class.super_classes_names(),
            subclasses: class.sub_classes_names(),
            properties: class.declared_properties(),
            resolved_properties: resolved
                .then(|| class.properties_map().into_values().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyType;

    fn diamond() -> SchemaSnapshot {
        let mut graph = HierarchyGraph::new();
        let a = graph.insert_class("A", true).unwrap();
        let b = graph.insert_class("B", true).unwrap();
        let c = graph.insert_class("C", false).unwrap();
        graph.add_property(a, "property", PropertyType::Integer).unwrap();
        graph.add_property(b, "property", PropertyType::Double).unwrap();
        graph.add_property(b, "other", PropertyType::String).unwrap();
        graph.link_superclasses(c, &[a, b]).unwrap();
        SchemaSnapshot::new(Arc::new(graph), 7)
    }

    #[test]
    fn test_snapshot_queries() {
        let snapshot = diamond();
        assert_eq!(snapshot.version(), 7);

        let c = snapshot.get_class("c").unwrap();
        let a = snapshot.get_class("A").unwrap();
        assert_eq!(c.super_classes_names(), vec!["A", "B"]);
        assert!(c.is_sub_class_of(&a));
        assert!(a.is_super_class_of(&c));
        assert!(!a.is_sub_class_of(&c));
        assert!(c.is_sub_class_of(&c));
        assert_eq!(c.property("property").unwrap().property_type, PropertyType::Integer);
        assert!(c.declared_properties().is_empty());
        assert_eq!(c.properties_map().len(), 2);
    }

    #[test]
    fn test_super_class_handles_stay_in_snapshot() {
        let snapshot = diamond();
        let c = snapshot.get_class("C").unwrap();
        let supers = c.super_classes();
        assert_eq!(supers.len(), 2);
        assert!(supers.iter().all(|s| s.is_abstract()));
        assert_eq!(supers[1].sub_classes_names(), vec!["C"]);
    }

    #[test]
    fn test_describe() {
        let snapshot = diamond();
        let all = snapshot.describe();
        let names: Vec<&str> = all.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(all[0].resolved_properties.is_none());

        let c = snapshot.describe_class("C").unwrap();
        let resolved = c.resolved_properties.unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved
            .iter()
            .any(|p| p.name == "property" && p.owner_class == "A"));

        let json = serde_json::to_value(&all[0]).unwrap();
        assert_eq!(json["abstract"], true);
        assert!(json.get("resolved_properties").is_none());
    }
}

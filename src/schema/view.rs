//! Read-only class surface shared by live and snapshot classes

use std::collections::BTreeMap;

use super::hierarchy::HierarchyGraph;
use super::types::{name_key, ClassId, PropertyDef};

/// Queries available on any class handle.
///
/// Implementors only say which graph they read and how to make a handle for
/// another class of the same graph. A handle whose class no longer exists
/// answers as an empty class: no superclasses, no properties, every
/// predicate false.
pub trait ClassView: Sized {
    /// Runs `f` against the backing graph and the id of this class, if the
    /// class exists there.
    fn read<R>(&self, f: impl FnOnce(&HierarchyGraph, Option<ClassId>) -> R) -> R;

    /// A handle for class `id` backed by the same source
    fn sibling(&self, graph: &HierarchyGraph, id: ClassId) -> Self;

    /// Class name as spelled at creation
    fn name(&self) -> &str;

    /// Returns true if the class exists in the backing graph
    fn exists(&self) -> bool {
        self.read(|_, id| id.is_some())
    }

    fn is_abstract(&self) -> bool {
        self.read(|g, id| id.and_then(|id| g.node(id)).map_or(false, |n| n.is_abstract()))
    }

    /// Direct superclasses, in declared order
    fn super_classes(&self) -> Vec<Self> {
        self.read(|g, id| {
            id.and_then(|id| g.node(id))
                .map(|n| n.superclasses().iter().map(|s| self.sibling(g, *s)).collect())
                .unwrap_or_default()
        })
    }

    /// Direct superclass names, in declared order
    fn super_classes_names(&self) -> Vec<String> {
        self.read(|g, id| {
            id.and_then(|id| g.node(id))
                .map(|n| g.names_of(n.superclasses().iter().copied()))
                .unwrap_or_default()
        })
    }

    /// Direct subclass names, ordered case-insensitively
    fn sub_classes_names(&self) -> Vec<String> {
        let mut names = self.read(|g, id| {
            id.and_then(|id| g.node(id))
                .map(|n| g.names_of(n.subclasses().iter().copied()))
                .unwrap_or_default()
        });
        names.sort_by_key(|n| name_key(n));
        names
    }

    /// Every transitive ancestor, breadth-first
    fn all_super_classes_names(&self) -> Vec<String> {
        self.read(|g, id| id.map(|id| g.names_of(g.all_superclasses(id))).unwrap_or_default())
    }

    /// Every transitive descendant, breadth-first
    fn all_sub_classes_names(&self) -> Vec<String> {
        self.read(|g, id| id.map(|id| g.names_of(g.all_subclasses(id))).unwrap_or_default())
    }

    /// True if this class is `other` or one of its descendants
    fn is_sub_class_of_name(&self, other: &str) -> bool {
        self.read(|g, id| match (id, g.class_id(other)) {
            (Some(id), Some(other)) => id == other || g.is_ancestor_of(other, id),
            _ => false,
        })
    }

    /// True if this class is `other` or one of its descendants
    fn is_sub_class_of(&self, other: &Self) -> bool {
        self.is_sub_class_of_name(other.name())
    }

    /// True if this class is `other` or one of its ancestors
    fn is_super_class_of_name(&self, other: &str) -> bool {
        self.read(|g, id| match (id, g.class_id(other)) {
            (Some(id), Some(other)) => id == other || g.is_ancestor_of(id, other),
            _ => false,
        })
    }

    /// True if this class is `other` or one of its ancestors
    fn is_super_class_of(&self, other: &Self) -> bool {
        self.is_super_class_of_name(other.name())
    }

    /// Resolved definition of `name`: own first, then superclasses in order
    fn property(&self, name: &str) -> Option<PropertyDef> {
        self.read(|g, id| id.and_then(|id| g.resolve_property(id, name)).cloned())
    }

    /// Properties declared on this class only, ordered by name
    fn declared_properties(&self) -> Vec<PropertyDef> {
        self.read(|g, id| {
            id.and_then(|id| g.node(id))
                .map(|n| n.properties().iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Resolved properties, own and inherited, keyed by declared name
    fn properties_map(&self) -> BTreeMap<String, PropertyDef> {
        self.read(|g, id| id.map(|id| g.resolved_properties(id)).unwrap_or_default())
    }
}

//! Class hierarchy graph
//!
//! An arena of [`ClassNode`]s addressed by [`ClassId`], plus a case-insensitive
//! name index. All structural edits go through this type so that:
//!
//! - the superclass relation stays acyclic
//! - `B ∈ A.subclasses ⇔ A ∈ B.superclasses` always holds
//! - a rejected edit leaves the graph untouched
//!
//! Closure walks are O(V+E); structural edits are administrative and rare.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::class::ClassNode;
use super::errors::{SchemaError, SchemaResult};
use super::types::{name_key, validate_name, ClassId, PropertyDef, PropertyType};

/// Arena of classes with their inheritance edges
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    /// Arena slots; dropped classes leave `None`
    nodes: Vec<Option<ClassNode>>,
    /// Lower-cased name to id
    index: HashMap<String, ClassId>,
}

impl HierarchyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live classes
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no class is registered
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks up a class id by name, ignoring case
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.index.get(&name_key(name)).copied()
    }

    /// Returns the node for `id`, if it is live
    pub fn node(&self, id: ClassId) -> Option<&ClassNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ClassId) -> Option<&mut ClassNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Looks up a node by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&ClassNode> {
        self.class_id(name).and_then(|id| self.node(id))
    }

    /// Resolves a name or fails with an unknown-class error
    pub fn require(&self, name: &str) -> SchemaResult<ClassId> {
        self.class_id(name)
            .ok_or_else(|| SchemaError::unknown_class(name))
    }

    /// Resolves every name, failing on the first unknown one
    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> SchemaResult<Vec<ClassId>> {
        names.iter().map(|n| self.require(n.as_ref())).collect()
    }

    /// Iterates live nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = &ClassNode> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Class names ordered case-insensitively
    pub fn class_names(&self) -> Vec<String> {
        let mut keyed: Vec<(&String, ClassId)> =
            self.index.iter().map(|(k, id)| (k, *id)).collect();
        keyed.sort();
        keyed
            .into_iter()
            .filter_map(|(_, id)| self.node(id).map(|n| n.name.clone()))
            .collect()
    }

    /// Name of a class, or an empty string if the id is not live
    pub fn name_of(&self, id: ClassId) -> &str {
        self.node(id).map(|n| n.name.as_str()).unwrap_or("")
    }

    /// Names of the given ids, in the same order
    pub fn names_of(&self, ids: impl IntoIterator<Item = ClassId>) -> Vec<String> {
        ids.into_iter()
            .filter_map(|id| self.node(id).map(|n| n.name.clone()))
            .collect()
    }

    /// Registers a new class without superclasses.
    pub fn insert_class(&mut self, name: &str, is_abstract: bool) -> SchemaResult<ClassId> {
        validate_name(name).map_err(|reason| SchemaError::invalid_name(name, reason))?;

        let key = name_key(name);
        if let Some(existing) = self.index.get(&key) {
            return Err(SchemaError::duplicate_class(self.name_of(*existing)));
        }

        let id = ClassId(self.nodes.len() as u32);
        self.nodes.push(Some(ClassNode::new(id, name, is_abstract)));
        self.index.insert(key, id);
        Ok(id)
    }

    /// Removes a class that no other class extends.
    ///
    /// The removed class is detached from its own superclasses' subclass sets.
    pub fn remove_class(&mut self, id: ClassId) -> SchemaResult<ClassNode> {
        let node = self
            .node(id)
            .ok_or_else(|| SchemaError::unknown_class(id.to_string()))?;

        if !node.subclasses.is_empty() {
            let subclasses = self.names_of(node.subclasses.iter().copied());
            return Err(SchemaError::class_in_use(
                node.name.clone(),
                format!("extended by {}", subclasses.join(", ")),
            ));
        }

        let node = match self.nodes.get_mut(id.index()).and_then(Option::take) {
            Some(node) => node,
            None => return Err(SchemaError::unknown_class(id.to_string())),
        };

        for sup in &node.superclasses {
            if let Some(parent) = self.node_mut(*sup) {
                parent.subclasses.remove(&id);
            }
        }
        self.index.remove(&name_key(&node.name));

        Ok(node)
    }

    /// Replaces the superclass list of `id` with `candidates`.
    ///
    /// Duplicates keep their first position. Fails without touching the graph
    /// if a candidate is unknown or if `id` is (or would become) its own
    /// ancestor.
    pub fn link_superclasses(&mut self, id: ClassId, candidates: &[ClassId]) -> SchemaResult<()> {
        let class_name = self
            .node(id)
            .map(|n| n.name.clone())
            .ok_or_else(|| SchemaError::unknown_class(id.to_string()))?;

        let mut ordered: Vec<ClassId> = Vec::with_capacity(candidates.len());
        for &candidate in candidates {
            let superclass = self
                .node(candidate)
                .ok_or_else(|| SchemaError::unknown_class(candidate.to_string()))?;

            if ordered.contains(&candidate) {
                continue;
            }

            if candidate == id || self.is_ancestor_of(id, candidate) {
                return Err(SchemaError::recursion(class_name, superclass.name.clone()));
            }

            ordered.push(candidate);
        }

        let previous = match self.node_mut(id) {
            Some(node) => std::mem::replace(&mut node.superclasses, ordered.clone()),
            None => return Err(SchemaError::unknown_class(class_name)),
        };

        for old in previous {
            if !ordered.contains(&old) {
                if let Some(parent) = self.node_mut(old) {
                    parent.subclasses.remove(&id);
                }
            }
        }
        for new in &ordered {
            if let Some(parent) = self.node_mut(*new) {
                parent.subclasses.insert(id);
            }
        }

        Ok(())
    }

    /// Appends `superclass` to the superclass list of `id`.
    ///
    /// Returns false if it was already listed.
    pub fn add_superclass(&mut self, id: ClassId, superclass: ClassId) -> SchemaResult<bool> {
        let mut current = self.superclasses_of(id)?;
        if current.contains(&superclass) {
            return Ok(false);
        }
        current.push(superclass);
        self.link_superclasses(id, &current)?;
        Ok(true)
    }

    /// Removes `superclass` from the superclass list of `id`.
    ///
    /// Returns false if it was not listed.
    pub fn remove_superclass(&mut self, id: ClassId, superclass: ClassId) -> SchemaResult<bool> {
        let current = self.superclasses_of(id)?;
        if !current.contains(&superclass) {
            return Ok(false);
        }
        let remaining: Vec<ClassId> = current.into_iter().filter(|c| *c != superclass).collect();
        self.link_superclasses(id, &remaining)?;
        Ok(true)
    }

    fn superclasses_of(&self, id: ClassId) -> SchemaResult<Vec<ClassId>> {
        self.node(id)
            .map(|n| n.superclasses.clone())
            .ok_or_else(|| SchemaError::unknown_class(id.to_string()))
    }

    /// Returns true if `candidate` is a strict transitive ancestor of `node`
    pub fn is_ancestor_of(&self, candidate: ClassId, node: ClassId) -> bool {
        self.walk(node, |n| &n.superclasses).contains(&candidate)
    }

    /// Returns true if `node` is a strict transitive descendant of `candidate`
    pub fn is_descendant_of(&self, node: ClassId, candidate: ClassId) -> bool {
        self.is_ancestor_of(candidate, node)
    }

    /// Every transitive ancestor of `id`, each once, in breadth-first order
    pub fn all_superclasses(&self, id: ClassId) -> Vec<ClassId> {
        self.walk(id, |n| &n.superclasses)
    }

    /// Every transitive descendant of `id`, each once, in breadth-first order
    pub fn all_subclasses(&self, id: ClassId) -> Vec<ClassId> {
        self.walk(id, |n| n.subclasses.iter())
    }

    /// Breadth-first closure over `edges`, excluding the start node.
    fn walk<'a, F, I>(&'a self, start: ClassId, edges: F) -> Vec<ClassId>
    where
        F: Fn(&'a ClassNode) -> I,
        I: IntoIterator<Item = &'a ClassId>,
    {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        seen.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let Some(node) = self.node(current) else {
                continue;
            };
            for next in edges(node) {
                if seen.insert(*next) {
                    order.push(*next);
                    queue.push_back(*next);
                }
            }
        }

        order
    }

    /// Finds the definition `id` exposes for `property`.
    ///
    /// Own properties first, then each superclass in declared order,
    /// depth-first; the first match wins.
    pub fn resolve_property(&self, id: ClassId, property: &str) -> Option<&PropertyDef> {
        let mut visited = HashSet::new();
        self.resolve_in(id, property, &mut visited)
    }

    fn resolve_in(
        &self,
        id: ClassId,
        property: &str,
        visited: &mut HashSet<ClassId>,
    ) -> Option<&PropertyDef> {
        // A class already visited found nothing for this name.
        if !visited.insert(id) {
            return None;
        }

        let node = self.node(id)?;
        if let Some(def) = node.properties.get(property) {
            return Some(def);
        }

        node.superclasses
            .iter()
            .find_map(|sup| self.resolve_in(*sup, property, visited))
    }

    /// Every property `id` exposes, own and inherited, keyed by declared name.
    ///
    /// Uses the same first-match order as [`Self::resolve_property`].
    pub fn resolved_properties(&self, id: ClassId) -> BTreeMap<String, PropertyDef> {
        let mut seen_names = HashSet::new();
        let mut visited = HashSet::new();
        let mut resolved = BTreeMap::new();
        self.collect_properties(id, &mut visited, &mut seen_names, &mut resolved);
        resolved
    }

    fn collect_properties(
        &self,
        id: ClassId,
        visited: &mut HashSet<ClassId>,
        seen_names: &mut HashSet<String>,
        resolved: &mut BTreeMap<String, PropertyDef>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(node) = self.node(id) else {
            return;
        };

        for def in node.properties.iter() {
            if seen_names.insert(name_key(&def.name)) {
                resolved.insert(def.name.clone(), def.clone());
            }
        }
        for sup in &node.superclasses {
            self.collect_properties(*sup, visited, seen_names, resolved);
        }
    }

    /// Declares a property on `id` itself.
    pub fn add_property(
        &mut self,
        id: ClassId,
        property: &str,
        property_type: PropertyType,
    ) -> SchemaResult<PropertyDef> {
        validate_name(property).map_err(|reason| SchemaError::invalid_name(property, reason))?;

        let node = self
            .node_mut(id)
            .ok_or_else(|| SchemaError::unknown_class(id.to_string()))?;

        let def = PropertyDef::new(property, property_type, node.name.clone());
        if !node.properties.insert(def.clone()) {
            return Err(SchemaError::duplicate_property(node.name.clone(), property));
        }
        Ok(def)
    }

    /// Removes a property declared on `id` itself.
    pub fn drop_property(&mut self, id: ClassId, property: &str) -> SchemaResult<PropertyDef> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| SchemaError::unknown_class(id.to_string()))?;

        node.properties
            .remove(property)
            .ok_or_else(|| SchemaError::unknown_property(node.name.clone(), property))
    }

    /// Sets the abstract flag; returns true if it changed
    pub fn set_abstract(&mut self, id: ClassId, is_abstract: bool) -> SchemaResult<bool> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| SchemaError::unknown_class(id.to_string()))?;

        let changed = node.is_abstract != is_abstract;
        node.is_abstract = is_abstract;
        Ok(changed)
    }

    /// Checks acyclicity and back-reference consistency of the whole graph.
    ///
    /// Returns a description of the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        for node in self.nodes() {
            let mut listed = HashSet::new();
            for sup in &node.superclasses {
                if !listed.insert(*sup) {
                    return Err(format!(
                        "class '{}' lists superclass '{}' twice",
                        node.name,
                        self.name_of(*sup)
                    ));
                }
                match self.node(*sup) {
                    Some(parent) if parent.subclasses.contains(&node.id) => {}
                    Some(parent) => {
                        return Err(format!(
                            "class '{}' extends '{}' but is missing from its subclasses",
                            node.name, parent.name
                        ))
                    }
                    None => {
                        return Err(format!(
                            "class '{}' extends a class that does not exist ({})",
                            node.name, sup
                        ))
                    }
                }
            }
            for sub in &node.subclasses {
                match self.node(*sub) {
                    Some(child) if child.superclasses.contains(&node.id) => {}
                    _ => {
                        return Err(format!(
                            "class '{}' records subclass {} that does not extend it",
                            node.name, sub
                        ))
                    }
                }
            }
        }

        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), String> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];

        for root in self.nodes() {
            if marks[root.id.index()] != Mark::Unvisited {
                continue;
            }

            // Iterative DFS: (node, next superclass position)
            let mut stack: Vec<(ClassId, usize)> = vec![(root.id, 0)];
            marks[root.id.index()] = Mark::InProgress;

            while let Some((current, position)) = stack.pop() {
                let supers = self
                    .node(current)
                    .map(|n| n.superclasses.as_slice())
                    .unwrap_or(&[]);

                match supers.get(position) {
                    Some(&next) => {
                        stack.push((current, position + 1));
                        match marks.get(next.index()).copied() {
                            Some(Mark::InProgress) => {
                                return Err(format!(
                                    "recursion in class hierarchy: '{}' is its own ancestor",
                                    self.name_of(next)
                                ))
                            }
                            Some(Mark::Unvisited) => {
                                marks[next.index()] = Mark::InProgress;
                                stack.push((next, 0));
                            }
                            _ => {}
                        }
                    }
                    None => marks[current.index()] = Mark::Done,
                }
            }
        }

        Ok(())
    }

    /// Links superclasses without the per-edge recursion check.
    ///
    /// Only used while rebuilding a graph from persisted state; the caller
    /// must run [`Self::check_consistency`] afterwards.
    pub(crate) fn link_unchecked(&mut self, id: ClassId, superclasses: Vec<ClassId>) {
        for sup in &superclasses {
            if let Some(parent) = self.node_mut(*sup) {
                parent.subclasses.insert(id);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.superclasses = superclasses;
        }
    }
}

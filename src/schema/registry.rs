//! Schema registry: the mutable source of truth
//!
//! # Commit protocol
//!
//! Every mutation runs under the write lock:
//!
//! 1. Clone the live graph into a staged copy
//! 2. Validate and apply the change to the staged copy
//! 3. Persist the mutation through the store
//! 4. Swap the staged copy in and bump the version
//!
//! A failure at any step leaves the live graph and version untouched.
//! Readers never see a half-applied change.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::hierarchy::HierarchyGraph;
use super::snapshot::SchemaSnapshot;
use super::types::{ClassId, PropertyDef, PropertyType};
use super::view::ClassView;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, ObservationScope};
use crate::store::{MemorySchemaStore, SchemaMutation, SchemaStore, StoredClass};

/// What `Remove` does when the class does not list the superclass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Succeed without changing anything
    #[default]
    Ignore,
    /// Fail with `AERO_SCHEMA_UNKNOWN_SUPERCLASS`
    Reject,
}

/// Registry behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    pub missing_superclass_removal: RemovalPolicy,
}

/// A change to a class's superclass list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuperclassOp {
    /// Replace the whole list, keeping the given order
    ReplaceAll(Vec<String>),
    /// Replace the whole list with one superclass
    ReplaceSingle(String),
    /// Append if not already listed
    Add(String),
    /// Remove if listed
    Remove(String),
}

struct RegistryState {
    graph: Arc<HierarchyGraph>,
    store: Box<dyn SchemaStore>,
    version: u64,
    /// Set by a FATAL persist failure; every later commit is refused
    halted: Option<String>,
}

/// Result of a staged change: the caller's value and what to persist.
///
/// `mutation: None` means nothing changed; nothing is persisted and the
/// version stays the same.
struct Staged<T> {
    value: T,
    mutation: Option<SchemaMutation>,
}

impl<T> Staged<T> {
    fn changed(value: T, mutation: SchemaMutation) -> Self {
        Self {
            value,
            mutation: Some(mutation),
        }
    }

    fn unchanged(value: T) -> Self {
        Self {
            value,
            mutation: None,
        }
    }
}

/// Shared handle to one schema
///
/// Clones address the same registry.
#[derive(Clone)]
pub struct SchemaRegistry {
    state: Arc<RwLock<RegistryState>>,
    options: RegistryOptions,
    metrics: Arc<MetricsRegistry>,
}

impl SchemaRegistry {
    /// Opens a registry over `store`, loading every persisted class.
    ///
    /// Fails with a FATAL corruption error if the persisted schema is
    /// inconsistent.
    pub fn open(store: Box<dyn SchemaStore>, options: RegistryOptions) -> SchemaResult<Self> {
        let scope = ObservationScope::new("SCHEMA_LOAD");
        let graph = match store
            .load_classes()
            .map_err(SchemaError::corruption_from_store)
            .and_then(build_graph)
        {
            Ok(graph) => graph,
            Err(e) => {
                log_event_with_fields(Event::SchemaCorruption, &[("reason", e.message())]);
                scope.fail_fatal(e.message());
                return Err(e);
            }
        };

        let classes = graph.len().to_string();
        scope.complete_with_fields(&[("classes", classes.as_str())]);
        log_event_with_fields(Event::SchemaOpen, &[("classes", classes.as_str())]);

        Ok(Self {
            state: Arc::new(RwLock::new(RegistryState {
                graph: Arc::new(graph),
                store,
                version: 0,
                halted: None,
            })),
            options,
            metrics: Arc::new(MetricsRegistry::new()),
        })
    }

    /// An empty registry over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState {
                graph: Arc::new(HierarchyGraph::new()),
                store: Box::new(MemorySchemaStore::new()),
                version: 0,
                halted: None,
            })),
            options: RegistryOptions::default(),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn current_graph(&self) -> Arc<HierarchyGraph> {
        Arc::clone(&self.read_state().graph)
    }

    /// Options this registry was opened with
    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Counters for this registry
    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    /// Incremented by every committed mutation and every reload
    pub fn version(&self) -> u64 {
        self.read_state().version
    }

    /// True once a FATAL persist failure has stopped all writes.
    ///
    /// Reads keep working. Only reopening the store clears the halt.
    pub fn is_halted(&self) -> bool {
        self.read_state().halted.is_some()
    }

    /// Runs one mutation through the commit protocol.
    ///
    /// A FATAL store failure halts the registry: the log may hold the
    /// mutation that memory discarded, so nothing further is written.
    fn commit<T, F>(&self, class_name: &str, stage: F) -> SchemaResult<T>
    where
        F: FnOnce(&mut HierarchyGraph, &dyn SchemaStore) -> SchemaResult<Staged<T>>,
    {
        let mut state = self.write_state();

        if let Some(reason) = &state.halted {
            let e = SchemaError::halted(reason.as_str());
            log_event_with_fields(
                Event::MutationRejected,
                &[
                    ("class", class_name),
                    ("code", e.code().code()),
                    ("reason", e.message()),
                ],
            );
            return Err(e);
        }

        let mut staged = HierarchyGraph::clone(&state.graph);

        let outcome = match stage(&mut staged, &*state.store) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.metrics.increment_mutations_rejected(e.is_recursion());
                log_event_with_fields(
                    Event::MutationRejected,
                    &[
                        ("class", class_name),
                        ("code", e.code().code()),
                        ("reason", e.message()),
                    ],
                );
                return Err(e);
            }
        };

        if let Some(mutation) = &outcome.mutation {
            if let Err(e) = state.store.persist(mutation) {
                self.metrics.increment_persist_failures();
                log_event_with_fields(
                    Event::PersistFailed,
                    &[("class", class_name), ("reason", e.message())],
                );
                if e.is_fatal() {
                    state.halted = Some(e.message().to_string());
                    log_event_with_fields(
                        Event::RegistryHalted,
                        &[("class", class_name), ("code", e.code().code())],
                    );
                }
                return Err(SchemaError::persist_failed(e));
            }
            self.metrics.increment_mutations_persisted();
            state.graph = Arc::new(staged);
            state.version += 1;
        }

        Ok(outcome.value)
    }

    fn create(&self, name: &str, superclasses: &[&str], is_abstract: bool) -> SchemaResult<LiveClass> {
        let (canonical, linked) = self.commit(name, |graph, _| {
            let id = graph.insert_class(name, is_abstract)?;
            let supers = graph.require_all(superclasses)?;
            graph.link_superclasses(id, &supers)?;

            let linked = superclass_names(graph, id);
            let mutation = SchemaMutation::CreateClass {
                name: name.to_string(),
                is_abstract,
                superclasses: linked.clone(),
            };
            Ok(Staged::changed((name.to_string(), linked), mutation))
        })?;

        self.metrics.increment_classes_created();
        let supers = linked.join(",");
        log_event_with_fields(
            Event::ClassCreated,
            &[
                ("abstract", if is_abstract { "true" } else { "false" }),
                ("class", canonical.as_str()),
                ("superclasses", supers.as_str()),
            ],
        );

        Ok(LiveClass::new(self.clone(), canonical))
    }

    /// Creates a concrete class extending `superclasses`, in order.
    pub fn create_class(&self, name: &str, superclasses: &[&str]) -> SchemaResult<LiveClass> {
        self.create(name, superclasses, false)
    }

    /// Creates an abstract class extending `superclasses`, in order.
    pub fn create_abstract_class(&self, name: &str, superclasses: &[&str]) -> SchemaResult<LiveClass> {
        self.create(name, superclasses, true)
    }

    /// Drops a class that has no subclasses and no stored records.
    pub fn drop_class(&self, name: &str) -> SchemaResult<()> {
        let dropped = self.commit(name, |graph, store| {
            let id = graph.require(name)?;
            let canonical = graph.name_of(id).to_string();

            let records = store
                .record_count(&canonical)
                .map_err(SchemaError::persist_failed)?;
            if records > 0 {
                return Err(SchemaError::class_in_use(
                    canonical,
                    format!("{} records stored", records),
                ));
            }

            graph.remove_class(id)?;
            Ok(Staged::changed(
                canonical.clone(),
                SchemaMutation::DropClass { name: canonical },
            ))
        })?;

        self.metrics.increment_classes_dropped();
        log_event_with_fields(Event::ClassDropped, &[("class", dropped.as_str())]);
        Ok(())
    }

    /// Live handle for a class, ignoring case
    pub fn get_class(&self, name: &str) -> Option<LiveClass> {
        let graph = self.current_graph();
        graph
            .get(name)
            .map(|node| LiveClass::new(self.clone(), node.name().to_string()))
    }

    pub fn exists_class(&self, name: &str) -> bool {
        self.read_state().graph.class_id(name).is_some()
    }

    /// Live handles for every class, ordered by name
    pub fn classes(&self) -> Vec<LiveClass> {
        self.current_graph()
            .class_names()
            .into_iter()
            .map(|name| LiveClass::new(self.clone(), name))
            .collect()
    }

    /// Replaces the superclass list of `class_name`
    pub fn set_super_classes(&self, class_name: &str, superclasses: &[&str]) -> SchemaResult<()> {
        self.alter_superclasses(
            class_name,
            SuperclassOp::ReplaceAll(superclasses.iter().map(|s| s.to_string()).collect()),
        )
    }

    /// Applies one superclass change.
    ///
    /// A change that leaves the list as it was commits nothing.
    pub fn alter_superclasses(&self, class_name: &str, op: SuperclassOp) -> SchemaResult<()> {
        let policy = self.options.missing_superclass_removal;

        let changed = self.commit(class_name, |graph, _| {
            let id = graph.require(class_name)?;
            let before = superclass_names(graph, id);

            match &op {
                SuperclassOp::ReplaceAll(names) => {
                    let supers = graph.require_all(names)?;
                    graph.link_superclasses(id, &supers)?;
                }
                SuperclassOp::ReplaceSingle(name) => {
                    let sup = graph.require(name)?;
                    graph.link_superclasses(id, &[sup])?;
                }
                SuperclassOp::Add(name) => {
                    let sup = graph.require(name)?;
                    graph.add_superclass(id, sup)?;
                }
                SuperclassOp::Remove(name) => {
                    let sup = graph.require(name)?;
                    let removed = graph.remove_superclass(id, sup)?;
                    if !removed && policy == RemovalPolicy::Reject {
                        return Err(SchemaError::unknown_superclass(
                            graph.name_of(id),
                            graph.name_of(sup),
                        ));
                    }
                }
            }

            let after = superclass_names(graph, id);
            if after == before {
                return Ok(Staged::unchanged(None));
            }

            let canonical = graph.name_of(id).to_string();
            Ok(Staged::changed(
                Some((canonical.clone(), after.join(","))),
                SchemaMutation::SetSuperclasses {
                    name: canonical,
                    superclasses: after,
                },
            ))
        })?;

        if let Some((class, supers)) = changed {
            self.metrics.increment_superclass_changes();
            log_event_with_fields(
                Event::SuperclassesChanged,
                &[("class", class.as_str()), ("superclasses", supers.as_str())],
            );
        }
        Ok(())
    }

    /// Declares a property on the class itself
    pub fn add_property(
        &self,
        class_name: &str,
        property: &str,
        property_type: PropertyType,
    ) -> SchemaResult<PropertyDef> {
        let def = self.commit(class_name, |graph, _| {
            let id = graph.require(class_name)?;
            let def = graph.add_property(id, property, property_type)?;
            let mutation = SchemaMutation::AddProperty {
                class_name: def.owner_class.clone(),
                name: def.name.clone(),
                property_type,
            };
            Ok(Staged::changed(def, mutation))
        })?;

        self.metrics.increment_properties_created();
        log_event_with_fields(
            Event::PropertyCreated,
            &[
                ("class", def.owner_class.as_str()),
                ("property", def.name.as_str()),
                ("type", def.property_type.type_name()),
            ],
        );
        Ok(def)
    }

    /// Removes a property declared on the class itself
    pub fn drop_property(&self, class_name: &str, property: &str) -> SchemaResult<PropertyDef> {
        let def = self.commit(class_name, |graph, _| {
            let id = graph.require(class_name)?;
            let def = graph.drop_property(id, property)?;
            let mutation = SchemaMutation::DropProperty {
                class_name: def.owner_class.clone(),
                name: def.name.clone(),
            };
            Ok(Staged::changed(def, mutation))
        })?;

        self.metrics.increment_properties_dropped();
        log_event_with_fields(
            Event::PropertyDropped,
            &[
                ("class", def.owner_class.as_str()),
                ("property", def.name.as_str()),
            ],
        );
        Ok(def)
    }

    /// Sets the abstract flag.
    ///
    /// A class with stored records cannot become abstract.
    pub fn set_abstract(&self, class_name: &str, is_abstract: bool) -> SchemaResult<()> {
        let changed = self.commit(class_name, |graph, store| {
            let id = graph.require(class_name)?;
            let canonical = graph.name_of(id).to_string();

            if !graph.set_abstract(id, is_abstract)? {
                return Ok(Staged::unchanged(None));
            }

            if is_abstract {
                let records = store
                    .record_count(&canonical)
                    .map_err(SchemaError::persist_failed)?;
                if records > 0 {
                    return Err(SchemaError::class_in_use(
                        canonical,
                        format!("{} records stored, cannot make it abstract", records),
                    ));
                }
            }

            Ok(Staged::changed(
                Some(canonical.clone()),
                SchemaMutation::SetAbstract {
                    name: canonical,
                    is_abstract,
                },
            ))
        })?;

        if let Some(class) = changed {
            self.metrics.increment_abstract_changes();
            log_event_with_fields(
                Event::ClassAbstractChanged,
                &[
                    ("abstract", if is_abstract { "true" } else { "false" }),
                    ("class", class.as_str()),
                ],
            );
        }
        Ok(())
    }

    /// Discards in-memory state and rebuilds it from the store.
    ///
    /// On failure the previous state is kept and a FATAL corruption error is
    /// returned.
    pub fn reload(&self) -> SchemaResult<()> {
        let scope = ObservationScope::new("SCHEMA_RELOAD");
        let mut state = self.write_state();

        let rebuilt = state
            .store
            .load_classes()
            .map_err(SchemaError::corruption_from_store)
            .and_then(build_graph);

        match rebuilt {
            Ok(graph) => {
                let classes = graph.len().to_string();
                state.graph = Arc::new(graph);
                state.version += 1;
                let version = state.version.to_string();
                drop(state);

                self.metrics.increment_reloads();
                log_event_with_fields(
                    Event::SchemaReloaded,
                    &[("classes", classes.as_str()), ("version", version.as_str())],
                );
                scope.complete_with_fields(&[("classes", classes.as_str())]);
                Ok(())
            }
            Err(e) => {
                drop(state);
                self.metrics.increment_reload_failures();
                log_event_with_fields(Event::SchemaCorruption, &[("reason", e.message())]);
                scope.fail_fatal(e.message());
                Err(e)
            }
        }
    }

    /// Takes an immutable snapshot of the current state
    pub fn snapshot(&self) -> SchemaSnapshot {
        let (graph, version) = {
            let state = self.read_state();
            (Arc::clone(&state.graph), state.version)
        };

        self.metrics.increment_snapshots();
        let version_str = version.to_string();
        log_event_with_fields(Event::SnapshotCreated, &[("version", version_str.as_str())]);
        SchemaSnapshot::new(graph, version)
    }

    /// Same as [`Self::snapshot`]
    pub fn immutable_snapshot(&self) -> SchemaSnapshot {
        self.snapshot()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("SchemaRegistry")
            .field("classes", &state.graph.len())
            .field("version", &state.version)
            .field("halted", &state.halted.is_some())
            .field("options", &self.options)
            .finish()
    }
}

fn superclass_names(graph: &HierarchyGraph, id: ClassId) -> Vec<String> {
    graph
        .node(id)
        .map(|n| graph.names_of(n.superclasses().iter().copied()))
        .unwrap_or_default()
}

/// Rebuilds a graph from persisted classes.
///
/// Superclasses are linked in a second pass, once every class exists, since
/// a class may be stored before the classes it extends. Anything that does
/// not fit together is corruption.
fn build_graph(classes: Vec<StoredClass>) -> SchemaResult<HierarchyGraph> {
    let mut graph = HierarchyGraph::new();
    let mut pending = Vec::with_capacity(classes.len());

    for class in classes {
        let id = graph
            .insert_class(&class.name, class.is_abstract)
            .map_err(|e| SchemaError::corruption(e.message()))?;
        for property in &class.properties {
            graph
                .add_property(id, &property.name, property.property_type)
                .map_err(|e| SchemaError::corruption(e.message()))?;
        }
        pending.push((id, class.name, class.superclasses));
    }

    for (id, name, superclasses) in pending {
        let mut ids = Vec::with_capacity(superclasses.len());
        for superclass in &superclasses {
            let sup = graph.class_id(superclass).ok_or_else(|| {
                SchemaError::corruption(format!(
                    "class '{}' extends unknown class '{}'",
                    name, superclass
                ))
            })?;
            ids.push(sup);
        }
        graph.link_unchecked(id, ids);
    }

    graph
        .check_consistency()
        .map_err(SchemaError::corruption)?;
    Ok(graph)
}

/// Live view of one class.
///
/// Every query reads the registry's current state, so two calls may see
/// different answers if a mutation commits in between.
#[derive(Clone)]
pub struct LiveClass {
    registry: SchemaRegistry,
    name: String,
}

impl LiveClass {
    fn new(registry: SchemaRegistry, name: String) -> Self {
        Self { registry, name }
    }

    /// The registry this handle reads
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn set_super_classes(&self, superclasses: &[&str]) -> SchemaResult<()> {
        self.registry.set_super_classes(&self.name, superclasses)
    }

    pub fn alter_superclasses(&self, op: SuperclassOp) -> SchemaResult<()> {
        self.registry.alter_superclasses(&self.name, op)
    }

    pub fn add_super_class(&self, superclass: &str) -> SchemaResult<()> {
        self.alter_superclasses(SuperclassOp::Add(superclass.to_string()))
    }

    pub fn remove_super_class(&self, superclass: &str) -> SchemaResult<()> {
        self.alter_superclasses(SuperclassOp::Remove(superclass.to_string()))
    }

    pub fn create_property(&self, name: &str, property_type: PropertyType) -> SchemaResult<PropertyDef> {
        self.registry.add_property(&self.name, name, property_type)
    }

    pub fn drop_property(&self, name: &str) -> SchemaResult<PropertyDef> {
        self.registry.drop_property(&self.name, name)
    }

    pub fn set_abstract(&self, is_abstract: bool) -> SchemaResult<()> {
        self.registry.set_abstract(&self.name, is_abstract)
    }
}

impl ClassView for LiveClass {
    fn read<R>(&self, f: impl FnOnce(&HierarchyGraph, Option<ClassId>) -> R) -> R {
        let state = self.registry.read_state();
        let graph: &HierarchyGraph = &state.graph;
        f(graph, graph.class_id(&self.name))
    }

    fn sibling(&self, graph: &HierarchyGraph, id: ClassId) -> Self {
        LiveClass::new(self.registry.clone(), graph.name_of(id).to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for LiveClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveClass").field("name", &self.name).finish()
    }
}

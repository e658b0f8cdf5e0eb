//! Schema metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only when the owning registry is created

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for one schema registry
///
/// All counters use Relaxed ordering; values are exact once the counting
/// threads have finished.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    classes_created: AtomicU64,
    classes_dropped: AtomicU64,
    superclass_changes: AtomicU64,
    abstract_changes: AtomicU64,
    properties_created: AtomicU64,
    properties_dropped: AtomicU64,
    /// Mutations refused before reaching the store
    mutations_rejected: AtomicU64,
    /// Subset of rejections caused by a would-be cycle
    cycles_rejected: AtomicU64,
    /// Mutations the store accepted
    mutations_persisted: AtomicU64,
    persist_failures: AtomicU64,
    snapshots_created: AtomicU64,
    reloads: AtomicU64,
    reload_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // Structural mutations

    pub fn increment_classes_created(&self) {
        Self::bump(&self.classes_created);
    }

    pub fn increment_classes_dropped(&self) {
        Self::bump(&self.classes_dropped);
    }

    pub fn increment_superclass_changes(&self) {
        Self::bump(&self.superclass_changes);
    }

    pub fn increment_abstract_changes(&self) {
        Self::bump(&self.abstract_changes);
    }

    pub fn increment_properties_created(&self) {
        Self::bump(&self.properties_created);
    }

    pub fn increment_properties_dropped(&self) {
        Self::bump(&self.properties_dropped);
    }

    // Rejections and persistence

    /// Counts a rejected mutation; `cycle` also counts it as a cycle rejection
    pub fn increment_mutations_rejected(&self, cycle: bool) {
        Self::bump(&self.mutations_rejected);
        if cycle {
            Self::bump(&self.cycles_rejected);
        }
    }

    pub fn increment_mutations_persisted(&self) {
        Self::bump(&self.mutations_persisted);
    }

    pub fn increment_persist_failures(&self) {
        Self::bump(&self.persist_failures);
    }

    // Snapshots and reloads

    pub fn increment_snapshots(&self) {
        Self::bump(&self.snapshots_created);
    }

    pub fn increment_reloads(&self) {
        Self::bump(&self.reloads);
    }

    pub fn increment_reload_failures(&self) {
        Self::bump(&self.reload_failures);
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"classes_created":{},"classes_dropped":{},"superclass_changes":{},"abstract_changes":{},"properties_created":{},"properties_dropped":{},"mutations_rejected":{},"cycles_rejected":{},"mutations_persisted":{},"persist_failures":{},"snapshots":{},"reloads":{},"reload_failures":{}}}"#,
            s.classes_created,
            s.classes_dropped,
            s.superclass_changes,
            s.abstract_changes,
            s.properties_created,
            s.properties_dropped,
            s.mutations_rejected,
            s.cycles_rejected,
            s.mutations_persisted,
            s.persist_failures,
            s.snapshots,
            s.reloads,
            s.reload_failures,
        )
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            classes_created: self.classes_created.load(Ordering::Relaxed),
            classes_dropped: self.classes_dropped.load(Ordering::Relaxed),
            superclass_changes: self.superclass_changes.load(Ordering::Relaxed),
            abstract_changes: self.abstract_changes.load(Ordering::Relaxed),
            properties_created: self.properties_created.load(Ordering::Relaxed),
            properties_dropped: self.properties_dropped.load(Ordering::Relaxed),
            mutations_rejected: self.mutations_rejected.load(Ordering::Relaxed),
            cycles_rejected: self.cycles_rejected.load(Ordering::Relaxed),
            mutations_persisted: self.mutations_persisted.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            snapshots: self.snapshots_created.load(Ordering::Relaxed),
            reloads: self.reloads.load(Ordering::Relaxed),
            reload_failures: self.reload_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub classes_created: u64,
    pub classes_dropped: u64,
    pub superclass_changes: u64,
    pub abstract_changes: u64,
    pub properties_created: u64,
    pub properties_dropped: u64,
    pub mutations_rejected: u64,
    pub cycles_rejected: u64,
    pub mutations_persisted: u64,
    pub persist_failures: u64,
    pub snapshots: u64,
    pub reloads: u64,
    pub reload_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_cycle_rejection_counts_twice() {
        let registry = MetricsRegistry::new();
        registry.increment_mutations_rejected(true);
        registry.increment_mutations_rejected(false);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.mutations_rejected, 2);
        assert_eq!(snapshot.cycles_rejected, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_classes_created();
        registry.increment_classes_created();
        registry.increment_snapshots();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["classes_created"], 2);
        assert_eq!(parsed["snapshots"], 1);
        assert_eq!(parsed["reload_failures"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_superclass_changes();
                    reg.increment_mutations_persisted();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.superclass_changes, 1000);
        assert_eq!(snapshot.mutations_persisted, 1000);
    }
}

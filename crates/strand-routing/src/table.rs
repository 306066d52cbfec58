use std::{collections::HashMap, sync::Arc, sync::Mutex};

use arc_swap::ArcSwap;

use crate::{
    entry::RouteEntry,
    error::RoutingError,
    metrics::LatencyWindow,
    query::Query,
    resolver::{ResolverWeights, resolve},
};

/// Lock-free-read, copy-on-write table of [`RouteEntry`] values (spec.md
/// §4.E, §5).
///
/// Readers ([`Self::lookup`], [`Self::snapshot`], [`Self::size`]) take one
/// atomic load of the current snapshot pointer and never block, regardless
/// of concurrent writers. Writers ([`Self::insert`], [`Self::remove`],
/// [`Self::gc`], [`Self::update_metrics`]) serialize on an internal mutex,
/// clone the current snapshot, mutate the clone, and atomically publish it
/// — the prior snapshot is reclaimed once its last reader (an `Arc` clone
/// already in flight) drops it, never blocking those readers.
pub struct RoutingTable {
    snapshot: ArcSwap<Vec<RouteEntry>>,
    write_lock: Mutex<()>,
    latency_windows: Mutex<HashMap<[u8; 16], LatencyWindow>>,
}

impl RoutingTable {
    /// Create an empty routing table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
            latency_windows: Mutex::new(HashMap::new()),
        }
    }

    /// Insert `entry`, replacing any existing entry with the same
    /// `node_id` (spec.md §4.E: "replace-by-`node_id`").
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidEntry`] without mutating the table if
    /// `entry` violates one of spec.md §3's declared field invariants:
    /// `trust_level` outside `0..=4`, or `load_factor` outside `0.0..=1.0`.
    pub fn insert(&self, entry: RouteEntry) -> Result<(), RoutingError> {
        if entry.trust_level > 4 {
            return Err(RoutingError::InvalidEntry(format!(
                "trust_level {} exceeds the maximum of 4",
                entry.trust_level
            )));
        }
        if !(0.0..=1.0).contains(&entry.load_factor) {
            return Err(RoutingError::InvalidEntry(format!(
                "load_factor {} is outside the valid range [0, 1]",
                entry.load_factor
            )));
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = self.snapshot.load();
        let mut next: Vec<RouteEntry> = (**current).clone();
        next.retain(|e| e.node_id != entry.node_id);
        next.push(entry);
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    /// Remove the entry with this `node_id`, if present. Returns `true` if
    /// an entry was removed.
    pub fn remove(&self, node_id: [u8; 16]) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = self.snapshot.load();
        let mut next: Vec<RouteEntry> = (**current).clone();
        let before = next.len();
        next.retain(|e| e.node_id != node_id);
        let removed = next.len() != before;
        if removed {
            self.snapshot.store(Arc::new(next));
        }
        removed
    }

    /// Resolve `query` against the current snapshot, returning the top `max`
    /// entries under `weights` (spec.md §4.E `lookup`, delegating scoring to
    /// [`crate::resolve`]).
    ///
    /// Consistent with some single snapshot taken at call start — entries
    /// inserted or removed concurrently after this call begins are not
    /// observed (spec.md §8).
    #[must_use]
    pub fn lookup(&self, query: &Query, weights: &ResolverWeights, max: usize) -> Vec<RouteEntry> {
        let current = self.snapshot.load();
        resolve(weights, &current, query, max).into_iter().map(|(entry, _score)| entry).collect()
    }

    /// Update the latency/load metrics for `node_id`, bumping
    /// `last_updated_ns` to `now_ns` and recording `latency_us` into that
    /// node's [`LatencyWindow`]. A no-op if `node_id` is not present.
    pub fn update_metrics(&self, node_id: [u8; 16], latency_us: u32, load_factor: f32, now_ns: u64) {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = self.snapshot.load();
        let mut next: Vec<RouteEntry> = (**current).clone();
        let Some(entry) = next.iter_mut().find(|e| e.node_id == node_id) else {
            return;
        };
        entry.latency_us = latency_us;
        entry.load_factor = load_factor;
        entry.last_updated_ns = now_ns;
        self.snapshot.store(Arc::new(next));

        let mut windows = self.latency_windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        windows.entry(node_id).or_default().record(latency_us);
    }

    /// Mean latency recorded for `node_id` over its retained window, or
    /// `None` if no samples have been recorded.
    #[must_use]
    pub fn mean_latency_us(&self, node_id: [u8; 16]) -> Option<f64> {
        let windows = self.latency_windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        windows.get(&node_id).and_then(LatencyWindow::mean)
    }

    /// Number of entries currently in the table.
    #[must_use]
    pub fn size(&self) -> usize {
        self.snapshot.load().len()
    }

    /// An immutable snapshot of every entry currently in the table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<RouteEntry>> {
        self.snapshot.load_full()
    }

    /// Remove every entry expired at `now_ns` (spec.md §3, §8 scenario 4),
    /// returning the number removed.
    pub fn gc(&self, now_ns: u64) -> usize {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = self.snapshot.load();
        let before = current.len();
        let next: Vec<RouteEntry> =
            current.iter().filter(|e| !e.is_expired(now_ns)).cloned().collect();
        let removed = before - next.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = next.len(), "routing table GC removed expired entries");
            self.snapshot.store(Arc::new(next));
        }
        removed
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use strand_sad::SadBuilder;

    use super::*;

    fn entry(node_id: u8, ttl_ns: u64, last_updated_ns: u64) -> RouteEntry {
        RouteEntry {
            node_id: [node_id; 16],
            sad: SadBuilder::new().version(1).model_type("m").build().unwrap(),
            latency_us: 100,
            load_factor: 0.1,
            cost_milli: 0,
            trust_level: 2,
            region_code: 0,
            publisher_id: None,
            benchmark_score: None,
            last_updated_ns,
            ttl_ns,
        }
    }

    #[test]
    fn insert_replaces_by_node_id() {
        let table = RoutingTable::new();
        table.insert(entry(1, 0, 0)).unwrap();
        let mut replacement = entry(1, 0, 0);
        replacement.cost_milli = 42;
        table.insert(replacement).unwrap();
        assert_eq!(table.size(), 1);
        assert_eq!(table.snapshot()[0].cost_milli, 42);
    }

    #[test]
    fn remove_drops_entry() {
        let table = RoutingTable::new();
        table.insert(entry(1, 0, 0)).unwrap();
        assert!(table.remove([1; 16]));
        assert!(!table.remove([1; 16]));
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn gc_removes_exactly_expired_entries() {
        let table = RoutingTable::new();
        table.insert(entry(1, 500, 1000)).unwrap(); // expires at > 1500
        table.insert(entry(2, 0, 1000)).unwrap(); // permanent

        assert_eq!(table.gc(1400), 0);
        assert_eq!(table.size(), 2);

        assert_eq!(table.gc(1600), 1);
        assert_eq!(table.size(), 1);
        assert_eq!(table.snapshot()[0].node_id, [2; 16]);
    }

    #[test]
    fn update_metrics_bumps_fields_and_records_window() {
        let table = RoutingTable::new();
        table.insert(entry(1, 0, 0)).unwrap();
        table.update_metrics([1; 16], 250, 0.7, 9999);
        let snap = table.snapshot();
        assert_eq!(snap[0].latency_us, 250);
        assert_eq!(snap[0].last_updated_ns, 9999);
        assert_eq!(table.mean_latency_us([1; 16]), Some(250.0));
    }

    #[test]
    fn lookup_reflects_a_consistent_snapshot() {
        let table = RoutingTable::new();
        table.insert(entry(1, 0, 0)).unwrap();
        table.insert(entry(2, 0, 0)).unwrap();
        let results =
            table.lookup(&crate::Query::default(), &crate::ResolverWeights::default(), 10);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn insert_rejects_trust_level_above_four() {
        let table = RoutingTable::new();
        let mut invalid = entry(1, 0, 0);
        invalid.trust_level = 5;
        let err = table.insert(invalid).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidEntry(_)));
        assert_eq!(table.size(), 0);
    }

    #[test]
    fn insert_rejects_load_factor_outside_unit_range() {
        let table = RoutingTable::new();
        let mut too_high = entry(1, 0, 0);
        too_high.load_factor = 1.5;
        assert!(table.insert(too_high).is_err());

        let mut negative = entry(2, 0, 0);
        negative.load_factor = -0.1;
        assert!(table.insert(negative).is_err());

        assert_eq!(table.size(), 0);
    }
}

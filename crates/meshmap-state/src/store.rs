//! Owned per-node record store with staleness pruning

use chrono::{DateTime, Utc};
use meshmap_core::{NodeId, NodeRecord};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Owned collection of node records, keyed by node identifier
///
/// Iteration order is ascending by identifier. Downstream tie-breaks (the
/// address index, topology group resolution) rely on that order being
/// fixed, so the backing map stays ordered.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    records: BTreeMap<NodeId, NodeRecord>,
    stats: StoreStats,
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Records created over the lifetime of the store
    pub records_created: u64,

    /// Records removed, explicitly or by age
    pub records_pruned: u64,
}

impl NodeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a record
    pub fn get(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.records.get(id)
    }

    /// Get a record for mutation
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut NodeRecord> {
        self.records.get_mut(id)
    }

    /// Whether a record exists for `id`
    pub fn contains(&self, id: &NodeId) -> bool {
        self.records.contains_key(id)
    }

    /// Get the record for `id`, creating an empty one if absent
    pub fn upsert(&mut self, id: NodeId) -> &mut NodeRecord {
        if !self.records.contains_key(&id) {
            debug!("creating record for node {}", id);
            self.stats.records_created += 1;
        }
        self.records.entry(id).or_default()
    }

    /// Remove a record; no-op when absent
    pub fn remove(&mut self, id: &NodeId) -> Option<NodeRecord> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            self.stats.records_pruned += 1;
            info!("pruned node {}", id);
        }
        removed
    }

    /// Remove every record not seen for at least `days` whole days
    ///
    /// A record with no `lastseen` at all is always removed. The comparison
    /// is `>=`, so a threshold of zero removes every record carrying any
    /// `lastseen` value. Returns the number of records removed.
    pub fn prune_stale(&mut self, now: DateTime<Utc>, days: i64) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| matches!(record.age_in_days(now), Some(age) if age < days));

        let pruned = before - self.records.len();
        if pruned > 0 {
            self.stats.records_pruned += pruned as u64;
            info!("pruned {} stale records", pruned);
        }
        pruned
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in ascending identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeRecord)> {
        self.records.iter()
    }

    /// Iterate records for mutation, in ascending identifier order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&NodeId, &mut NodeRecord)> {
        self.records.iter_mut()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
        info!("cleared all node records");
    }

    /// Store statistics
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Number of records currently flagged online
    pub fn online_count(&self) -> usize {
        self.records.values().filter(|r| r.flags.online).count()
    }

    /// Number of records currently flagged as having an uplink
    pub fn uplink_count(&self) -> usize {
        self.records.values().filter(|r| r.flags.uplink).count()
    }

    /// Sum of the known client counts across all records
    pub fn total_clients(&self) -> u64 {
        self.records
            .values()
            .filter_map(|r| r.statistics.clients)
            .sum()
    }
}

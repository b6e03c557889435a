//! Per-node record model for the mesh map
//!
//! These structures hold everything the reconciler knows about a single
//! node: derived status flags, the self-reported nodeinfo document,
//! normalized statistics, and first/last sighting times. Records are
//! mutated in place by the importers over the course of a collection cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status flags derived for a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    /// Whether the node was seen during the current collection cycle
    pub online: bool,

    /// Whether the node has a VPN peer with an established session
    pub uplink: bool,
}

/// Normalized statistics for a node, rebuilt every collection cycle
///
/// Every field is optional: a metric missing from the raw feed, or one that
/// fails extraction, is simply left unset. `clients` is `Some(0)` from the
/// start-of-cycle reset onwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStatistics {
    /// Number of attached client devices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<u64>,

    /// Seconds since the node booted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,

    /// One-minute load average
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loadavg: Option<f64>,

    /// Fraction of memory in use, in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<f64>,

    /// Fraction of the root filesystem in use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rootfs_usage: Option<f64>,

    /// Raw traffic counters, kept exactly as reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic: Option<Value>,

    /// VPN peers with an established session, in traversal order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn_peers: Option<Vec<String>>,
}

/// Everything known about a single mesh node
///
/// A record comes into existence only through a nodeinfo import; the other
/// importers augment existing records and never create new ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Derived status flags, always present
    pub flags: NodeFlags,

    /// Self-reported nodeinfo document, replaced wholesale on re-import
    pub nodeinfo: Value,

    /// Normalized statistics for the current cycle
    pub statistics: NodeStatistics,

    /// Time of the first sighting, never overwritten once set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstseen: Option<DateTime<Utc>>,

    /// Time of the most recent sighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastseen: Option<DateTime<Utc>>,
}

impl NodeRecord {
    /// Create an empty record; flags start cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the node as seen at `now`
    ///
    /// `lastseen` always moves to the supplied time; `firstseen` is
    /// first-write-wins.
    pub fn mark_online(&mut self, now: DateTime<Utc>) {
        self.lastseen = Some(now);
        self.firstseen.get_or_insert(now);
        self.flags.online = true;
    }

    /// Replace statistics with the start-of-cycle baseline
    pub fn reset_statistics(&mut self) {
        self.statistics = NodeStatistics {
            clients: Some(0),
            ..NodeStatistics::default()
        };
    }

    /// Age of the record in whole days at `now`, if it was ever seen
    pub fn age_in_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.lastseen.map(|seen| (now - seen).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mark_online_sets_flag_and_times() {
        let mut node = NodeRecord::new();
        assert!(!node.flags.online);

        node.mark_online(at_noon());
        assert!(node.flags.online);
        assert_eq!(node.lastseen, Some(at_noon()));
        assert_eq!(node.firstseen, Some(at_noon()));
    }

    #[test]
    fn test_firstseen_is_first_write_wins() {
        let mut node = NodeRecord::new();
        node.mark_online(at_noon());

        let later = at_noon() + Duration::hours(6);
        node.mark_online(later);
        assert_eq!(node.firstseen, Some(at_noon()));
        assert_eq!(node.lastseen, Some(later));
    }

    #[test]
    fn test_reset_statistics_baseline() {
        let mut node = NodeRecord::new();
        node.statistics.uptime = Some(12345.0);
        node.statistics.clients = Some(9);

        node.reset_statistics();
        assert_eq!(node.statistics.clients, Some(0));
        assert_eq!(node.statistics.uptime, None);
        assert_eq!(node.statistics.vpn_peers, None);
    }

    #[test]
    fn test_age_truncates_to_whole_days() {
        let mut node = NodeRecord::new();
        assert_eq!(node.age_in_days(at_noon()), None);

        node.lastseen = Some(at_noon() - Duration::hours(23));
        assert_eq!(node.age_in_days(at_noon()), Some(0));

        node.lastseen = Some(at_noon() - Duration::hours(49));
        assert_eq!(node.age_in_days(at_noon()), Some(2));
    }

    #[test]
    fn test_serialized_statistics_omit_unset_fields() {
        let mut node = NodeRecord::new();
        node.reset_statistics();

        let encoded = serde_json::to_value(&node.statistics).unwrap();
        assert_eq!(encoded, serde_json::json!({"clients": 0}));
    }
}

//! Fixed-order update pipeline for one collection cycle

use crate::config::StateConfig;
use crate::store::NodeStore;
use crate::{
    import_client_counts, import_mesh_interfaces, import_nodeinfo, import_statistics,
    mark_online_from_vis, reset_statistics,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

/// One round of raw feed snapshots, as supplied by the transport layer
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedSet<'a> {
    /// Self-reported nodeinfo documents
    pub nodeinfo: &'a [Value],

    /// Raw statistics documents
    pub statistics: &'a [Value],

    /// Topology snapshot records
    pub vis_data: &'a [Value],
}

/// Runs the reconciliation stages of one collection cycle in the only
/// valid order
///
/// The stage ordering is a hard contract: statistics must be reset before
/// the statistics import, and nodeinfo must be imported before any stage
/// that resolves addresses, since unresolved addresses are skipped rather
/// than treated as new nodes. Driving a cycle through [`UpdateCycle::run`]
/// makes misordering impossible. The individual stage functions stay public
/// for callers that schedule stages themselves; those callers own the
/// ordering contract.
#[derive(Debug, Clone)]
pub struct UpdateCycle {
    now: DateTime<Utc>,
    config: StateConfig,
}

impl UpdateCycle {
    /// Create a cycle running at the injected instant `now`
    pub fn new(now: DateTime<Utc>, config: StateConfig) -> Self {
        Self { now, config }
    }

    /// Run all stages against `store`
    pub fn run(&self, store: &mut NodeStore, feeds: &FeedSet<'_>) {
        import_nodeinfo(store, feeds.nodeinfo, self.now, self.config.assume_online);
        reset_statistics(store);
        import_statistics(store, feeds.statistics);
        import_mesh_interfaces(store, feeds.vis_data);
        import_client_counts(store, feeds.vis_data);
        mark_online_from_vis(store, feeds.vis_data, self.now);

        if let Some(days) = self.config.prune_after_days {
            store.prune_stale(self.now, days);
        }

        info!(
            "collection cycle complete: {} nodes, {} online, {} with uplink",
            store.len(),
            store.online_count(),
            store.uplink_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use meshmap_core::NodeId;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 3, 14, 12, 0, 0).unwrap()
    }

    fn feeds<'a>(
        nodeinfo: &'a [Value],
        statistics: &'a [Value],
        vis_data: &'a [Value],
    ) -> FeedSet<'a> {
        FeedSet {
            nodeinfo,
            statistics,
            vis_data,
        }
    }

    #[test]
    fn test_full_cycle_reconciles_all_feeds() {
        let mut store = NodeStore::new();

        let nodeinfo = vec![
            json!({"node_id": "n1", "network": {"mesh_interfaces": ["aa"]}}),
            json!({"node_id": "n2", "network": {"mesh_interfaces": ["bb"]}}),
        ];
        let statistics = vec![json!({
            "node_id": "n1",
            "clients": {"total": 5},
            "mesh_vpn": {"groups": {"g": {"peers": {"vpn1": {"established": 60}}}}},
        })];
        let vis_data = vec![
            json!({"of": "aa", "secondary": "cc"}),
            json!({"primary": "aa"}),
            json!({"secondary": "bb"}),
        ];

        let cycle = UpdateCycle::new(now(), StateConfig::default());
        cycle.run(&mut store, &feeds(&nodeinfo, &statistics, &vis_data));

        let n1 = store.get(&NodeId::new("n1")).unwrap();
        assert!(n1.flags.online);
        assert!(n1.flags.uplink);
        assert_eq!(n1.statistics.clients, Some(5));
        assert_eq!(n1.statistics.vpn_peers, Some(vec!["vpn1".to_string()]));

        let n2 = store.get(&NodeId::new("n2")).unwrap();
        assert!(n2.flags.online);
        assert!(!n2.flags.uplink);
        assert_eq!(n2.statistics.clients, Some(0));
    }

    #[test]
    fn test_statistics_survive_the_in_cycle_reset() {
        // The reset runs between the nodeinfo and statistics imports, so
        // values from this round's feed must land after it.
        let mut store = NodeStore::new();
        let nodeinfo = vec![json!({"node_id": "n1"})];
        let statistics = vec![json!({"node_id": "n1", "uptime": 99.0})];

        let cycle = UpdateCycle::new(now(), StateConfig::default());
        cycle.run(&mut store, &feeds(&nodeinfo, &statistics, &[]));

        let n1 = store.get(&NodeId::new("n1")).unwrap();
        assert_eq!(n1.statistics.uptime, Some(99.0));
        assert_eq!(n1.statistics.clients, Some(0));
    }

    #[test]
    fn test_assume_online_applies_to_every_imported_node() {
        let mut store = NodeStore::new();
        let nodeinfo = vec![json!({"node_id": "n1"}), json!({"node_id": "n2"})];

        let config = StateConfig {
            assume_online: true,
            ..StateConfig::default()
        };
        UpdateCycle::new(now(), config).run(&mut store, &feeds(&nodeinfo, &[], &[]));

        assert_eq!(store.online_count(), 2);
        for (_, node) in store.iter() {
            assert_eq!(node.lastseen, Some(now()));
        }
    }

    #[test]
    fn test_configured_prune_runs_last() {
        let mut store = NodeStore::new();
        store
            .upsert(NodeId::new("stale"))
            .mark_online(now() - Duration::days(30));

        let nodeinfo = vec![json!({"node_id": "fresh", "network": {"mesh_interfaces": ["aa"]}})];
        let vis_data = vec![json!({"primary": "aa"})];

        let config = StateConfig {
            assume_online: false,
            prune_after_days: Some(14),
        };
        UpdateCycle::new(now(), config).run(&mut store, &feeds(&nodeinfo, &[], &vis_data));

        assert!(store.get(&NodeId::new("stale")).is_none());
        assert!(store.get(&NodeId::new("fresh")).unwrap().flags.online);
    }
}

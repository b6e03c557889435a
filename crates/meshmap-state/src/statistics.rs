//! Importer for the statistics feed, including uplink derivation

use crate::store::NodeStore;
use meshmap_core::{path, NodeId, NodeRecord};
use serde_json::{Map, Value};
use tracing::debug;

/// Reset every node's statistics to the start-of-cycle baseline
///
/// Must run before `import_statistics` within a cycle, so metrics absent
/// from this round's feed do not linger from a previous round.
pub fn reset_statistics(store: &mut NodeStore) {
    for (_, node) in store.iter_mut() {
        node.reset_statistics();
    }
}

/// Import a batch of raw statistics documents
///
/// Documents are matched to existing records by `node_id`; identifiers not
/// present in the store are skipped, never created. Each metric is
/// extracted independently, so one malformed field leaves only that field
/// unset. Uplink status is derived from the same document afterwards.
pub fn import_statistics(store: &mut NodeStore, docs: &[Value]) {
    let mut matched = 0usize;

    for doc in docs {
        let id = match path::get_str(doc, &["node_id"]) {
            Some(id) => id,
            None => continue,
        };
        let node = match store.get_mut(&NodeId::from(id)) {
            Some(node) => node,
            None => {
                debug!("skipping statistics for unknown node {}", id);
                continue;
            }
        };

        apply_statistics(node, doc);
        mark_uplink(node, doc);
        matched += 1;
    }

    debug!("imported statistics for {} nodes", matched);
}

/// Extract the six normalized metrics from one raw document
fn apply_statistics(node: &mut NodeRecord, doc: &Value) {
    let stats = &mut node.statistics;

    if let Some(clients) = path::get_u64(doc, &["clients", "total"]) {
        stats.clients = Some(clients);
    }
    if let Some(uptime) = path::get_f64(doc, &["uptime"]) {
        stats.uptime = Some(uptime);
    }
    if let Some(loadavg) = path::get_f64(doc, &["loadavg"]) {
        stats.loadavg = Some(loadavg);
    }
    if let Some(usage) = memory_usage(doc) {
        stats.memory_usage = Some(usage);
    }
    if let Some(rootfs) = path::get_f64(doc, &["rootfs_usage"]) {
        stats.rootfs_usage = Some(rootfs);
    }
    if let Some(traffic) = path::get_path(doc, &["traffic"]) {
        stats.traffic = Some(traffic.clone());
    }
}

/// Memory usage as `1 - (free + buffers + cached) / total`
///
/// A missing component or a zero total leaves the metric unavailable.
fn memory_usage(doc: &Value) -> Option<f64> {
    let free = path::get_f64(doc, &["memory", "free"])?;
    let buffers = path::get_f64(doc, &["memory", "buffers"])?;
    let cached = path::get_f64(doc, &["memory", "cached"])?;
    let total = path::get_f64(doc, &["memory", "total"])?;

    if total == 0.0 {
        return None;
    }
    Some(1.0 - (free + buffers + cached) / total)
}

/// Derive uplink status from the VPN peer-group tree of a raw document
///
/// Absence of the tree anywhere along `mesh_vpn.groups` is a silent no-op.
/// A non-empty list of qualifying peers sets `flags.uplink` and replaces
/// `statistics.vpn_peers`; an empty list changes nothing, so the flag is
/// only ever cleared by a nodeinfo re-import.
pub fn mark_uplink(node: &mut NodeRecord, doc: &Value) {
    let groups = match path::get_path(doc, &["mesh_vpn", "groups"]).and_then(Value::as_object) {
        Some(groups) => groups,
        None => return,
    };

    let peers = collect_uplink_peers(groups);
    if !peers.is_empty() {
        node.flags.uplink = true;
        node.statistics.vpn_peers = Some(peers);
    }
}

/// Depth-first walk over a peer-group tree
///
/// A peer qualifies when its status object carries an `established` entry;
/// null or empty statuses do not count. Object entries iterate in ascending
/// key order, and a group's own peers come before its nested groups, so the
/// resulting order is stable.
fn collect_uplink_peers(groups: &Map<String, Value>) -> Vec<String> {
    let mut peers = Vec::new();

    for group in groups.values() {
        if let Some(entries) = group.get("peers").and_then(Value::as_object) {
            for (peer, status) in entries {
                let established = status
                    .as_object()
                    .map_or(false, |s| s.contains_key("established"));
                if established {
                    peers.push(peer.clone());
                }
            }
        }

        if let Some(nested) = group.get("groups").and_then(Value::as_object) {
            peers.extend(collect_uplink_peers(nested));
        }
    }

    peers
}

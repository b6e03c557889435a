//! Importers for the vis-data topology feed
//!
//! A topology snapshot mixes several record shapes, distinguished only by
//! which fields are present: secondary-link records (`of`/`secondary`),
//! client-table entries (`label == "TT"`/`router`), and liveness records
//! (`primary`/`secondary`/`gateway`). Three independent importers each read
//! the slice of the feed they care about.

use crate::index::AddressIndex;
use crate::store::NodeStore;
use chrono::{DateTime, Utc};
use meshmap_core::{path, NodeId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Lenient view of one vis-data record
///
/// A record that fails to parse degrades to the all-absent view instead of
/// failing the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisRecord {
    /// Primary address a secondary-link record belongs to
    pub of: Option<String>,

    /// Secondary interface address on the same device
    pub secondary: Option<String>,

    /// Primary interface address of a liveness record
    pub primary: Option<String>,

    /// Gateway address; also matches client MACs, which is how pre-upgrade
    /// nodes that report nothing else still show up as alive
    pub gateway: Option<String>,

    /// Record type label; `"TT"` marks a client-table entry
    pub label: Option<String>,

    /// Address of the router a client-table entry hangs off
    pub router: Option<String>,
}

impl VisRecord {
    /// Parse a raw record, degrading to the empty view on mismatch
    fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Reconcile multi-interface nodes from secondary-link records
///
/// Some physical nodes expose several interface addresses but self-report
/// only one; link records pairing a primary with a secondary address on the
/// same device reveal the rest. Addresses are grouped strictly by each
/// record's stated primary — groups with different primaries never merge,
/// even when they share a secondary. For each group the first member in
/// ascending address order that resolves to a known node absorbs the whole
/// group into its interface list; groups resolving to no node are dropped.
pub fn import_mesh_interfaces(store: &mut NodeStore, vis_data: &[Value]) {
    let index = AddressIndex::build(store);

    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in vis_data.iter().map(VisRecord::from_value) {
        let (primary, secondary) = match (record.of, record.secondary) {
            (Some(primary), Some(secondary)) => (primary, secondary),
            _ => continue,
        };
        let members = groups.entry(primary.clone()).or_default();
        members.insert(primary);
        members.insert(secondary);
    }

    for (_, members) in groups {
        let owner = match members.iter().find_map(|address| index.resolve(address)) {
            Some(owner) => owner.clone(),
            None => continue,
        };
        let node = match store.get_mut(&owner) {
            Some(node) => node,
            None => continue,
        };

        let mut interfaces = known_interfaces(&node.nodeinfo);
        interfaces.extend(members);

        match node.nodeinfo.get_mut("network").and_then(Value::as_object_mut) {
            Some(network) => {
                let list: Vec<String> = interfaces.into_iter().collect();
                network.insert("mesh_interfaces".to_string(), json!(list));
            }
            None => debug!("node {} has no network section, skipping interface update", owner),
        }
    }
}

/// Interface addresses a node already claims for itself
///
/// Gathered from the flat list and the per-type lists under
/// `network.mesh.bat0.interfaces`; any of the four locations may be absent.
fn known_interfaces(nodeinfo: &Value) -> BTreeSet<String> {
    let mut interfaces = BTreeSet::new();

    if let Some(flat) = path::get_path(nodeinfo, &["network", "mesh_interfaces"]) {
        interfaces.extend(path::strings(flat).map(str::to_string));
    }

    for kind in ["wireless", "tunnel", "other"] {
        if let Some(list) =
            path::get_path(nodeinfo, &["network", "mesh", "bat0", "interfaces", kind])
        {
            interfaces.extend(path::strings(list).map(str::to_string));
        }
    }

    interfaces
}

/// Derive a fallback client count from client-table entries
///
/// Counts `label == "TT"` records per resolved router address and fills
/// `statistics.clients` only where the field is unset for this cycle. A
/// count already populated by the statistics importer — zero included —
/// stays untouched.
pub fn import_client_counts(store: &mut NodeStore, vis_data: &[Value]) {
    let index = AddressIndex::build(store);

    let mut counts: BTreeMap<NodeId, u64> = BTreeMap::new();
    for record in vis_data.iter().map(VisRecord::from_value) {
        if record.label.as_deref() != Some("TT") {
            continue;
        }
        let router = match record.router {
            Some(router) => router,
            None => continue,
        };
        if let Some(id) = index.resolve(&router) {
            *counts.entry(id.clone()).or_insert(0) += 1;
        }
    }

    for (id, count) in counts {
        if let Some(node) = store.get_mut(&id) {
            if node.statistics.clients.is_none() {
                node.statistics.clients = Some(count);
            }
        }
    }
}

/// Mark nodes online from their presence in the topology snapshot
///
/// Every record contributes exactly one address — `primary` if present,
/// else `secondary`, else `gateway` — into the set of active addresses.
/// Each active address that resolves through the index marks the owning
/// node online at `now`; unresolved addresses are skipped.
pub fn mark_online_from_vis(store: &mut NodeStore, vis_data: &[Value], now: DateTime<Utc>) {
    let index = AddressIndex::build(store);

    let mut active: BTreeSet<String> = BTreeSet::new();
    for record in vis_data.iter().map(VisRecord::from_value) {
        if let Some(primary) = record.primary {
            active.insert(primary);
        } else if let Some(secondary) = record.secondary {
            active.insert(secondary);
        } else if let Some(gateway) = record.gateway {
            active.insert(gateway);
        }
    }

    let mut marked = 0usize;
    for address in &active {
        if let Some(id) = index.resolve(address) {
            let id = id.clone();
            if let Some(node) = store.get_mut(&id) {
                node.mark_online(now);
                marked += 1;
            }
        }
    }

    debug!("marked {} nodes online from {} active addresses", marked, active.len());
}

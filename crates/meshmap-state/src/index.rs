//! Address index joining feeds by mesh interface address
//!
//! The statistics and vis-data feeds identify nodes by interface address
//! rather than node identifier; this index is the join key between them and
//! the store. It is derived from the store, rebuilt immediately before
//! every operation that resolves addresses, and never cached.

use crate::store::NodeStore;
use meshmap_core::{path, NodeId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ephemeral map from interface address to owning node identifier
///
/// When two nodes report the same address, the node processed later in
/// store order wins, so the greatest identifier owns the address. Index
/// membership is derived from node existence, never the other way around:
/// an address that resolves here always names a live record at build time.
#[derive(Debug, Clone, Default)]
pub struct AddressIndex {
    addresses: BTreeMap<String, NodeId>,
}

impl AddressIndex {
    /// Build the index from every node's self-reported interface lists
    pub fn build(store: &NodeStore) -> Self {
        let mut addresses = BTreeMap::new();

        for (id, record) in store.iter() {
            for address in interface_addresses(&record.nodeinfo) {
                addresses.insert(address.to_string(), id.clone());
            }
        }

        Self { addresses }
    }

    /// Resolve an address to the owning node identifier
    pub fn resolve(&self, address: &str) -> Option<&NodeId> {
        self.addresses.get(address)
    }

    /// Number of indexed addresses
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the index holds no addresses
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Collect every interface address a nodeinfo document reports
///
/// Two shapes occur in the wild: a flat `network.mesh_interfaces` list, and
/// per-type lists nested under `network.mesh.<group>.interfaces.<type>`.
/// Either or both may be absent; anything mis-shaped is skipped.
pub(crate) fn interface_addresses(nodeinfo: &Value) -> Vec<&str> {
    let mut found = Vec::new();

    if let Some(flat) = path::get_path(nodeinfo, &["network", "mesh_interfaces"]) {
        found.extend(path::strings(flat));
    }

    if let Some(groups) = path::get_path(nodeinfo, &["network", "mesh"]).and_then(Value::as_object) {
        for group in groups.values() {
            if let Some(interfaces) = group.get("interfaces").and_then(Value::as_object) {
                for list in interfaces.values() {
                    found.extend(path::strings(list));
                }
            }
        }
    }

    found
}

//! Importer for the self-reported nodeinfo feed

use crate::store::NodeStore;
use chrono::{DateTime, Utc};
use meshmap_core::{path, NodeId};
use serde_json::Value;
use tracing::debug;

/// Import a batch of raw nodeinfo documents
///
/// Every document carrying a string `node_id` creates or replaces that
/// node's self-reported metadata. The document is stored wholesale, never
/// deep-merged, and both status flags are cleared so later stages recompute
/// them from this cycle's feeds. With `assume_online` the node is marked
/// online at `now` right away.
///
/// This is the only operation that creates records; documents without a
/// usable identifier are skipped.
pub fn import_nodeinfo(
    store: &mut NodeStore,
    docs: &[Value],
    now: DateTime<Utc>,
    assume_online: bool,
) {
    let mut imported = 0usize;

    for doc in docs {
        let id = match path::get_str(doc, &["node_id"]) {
            Some(id) => id,
            None => {
                debug!("skipping nodeinfo document without node_id");
                continue;
            }
        };

        let node = store.upsert(NodeId::from(id));
        node.nodeinfo = doc.clone();
        node.flags.online = false;
        node.flags.uplink = false;

        if assume_online {
            node.mark_online(now);
        }
        imported += 1;
    }

    debug!("imported {} nodeinfo documents", imported);
}

//! # meshmap-state
//!
//! Node store and feed reconciliation logic for meshmap.
//!
//! This crate provides:
//! - The owned per-node record store with staleness pruning
//! - The address index joining feeds by mesh interface address
//! - Importers for the nodeinfo, statistics, and vis-data feeds
//! - The fixed-order update pipeline driving one collection cycle
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use meshmap_state::{FeedSet, NodeStore, StateConfig, UpdateCycle};
//! use serde_json::json;
//!
//! let mut store = NodeStore::new();
//! let now = Utc.with_ymd_and_hms(2015, 3, 14, 12, 0, 0).unwrap();
//!
//! let nodeinfo = vec![json!({
//!     "node_id": "c4e984dd8c04",
//!     "network": {"mesh_interfaces": ["c4:e9:84:dd:8c:04"]},
//! })];
//!
//! let cycle = UpdateCycle::new(now, StateConfig::default());
//! cycle.run(&mut store, &FeedSet { nodeinfo: &nodeinfo, ..FeedSet::default() });
//!
//! assert_eq!(store.len(), 1);
//! ```

use thiserror::Error;

pub mod config;
pub mod index;
pub mod nodeinfo;
pub mod pipeline;
pub mod statistics;
pub mod store;
pub mod vis;

// Re-export commonly used types
pub use config::StateConfig;
pub use index::AddressIndex;
pub use nodeinfo::import_nodeinfo;
pub use pipeline::{FeedSet, UpdateCycle};
pub use statistics::{import_statistics, reset_statistics};
pub use store::{NodeStore, StoreStats};
pub use vis::{import_client_counts, import_mesh_interfaces, mark_online_from_vis, VisRecord};

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur during state operations
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] meshmap_core::Error),
}

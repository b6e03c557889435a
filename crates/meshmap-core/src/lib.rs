//! # meshmap-core
//!
//! Core types and utilities for meshmap - a telemetry reconciler for
//! community mesh networks.
//!
//! This crate provides the foundational data structures shared by the other
//! meshmap components. It includes:
//!
//! - The per-node record model (status flags, statistics, sighting times)
//! - Fail-soft lookups into untrusted nested feed documents
//! - Error handling types and utilities

pub mod error;
pub mod node;
pub mod path;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::{Error, Result};
pub use node::{NodeFlags, NodeRecord, NodeStatistics};
pub use types::NodeId;

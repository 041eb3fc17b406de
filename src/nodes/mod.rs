//! Compute-node resolution.
//!
//! - [`machinefile`] - Machine-file parsing and the default resolver

pub mod machinefile;

pub use machinefile::{parse_machinefile, MachineFileResolver};

use crate::core::error::CombineResult;
use std::path::Path;

/// Ordered list of compute nodes, one per rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<String>,
}

impl NodeList {
    /// Wrap an ordered list of node names.
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    /// Node that ran `rank`.
    pub fn node(&self, rank: usize) -> Option<&str> {
        self.nodes.get(rank).map(String::as_str)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over node names in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }
}

/// Turns a machine file into the node list of a run.
pub trait NodeResolver {
    /// Resolve exactly `total_nodes` nodes from `machinefile`.
    fn resolve(&self, machinefile: &Path, total_nodes: usize) -> CombineResult<NodeList>;
}

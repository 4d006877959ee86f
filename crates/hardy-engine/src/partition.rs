//! Static assignment of nodes to workers.

use std::collections::HashMap;

use hardy_core::{ConfigError, NodeId, WorkerId};
use hardy_frame::Structure;

/// Disjoint node sets, one per worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    sets: Vec<Vec<NodeId>>,
}

impl Partition {
    /// Node sets indexed by worker. Some may be empty.
    pub fn sets(&self) -> &[Vec<NodeId>] {
        &self.sets
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.sets.len()
    }

    /// Owner of every node.
    pub fn owner_map(&self) -> HashMap<NodeId, WorkerId> {
        self.sets
            .iter()
            .enumerate()
            .flat_map(|(w, set)| set.iter().map(move |&id| (id, WorkerId(w as u32))))
            .collect()
    }
}

/// Deal nodes round-robin over `workers` sets, in declaration order.
///
/// # Errors
///
/// [`ConfigError::ZeroWorkers`] if `workers == 0`.
pub fn partition(structure: &Structure, workers: usize) -> Result<Partition, ConfigError> {
    if workers == 0 {
        return Err(ConfigError::ZeroWorkers);
    }
    let mut sets = vec![Vec::new(); workers];
    for (i, id) in structure.ids().enumerate() {
        sets[i % workers].push(id);
    }
    tracing::debug!(
        workers,
        sizes = ?sets.iter().map(Vec::len).collect::<Vec<_>>(),
        "nodes partitioned"
    );
    Ok(Partition { sets })
}

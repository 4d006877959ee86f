//! Error types for the Hardy solver, organized by subsystem:
//! parsing, frame construction, solver configuration, and solving.

use thiserror::Error;

use crate::id::{EndIndex, NodeId, WorkerId};

/// The structure description is not well formed (the malformed-input
/// condition). Raised before any analysis starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token could not be interpreted as the field expected at its position.
    #[error("malformed token '{token}' at position {position}: {reason}")]
    Malformed {
        /// Zero-based token position in the input.
        position: usize,
        /// The offending token.
        token: String,
        /// What the parser expected.
        reason: String,
    },
    /// The input ended while a field was still expected.
    #[error("unexpected end of input at position {position}: expected {expected}")]
    UnexpectedEof {
        /// Zero-based position of the missing token.
        position: usize,
        /// Description of the missing field.
        expected: &'static str,
    },
    /// Tokens remain after the declared number of end records.
    #[error("trailing token '{token}' at position {position}")]
    TrailingInput {
        /// Zero-based position of the first surplus token.
        position: usize,
        /// The first surplus token.
        token: String,
    },
}

/// Errors detected while assembling a structure from node and member specs.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuildError {
    /// A member names a node id that was never declared.
    #[error("member {member} references unknown node {node}")]
    UnreachableNode {
        /// The undeclared node id.
        node: NodeId,
        /// Zero-based index of the member record.
        member: usize,
    },
    /// The same node id was declared twice.
    #[error("node {node} declared more than once")]
    DuplicateNode {
        /// The repeated node id.
        node: NodeId,
    },
    /// A distribution factor or fixed-end moment is NaN or infinite.
    #[error("member {member}: {field} must be finite, got {value}")]
    NonFinite {
        /// Zero-based index of the member record.
        member: usize,
        /// Which value was rejected.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Errors detected by solver configuration validation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A concurrent run was requested with zero workers.
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    /// The relaxation tolerance is NaN, infinite, or not positive.
    #[error("tolerance must be finite and positive, got {value}")]
    InvalidTolerance {
        /// The invalid value.
        value: f64,
    },
    /// The divergence bound is zero, so no pass could ever run.
    #[error("max_passes must be at least 1")]
    ZeroMaxPasses,
}

/// Errors from a sequential or concurrent solve.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SolveError {
    /// The solver configuration failed validation.
    #[error("invalid solver configuration: {0}")]
    Config(#[from] ConfigError),
    /// The pass bound was exceeded without reaching quiescence.
    ///
    /// Usually means distribution factors at some joint do not sum to 1
    /// (for example a joint whose raw factors summed to 0).
    #[error("no convergence after {passes} passes")]
    Divergence {
        /// Passes completed by the furthest-ahead worker (or sweeps, for
        /// the sequential solver) when the bound tripped.
        passes: u64,
    },
    /// Every worker disconnected from the detector before termination.
    #[error("all workers disconnected before convergence")]
    WorkerLost,
    /// A worker thread panicked.
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// The worker that panicked.
        worker: WorkerId,
    },
    /// An update addressed an end that its node does not have.
    #[error("update routed to missing end {end} of node {node}")]
    Misrouted {
        /// Receiving node.
        node: NodeId,
        /// The out-of-range end index.
        end: EndIndex,
    },
    /// A worker or detector thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    ThreadSpawnFailed {
        /// Which thread failed and why.
        reason: String,
    },
}

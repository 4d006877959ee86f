//! Moment distribution solvers for Hardy.
//!
//! Two solvers share one configuration and one relaxation step
//! ([`Node::relax`](hardy_frame::Node::relax)):
//!
//! - [`SequentialSolver`]: deterministic single-threaded sweeps; the
//!   reference result.
//! - [`ConcurrentSolver`]: nodes partitioned over a pool of worker
//!   threads that exchange carry-overs through per-node mailboxes, with
//!   a separate detector thread confirming global quiescence.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod concurrent;
pub mod config;
pub mod context;
pub mod detector;
pub mod mailbox;
pub mod metrics;
pub mod partition;
pub mod sequential;
pub mod worker;

pub use concurrent::{ConcurrentSolver, Solved};
pub use config::{SolverConfig, MAX_WORKERS};
pub use context::RunContext;
pub use detector::{
    run_detector, Outcome, PassReport, QuiescenceDetector, QuiescenceProbe, Step, WorkerEvent,
};
pub use mailbox::{Ledger, Mailbox, Router};
pub use metrics::SolveReport;
pub use partition::{partition, Partition};
pub use sequential::SequentialSolver;
pub use worker::{Worker, WorkerOutput, WorkerStats};

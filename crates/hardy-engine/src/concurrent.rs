//! Concurrent solver: partition, spawn, detect, join, reassemble.
//!
//! # Threads
//!
//! ```text
//! caller ── spawns ──► hardy-detector   (blocks on the report channel)
//!        ── spawns ──► hardy-worker-{i} (owns its nodes, K threads)
//!        ── joins detector, then every worker
//! ```
//!
//! The detector is the only thread that decides the run is over; it sets
//! the stop flag and the workers exit at the top of their next pass.
//! Each worker returns its nodes through its join handle, and the caller
//! reassembles them in declaration order.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Sender;

use hardy_core::{NodeId, SolveError, WorkerId};
use hardy_frame::{Node, Structure};

use crate::config::SolverConfig;
use crate::context::RunContext;
use crate::detector::{run_detector, Outcome, WorkerEvent};
use crate::mailbox::{Mailbox, Router};
use crate::metrics::SolveReport;
use crate::partition::partition;
use crate::worker::{Worker, WorkerOutput};

/// A solved structure and the run's metrics.
#[derive(Clone, Debug)]
pub struct Solved {
    /// The relaxed structure, in its original declaration order.
    pub structure: Structure,
    /// Counters and timing.
    pub report: SolveReport,
}

/// Asynchronous message-passing moment distribution.
#[derive(Clone, Debug, Default)]
pub struct ConcurrentSolver {
    config: SolverConfig,
}

impl ConcurrentSolver {
    /// Create a solver.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The solver's configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Relax `structure` across a pool of worker threads.
    ///
    /// Every call builds its own run context; independent solves may run
    /// at the same time.
    ///
    /// # Errors
    ///
    /// - [`SolveError::Config`] if the configuration is invalid.
    /// - [`SolveError::Divergence`] if a worker does work in more than
    ///   `max_passes` passes.
    /// - [`SolveError::Misrouted`] if a carry-over addresses a missing end.
    /// - [`SolveError::WorkerPanicked`] / [`SolveError::WorkerLost`] if a
    ///   worker dies.
    /// - [`SolveError::ThreadSpawnFailed`] if a thread cannot be spawned.
    pub fn solve(&self, structure: Structure) -> Result<Solved, SolveError> {
        self.config.validate()?;
        let workers = self.config.resolved_worker_count();
        let started = Instant::now();

        let order: Vec<NodeId> = structure.ids().collect();
        let plan = partition(&structure, workers)?;
        let owners = plan.owner_map();
        let (router, mailboxes) = Router::new(order.iter().copied(), workers);
        let ctx = Arc::new(RunContext::new(
            router,
            workers,
            self.config.tolerance,
            self.config.max_passes,
        ));

        tracing::info!(workers, nodes = order.len(), "concurrent solve started");

        let mut cells: Vec<Vec<(Node, Mailbox)>> = (0..workers).map(|_| Vec::new()).collect();
        for (node, mailbox) in structure.into_nodes().into_iter().zip(mailboxes) {
            let owner = owners.get(&node.id()).map_or(0, |w| w.get());
            cells[owner].push((node, mailbox));
        }

        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let detector = {
            let ctx = Arc::clone(&ctx);
            thread::Builder::new()
                .name("hardy-detector".into())
                .spawn(move || run_detector(&ctx, &events_rx))
                .map_err(|e| SolveError::ThreadSpawnFailed {
                    reason: format!("hardy-detector: {e}"),
                })?
        };

        let handles = match spawn_workers(cells, &ctx, &events_tx) {
            Ok(handles) => handles,
            Err((err, spawned)) => {
                ctx.stop();
                drop(events_tx);
                for (_, handle) in spawned {
                    let _ = handle.join();
                }
                let _ = detector.join();
                return Err(err);
            }
        };
        // Workers hold the only remaining senders.
        drop(events_tx);

        let outcome = detector.join().unwrap_or_else(|_| {
            ctx.stop();
            tracing::error!("detector thread panicked");
            Outcome::Abandoned
        });

        let mut outputs = Vec::with_capacity(handles.len());
        let mut panicked = None;
        for (worker, handle) in handles {
            match handle.join() {
                Ok(output) => outputs.push(output),
                Err(_) => {
                    panicked.get_or_insert(worker);
                }
            }
        }

        let rounds = outcome.into_result()?;
        if let Some(worker) = panicked {
            return Err(SolveError::WorkerPanicked { worker });
        }

        let mut report = SolveReport {
            workers,
            detector_rounds: rounds,
            ..SolveReport::default()
        };
        for out in &outputs {
            report.passes = report.passes.max(out.stats.passes);
            report.total_passes += out.stats.passes;
            report.updates_sent += out.stats.updates_sent;
            report.updates_applied += out.stats.updates_applied;
            report.redistributions += out.stats.redistributions;
        }
        let structure = Structure::reassemble(&order, outputs.into_iter().flat_map(|o| o.nodes));
        report.elapsed_us = started.elapsed().as_micros() as u64;

        tracing::info!(
            workers,
            passes = report.passes,
            updates = report.updates_sent,
            rounds,
            elapsed_us = report.elapsed_us,
            "concurrent solve finished"
        );
        Ok(Solved { structure, report })
    }
}

type WorkerHandles = Vec<(WorkerId, JoinHandle<WorkerOutput>)>;

/// Spawn one named thread per cell set. On failure, returns the error
/// together with the handles already spawned.
fn spawn_workers(
    cells: Vec<Vec<(Node, Mailbox)>>,
    ctx: &Arc<RunContext>,
    events: &Sender<WorkerEvent>,
) -> Result<WorkerHandles, (SolveError, WorkerHandles)> {
    let mut handles = Vec::with_capacity(cells.len());
    for (i, owned) in cells.into_iter().enumerate() {
        let id = WorkerId(i as u32);
        let worker = Worker::new(id, owned, Arc::clone(ctx), events.clone());
        let spawned = thread::Builder::new()
            .name(format!("hardy-worker-{i}"))
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => handles.push((id, handle)),
            Err(e) => {
                let err = SolveError::ThreadSpawnFailed {
                    reason: format!("hardy-worker-{i}: {e}"),
                };
                return Err((err, handles));
            }
        }
    }
    Ok(handles)
}

// Compile-time assertion: workers and their output must move across threads.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<Worker>();
    assert::<WorkerOutput>();
};

//! Deterministic single-threaded reference solver.
//!
//! Walks the structure in declaration order, one sweep at a time. Each
//! node first applies the carry-overs queued for it (FIFO, the same
//! order a mailbox delivers them), then relaxes. Carry-overs are queued
//! to their partner's local queue, so a node later in the sweep sees
//! them in the same sweep and an earlier node sees them in the next.
//!
//! The result is the oracle the concurrent solver is checked against.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use hardy_core::{NodeId, SolveError, Update};
use hardy_frame::Structure;

use crate::config::SolverConfig;
use crate::metrics::SolveReport;

/// Single-threaded moment distribution.
#[derive(Clone, Debug, Default)]
pub struct SequentialSolver {
    config: SolverConfig,
}

impl SequentialSolver {
    /// Create a solver. `worker_count` in `config` is ignored.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The solver's configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Relax `structure` in place until no joint redistributes.
    ///
    /// # Errors
    ///
    /// - [`SolveError::Config`] if the configuration is invalid.
    /// - [`SolveError::Divergence`] if `max_passes` sweeps complete and
    ///   some joint still redistributes.
    /// - [`SolveError::Misrouted`] if a carry-over addresses an end or a
    ///   node that does not exist.
    pub fn solve(&self, structure: &mut Structure) -> Result<SolveReport, SolveError> {
        self.config.validate()?;
        let started = Instant::now();
        let tolerance = self.config.tolerance;

        let position: HashMap<NodeId, usize> = structure
            .ids()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let mut queues: Vec<VecDeque<Update>> = vec![VecDeque::new(); structure.len()];
        let mut report = SolveReport {
            workers: 1,
            ..SolveReport::default()
        };

        tracing::info!(nodes = structure.len(), "sequential solve started");

        loop {
            report.passes += 1;
            let mut redistributed = false;

            for i in 0..queues.len() {
                let Some(node) = structure.node_at_mut(i) else {
                    continue;
                };
                while let Some(update) = queues[i].pop_front() {
                    node.apply(update)?;
                    report.updates_applied += 1;
                }
                let relaxation = node.relax(tolerance, |to, update| {
                    let j = *position.get(&to).ok_or(SolveError::Misrouted {
                        node: to,
                        end: update.end,
                    })?;
                    queues[j].push_back(update);
                    report.updates_sent += 1;
                    Ok::<(), SolveError>(())
                })?;
                if relaxation.redistributed() {
                    redistributed = true;
                    report.redistributions += 1;
                }
            }

            if !redistributed && queues.iter().all(VecDeque::is_empty) {
                break;
            }
            if report.passes >= self.config.max_passes {
                tracing::warn!(
                    passes = report.passes,
                    max_unbalance = structure.max_unbalance(),
                    "sequential solve did not converge"
                );
                return Err(SolveError::Divergence {
                    passes: report.passes,
                });
            }
        }

        report.total_passes = report.passes;
        report.elapsed_us = started.elapsed().as_micros() as u64;
        tracing::info!(
            passes = report.passes,
            updates = report.updates_sent,
            elapsed_us = report.elapsed_us,
            "sequential solve finished"
        );
        Ok(report)
    }
}

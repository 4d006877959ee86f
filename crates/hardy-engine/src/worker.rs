//! Worker relaxation loop.
//!
//! A worker owns its nodes outright (they are moved into its thread) and
//! the receiving half of each node's mailbox. Every pass it drains and
//! relaxes each node in turn, routes carry-overs through the shared
//! [`Router`](crate::mailbox::Router), settles the in-flight ledger, and
//! reports to the detector. It exits only when the stop flag is set, and
//! hands its nodes back through the thread's join handle.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;

use hardy_core::{SolveError, WorkerId};
use hardy_frame::{Node, Relaxation};

use crate::context::RunContext;
use crate::detector::{PassReport, WorkerEvent};
use crate::mailbox::Mailbox;

/// Per-worker counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Passes completed.
    pub passes: u64,
    /// Passes that drained, sent, or redistributed anything.
    pub active_passes: u64,
    /// Updates sent.
    pub updates_sent: u64,
    /// Updates drained and applied.
    pub updates_applied: u64,
    /// Node relaxations that redistributed.
    pub redistributions: u64,
}

/// What a worker thread returns when it exits.
#[derive(Debug)]
pub struct WorkerOutput {
    /// The worker.
    pub worker: WorkerId,
    /// The nodes it owned, in assignment order.
    pub nodes: Vec<Node>,
    /// Its counters.
    pub stats: WorkerStats,
}

/// Sends [`WorkerEvent::Panicked`] if dropped during unwinding.
struct ExitGuard {
    worker: WorkerId,
    events: Sender<WorkerEvent>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            let _ = self.events.send(WorkerEvent::Panicked {
                worker: self.worker,
            });
        }
    }
}

/// One worker of a concurrent run.
pub struct Worker {
    id: WorkerId,
    cells: Vec<(Node, Mailbox)>,
    ctx: Arc<RunContext>,
    events: Sender<WorkerEvent>,
    holds_credit: bool,
    stats: WorkerStats,
}

impl Worker {
    /// Create a worker owning `cells`.
    ///
    /// The worker starts holding its ledger credit; the context's ledger
    /// must have been created with one credit per worker.
    pub fn new(
        id: WorkerId,
        cells: Vec<(Node, Mailbox)>,
        ctx: Arc<RunContext>,
        events: Sender<WorkerEvent>,
    ) -> Self {
        Self {
            id,
            cells,
            ctx,
            events,
            holds_credit: true,
            stats: WorkerStats::default(),
        }
    }

    /// Run passes until the stop flag is observed.
    pub fn run(mut self) -> WorkerOutput {
        let _guard = ExitGuard {
            worker: self.id,
            events: self.events.clone(),
        };
        tracing::debug!(worker = %self.id, nodes = self.cells.len(), "worker started");

        while !self.ctx.is_stopped() {
            match self.pass() {
                Ok(report) => {
                    let idle = !report.is_active();
                    tracing::trace!(
                        worker = %self.id,
                        pass = report.pass,
                        drained = report.drained,
                        sent = report.sent,
                        "pass complete"
                    );
                    // The detector may already have hung up after a stop.
                    let _ = self.events.send(WorkerEvent::Pass(report));
                    if idle {
                        thread::yield_now();
                    }
                }
                Err(error) => {
                    if self.ctx.is_stopped() {
                        // Mailboxes close as other workers exit; not a fault.
                        break;
                    }
                    self.ctx.stop();
                    let _ = self.events.send(WorkerEvent::Failed {
                        worker: self.id,
                        error,
                    });
                    break;
                }
            }
        }

        tracing::debug!(worker = %self.id, passes = self.stats.passes, "worker stopped");
        WorkerOutput {
            worker: self.id,
            nodes: self.cells.into_iter().map(|(node, _)| node).collect(),
            stats: self.stats,
        }
    }

    /// One drain-and-relax sweep over every owned node.
    fn pass(&mut self) -> Result<PassReport, SolveError> {
        let router = self.ctx.router();
        let tolerance = self.ctx.tolerance();
        let mut drained = 0;
        let mut sent = 0;
        let mut redistributed = false;

        for (node, mailbox) in self.cells.iter_mut() {
            drained += mailbox.drain(node)?;
            let relaxation = node.relax(tolerance, |to, update| router.send(to, update))?;
            if let Relaxation::Redistributed { sent: n, .. } = relaxation {
                sent += n;
                redistributed = true;
                self.stats.redistributions += 1;
            }
        }

        // Settlement order matters: take the credit back before
        // releasing drained units so the ledger never dips to zero
        // while this worker still has work in hand.
        let ledger = router.ledger();
        if redistributed && !self.holds_credit {
            ledger.acquire(1);
            self.holds_credit = true;
        }
        ledger.release(drained);
        if !redistributed && self.holds_credit {
            ledger.release(1);
            self.holds_credit = false;
        }

        self.stats.passes += 1;
        if drained > 0 || sent > 0 || redistributed {
            self.stats.active_passes += 1;
        }
        self.stats.updates_sent += sent as u64;
        self.stats.updates_applied += drained as u64;
        Ok(PassReport {
            worker: self.id,
            pass: self.stats.passes,
            active_passes: self.stats.active_passes,
            drained,
            sent,
            redistributed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::Router;
    use hardy_frame::Structure;
    use hardy_test_utils::three_node_chain;

    /// A single worker owning every node of `s`.
    fn solo(s: Structure) -> (Worker, Arc<RunContext>, crossbeam_channel::Receiver<WorkerEvent>) {
        let (router, boxes) = Router::new(s.ids(), 1);
        let ctx = Arc::new(RunContext::new(router, 1, 0.1, 1_000));
        let (tx, rx) = crossbeam_channel::unbounded();
        let cells = s.into_nodes().into_iter().zip(boxes).collect();
        (Worker::new(WorkerId(0), cells, Arc::clone(&ctx), tx), ctx, rx)
    }

    #[test]
    fn ledger_tracks_work_until_idle() {
        let (mut worker, ctx, _rx) = solo(three_node_chain());
        let ledger = ctx.router().ledger();

        let first = worker.pass().unwrap();
        assert!(first.redistributed);
        assert_eq!(first.pass, 1);
        // Credit still held, plus every send not yet drained.
        assert_eq!(ledger.current(), 1 + first.sent - first.drained);

        let mut last = first;
        for _ in 0..1_000 {
            last = worker.pass().unwrap();
            if !last.is_active() {
                break;
            }
        }
        assert!(!last.is_active());
        assert_eq!(ledger.current(), 0);
        assert!(ctx.router().all_empty());
        assert_eq!(worker.stats.updates_sent, worker.stats.updates_applied);

        // Further idle passes advance the pass number but not the work count.
        let active = last.active_passes;
        for _ in 0..5 {
            let again = worker.pass().unwrap();
            assert!(!again.is_active());
            assert_eq!(again.active_passes, active);
        }
        assert_eq!(worker.stats.active_passes, active);
        assert_eq!(worker.stats.passes, active + 6);
    }

    #[test]
    fn stopped_worker_returns_nodes_untouched() {
        let s = three_node_chain();
        let before = s.clone();
        let (worker, ctx, rx) = solo(s);
        ctx.stop();
        let out = worker.run();
        assert_eq!(out.stats.passes, 0);
        assert_eq!(Structure::reassemble(&before.ids().collect::<Vec<_>>(), out.nodes), before);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn misrouted_update_fails_the_run() {
        let (worker, ctx, rx) = solo(three_node_chain());
        ctx.router()
            .send(
                hardy_core::NodeId(1),
                hardy_core::Update::new(hardy_core::EndIndex(9), 1.0),
            )
            .unwrap();
        let out = worker.run();
        assert!(ctx.is_stopped());
        assert_eq!(out.stats.passes, 0);
        let failed = rx.try_iter().find_map(|e| match e {
            WorkerEvent::Failed { error, .. } => Some(error),
            _ => None,
        });
        assert!(matches!(failed, Some(SolveError::Misrouted { .. })));
    }

    #[test]
    fn exit_guard_reports_panic() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = thread::spawn(move || {
            let _guard = ExitGuard {
                worker: WorkerId(3),
                events: tx,
            };
            panic!("boom");
        });
        assert!(handle.join().is_err());
        assert_eq!(
            rx.try_recv(),
            Ok(WorkerEvent::Panicked {
                worker: WorkerId(3)
            })
        );
    }

    #[test]
    fn exit_guard_silent_on_normal_exit() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(ExitGuard {
            worker: WorkerId(0),
            events: tx,
        });
        assert!(rx.try_recv().is_err());
    }
}

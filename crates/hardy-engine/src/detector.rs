//! Termination detection for the concurrent solver.
//!
//! Workers never decide to stop on local state. After every pass each
//! worker sends a [`PassReport`]; the detector folds them into rounds and
//! declares quiescence only after a two-phase handshake:
//!
//! 1. **Quorum.** A round completes once every worker has reported at
//!    least once since the round started.
//! 2. **Confirmation.** At quorum the round is clean iff no report in it
//!    carried activity, the in-flight ledger reads zero, and every
//!    mailbox is empty. A dirty round resets the count. Two consecutive
//!    clean rounds terminate the run.
//!
//! The ledger alone already rules out a false positive (see
//! [`mailbox`](crate::mailbox)); the report and mailbox checks are
//! independent witnesses of the same condition.
//!
//! [`QuiescenceDetector`] is the pure state machine; [`run_detector`]
//! drives it from the report channel on the detector thread.

use crossbeam_channel::Receiver;

use hardy_core::{SolveError, WorkerId};

use crate::context::RunContext;

/// Number of consecutive clean rounds required to terminate.
pub const REQUIRED_CONFIRMATIONS: u32 = 2;

/// Summary of one worker pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassReport {
    /// Reporting worker.
    pub worker: WorkerId,
    /// 1-based pass number of this worker.
    pub pass: u64,
    /// Passes so far, this one included, that did any work. Idle passes
    /// do not count toward the divergence bound.
    pub active_passes: u64,
    /// Updates drained and applied this pass.
    pub drained: usize,
    /// Updates sent this pass.
    pub sent: usize,
    /// Whether any owned node redistributed this pass.
    pub redistributed: bool,
}

impl PassReport {
    /// Whether the pass did any work.
    pub fn is_active(&self) -> bool {
        self.drained > 0 || self.sent > 0 || self.redistributed
    }
}

/// Message from a worker to the detector.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    /// A pass completed.
    Pass(PassReport),
    /// The worker hit an error and is exiting.
    Failed {
        /// The failing worker.
        worker: WorkerId,
        /// What went wrong.
        error: SolveError,
    },
    /// The worker thread is unwinding from a panic.
    Panicked {
        /// The panicking worker.
        worker: WorkerId,
    },
}

/// Global observations the detector needs at each round boundary.
pub trait QuiescenceProbe {
    /// Current in-flight ledger value.
    fn in_flight(&self) -> usize;

    /// Whether every mailbox is empty.
    fn mailboxes_empty(&self) -> bool;
}

impl QuiescenceProbe for RunContext {
    fn in_flight(&self) -> usize {
        self.router().ledger().current()
    }

    fn mailboxes_empty(&self) -> bool {
        self.router().all_empty()
    }
}

/// What the detector decided after folding one report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Keep going.
    Continue,
    /// The run is quiescent; stop it.
    Quiescent {
        /// Rounds completed, including the confirming ones.
        rounds: u64,
    },
    /// A worker exceeded the pass bound.
    Diverged {
        /// The offending count of active passes.
        passes: u64,
    },
}

/// Round-based quiescence state machine.
#[derive(Clone, Debug)]
pub struct QuiescenceDetector {
    max_passes: u64,
    seen: Vec<bool>,
    seen_count: usize,
    round_active: bool,
    confirmations: u32,
    rounds: u64,
}

impl QuiescenceDetector {
    /// Create a detector for `workers` workers.
    pub fn new(workers: usize, max_passes: u64) -> Self {
        Self {
            max_passes,
            seen: vec![false; workers],
            seen_count: 0,
            round_active: false,
            confirmations: 0,
            rounds: 0,
        }
    }

    /// Rounds completed so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Consecutive clean rounds so far.
    pub fn confirmations(&self) -> u32 {
        self.confirmations
    }

    /// Fold one pass report; probe the run if it completes a round.
    pub fn record(&mut self, report: &PassReport, probe: &impl QuiescenceProbe) -> Step {
        if report.active_passes > self.max_passes {
            return Step::Diverged {
                passes: report.active_passes,
            };
        }
        let Some(slot) = self.seen.get_mut(report.worker.get()) else {
            tracing::debug!(worker = %report.worker, "report from unknown worker ignored");
            return Step::Continue;
        };
        if !*slot {
            *slot = true;
            self.seen_count += 1;
        }
        self.round_active |= report.is_active();

        if self.seen_count < self.seen.len() {
            return Step::Continue;
        }

        self.rounds += 1;
        // Short-circuit: the ledger is one atomic load; the mailbox scan
        // touches every channel.
        let clean = !self.round_active && probe.in_flight() == 0 && probe.mailboxes_empty();
        if clean {
            self.confirmations += 1;
        } else {
            self.confirmations = 0;
        }
        tracing::trace!(
            round = self.rounds,
            clean,
            confirmations = self.confirmations,
            "detector round complete"
        );

        self.seen.iter_mut().for_each(|s| *s = false);
        self.seen_count = 0;
        self.round_active = false;

        if self.confirmations >= REQUIRED_CONFIRMATIONS {
            Step::Quiescent {
                rounds: self.rounds,
            }
        } else {
            Step::Continue
        }
    }
}

/// How a detector run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Quiescence confirmed.
    Converged {
        /// Rounds completed.
        rounds: u64,
    },
    /// A worker exceeded the pass bound.
    Diverged {
        /// The offending pass number.
        passes: u64,
    },
    /// A worker reported an error or panicked.
    Failed(SolveError),
    /// Every worker disconnected without a terminal report.
    Abandoned,
}

impl Outcome {
    /// Map the outcome to the solve result: rounds on success.
    pub fn into_result(self) -> Result<u64, SolveError> {
        match self {
            Self::Converged { rounds } => Ok(rounds),
            Self::Diverged { passes } => Err(SolveError::Divergence { passes }),
            Self::Failed(err) => Err(err),
            Self::Abandoned => Err(SolveError::WorkerLost),
        }
    }
}

/// Detector thread body: consume reports until the run ends.
///
/// Blocks on the report channel; sets the stop flag on every outcome.
pub fn run_detector(ctx: &RunContext, events: &Receiver<WorkerEvent>) -> Outcome {
    let mut detector = QuiescenceDetector::new(ctx.workers(), ctx.max_passes());
    let outcome = loop {
        let event = match events.recv() {
            Ok(event) => event,
            Err(_) => break Outcome::Abandoned,
        };
        match event {
            WorkerEvent::Pass(report) => match detector.record(&report, ctx) {
                Step::Continue => {}
                Step::Quiescent { rounds } => break Outcome::Converged { rounds },
                Step::Diverged { passes } => break Outcome::Diverged { passes },
            },
            WorkerEvent::Failed { worker, error } => {
                tracing::debug!(%worker, %error, "worker failed");
                break Outcome::Failed(error);
            }
            WorkerEvent::Panicked { worker } => {
                break Outcome::Failed(SolveError::WorkerPanicked { worker });
            }
        }
    };
    ctx.stop();
    match &outcome {
        Outcome::Converged { rounds } => tracing::debug!(rounds, "quiescence confirmed"),
        Outcome::Diverged { passes } => tracing::warn!(passes, "pass bound exceeded"),
        Outcome::Failed(err) => tracing::warn!(error = %err, "run failed"),
        Outcome::Abandoned => tracing::warn!("all workers disconnected"),
    }
    outcome
}

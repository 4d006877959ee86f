//! Per-run metrics for both solvers.
//!
//! [`SolveReport`] summarizes one solve: how much relaxation work was
//! done, how it was spread over workers, and how long it took.

/// Counters and timing collected during one solve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveReport {
    /// Worker threads used. 1 for the sequential solver.
    pub workers: usize,
    /// Sweeps for the sequential solver; for the concurrent solver the
    /// highest pass count reached by any worker.
    pub passes: u64,
    /// Passes summed over all workers.
    pub total_passes: u64,
    /// Carry-over updates enqueued.
    pub updates_sent: u64,
    /// Carry-over updates drained and applied.
    pub updates_applied: u64,
    /// Node relaxations that redistributed an unbalance.
    pub redistributions: u64,
    /// Report rounds completed by the termination detector.
    pub detector_rounds: u64,
    /// Wall-clock time for the solve, in microseconds.
    pub elapsed_us: u64,
}

impl SolveReport {
    /// Every sent update was applied.
    pub fn is_drained(&self) -> bool {
        self.updates_sent == self.updates_applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_is_zero() {
        let r = SolveReport::default();
        assert_eq!(r.workers, 0);
        assert_eq!(r.passes, 0);
        assert_eq!(r.updates_sent, 0);
        assert_eq!(r.detector_rounds, 0);
        assert!(r.is_drained());
    }

    #[test]
    fn drained_compares_sent_and_applied() {
        let r = SolveReport {
            updates_sent: 10,
            updates_applied: 9,
            ..SolveReport::default()
        };
        assert!(!r.is_drained());
    }
}

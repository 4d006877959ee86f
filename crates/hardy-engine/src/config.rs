//! Solver configuration and validation.
//!
//! [`SolverConfig`] is shared by the sequential and concurrent solvers.
//! [`validate()`](SolverConfig::validate) checks it before any thread is
//! spawned or any moment is touched.

use hardy_core::{ConfigError, DEFAULT_MAX_PASSES, TOLERANCE};

/// Upper bound applied to explicit and auto-detected worker counts.
pub const MAX_WORKERS: usize = 64;

/// Configuration for a solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Number of worker threads for the concurrent solver. `None` =
    /// auto-detect from `available_parallelism`. Ignored by the
    /// sequential solver.
    pub worker_count: Option<usize>,
    /// Residual unbalance below which a joint is balanced. Default: 0.1.
    pub tolerance: f64,
    /// Passes (sweeps, for the sequential solver) before the run is
    /// declared divergent. Default: 1,000,000.
    pub max_passes: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            tolerance: TOLERANCE,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl SolverConfig {
    /// Set an explicit worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    /// Set the relaxation tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the divergence bound.
    pub fn with_max_passes(mut self, max_passes: u64) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Check all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        if self.max_passes == 0 {
            return Err(ConfigError::ZeroMaxPasses);
        }
        Ok(())
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Values are clamped to `[1, MAX_WORKERS]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, MAX_WORKERS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, MAX_WORKERS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = SolverConfig::default().with_workers(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWorkers));
    }

    #[test]
    fn non_positive_tolerance_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = SolverConfig::default().with_tolerance(bad);
            assert!(
                matches!(cfg.validate(), Err(ConfigError::InvalidTolerance { .. })),
                "tolerance {bad} should be rejected"
            );
        }
    }

    #[test]
    fn zero_max_passes_rejected() {
        let cfg = SolverConfig::default().with_max_passes(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroMaxPasses));
    }

    #[test]
    fn resolved_worker_count_clamps_large() {
        let cfg = SolverConfig::default().with_workers(500);
        assert_eq!(cfg.resolved_worker_count(), MAX_WORKERS);
    }

    #[test]
    fn resolved_worker_count_auto_in_range() {
        let count = SolverConfig::default().resolved_worker_count();
        assert!((1..=MAX_WORKERS).contains(&count), "auto count {count}");
    }
}

//! Shared state of one concurrent run.
//!
//! A [`RunContext`] is created per solve and shared by `Arc` between the
//! workers and the detector. Nothing in it is global, so independent
//! solves in one process never interfere.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::mailbox::Router;

/// Stop flag, router, and run parameters for one concurrent solve.
#[derive(Debug)]
pub struct RunContext {
    stop: AtomicBool,
    router: Router,
    workers: usize,
    tolerance: f64,
    max_passes: u64,
}

impl RunContext {
    /// Create a context for `workers` workers.
    pub fn new(router: Router, workers: usize, tolerance: f64, max_passes: u64) -> Self {
        Self {
            stop: AtomicBool::new(false),
            router,
            workers,
            tolerance,
            max_passes,
        }
    }

    /// Ask every worker to exit at the top of its next pass. Idempotent.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// The mailbox router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Number of workers in the run.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Relaxation tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Pass bound after which the run is divergent.
    pub fn max_passes(&self) -> u64 {
        self.max_passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardy_core::NodeId;

    #[test]
    fn stop_is_idempotent() {
        let (router, _boxes) = Router::new([NodeId(0)], 1);
        let ctx = RunContext::new(router, 1, 0.1, 10);
        assert!(!ctx.is_stopped());
        ctx.stop();
        ctx.stop();
        assert!(ctx.is_stopped());
    }

    #[test]
    fn context_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RunContext>();
    }
}

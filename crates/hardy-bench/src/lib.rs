//! Benchmark profiles for the Hardy solvers.
//!
//! - [`reference_profile`]: 2,000-joint random frame
//! - [`stress_profile`]: 20,000-joint random frame
//! - [`beam_profile`]: 500-span continuous beam

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hardy_engine::SolverConfig;
use hardy_frame::Structure;
use hardy_test_utils::{continuous_beam, random_frame, FrameShape};

/// Seed shared by every profile.
pub const PROFILE_SEED: u64 = 0x4a_5244_59;

/// 2,000 joints, 1,000 extra members, a quarter of joints fixed.
pub fn reference_profile() -> Structure {
    random_frame(PROFILE_SEED, FrameShape::large(2_000))
}

/// 20,000 joints for scaling runs.
pub fn stress_profile() -> Structure {
    random_frame(PROFILE_SEED, FrameShape::large(20_000))
}

/// A 500-span beam: long dependency chains, little parallel slack.
pub fn beam_profile() -> Structure {
    continuous_beam(500, 150.0)
}

/// Solver configuration used by the benchmarks: default tolerance and
/// an explicit worker count.
pub fn bench_config(workers: usize) -> SolverConfig {
    SolverConfig::default().with_workers(workers)
}

//! Command-line driver: solve one structure file with both solvers,
//! time them, and report whether they agree.
//!
//! The binary (`hardy`) is a thin wrapper around [`execute`] and
//! [`render`]; exit codes come from [`CliError::exit_code`] and
//! [`RunSummary::exit_code`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use hardy::engine::{ConcurrentSolver, SequentialSolver, SolveReport, SolverConfig};
use hardy::frame::{compare, load_structure, Comparison, LoadError, Structure};
use hardy::types::{SolveError, DEFAULT_MAX_PASSES, TOLERANCE, TOLERANCE_CHECK};

/// Hardy moment distribution
///
/// Solves a frame with the sequential reference solver and the concurrent
/// solver, prints both timings, and prints `Same` if every end moment
/// agrees within the comparison tolerance, `Not Same` otherwise.
#[derive(Parser, Debug, Clone)]
#[command(name = "hardy")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Structure description file
    pub file: PathBuf,

    /// Number of worker threads for the concurrent solver
    #[arg(short = 'n', long = "workers", default_value = "4")]
    pub workers: usize,

    /// Pass bound before a solve is declared divergent
    #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
    pub max_passes: u64,

    /// Relaxation tolerance: joints with smaller unbalance are balanced
    #[arg(long, default_value_t = TOLERANCE)]
    pub tolerance: f64,

    /// Largest per-end difference still reported as `Same`; must be at
    /// least `--tolerance`
    #[arg(long, default_value_t = TOLERANCE_CHECK)]
    pub tolerance_check: f64,

    /// Print the node listing of the concurrent result
    #[arg(long)]
    pub print: bool,
}

impl Args {
    /// Solver configuration derived from the flags.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::default()
            .with_workers(self.workers)
            .with_tolerance(self.tolerance)
            .with_max_passes(self.max_passes)
    }
}

/// Why a run could not produce a comparison.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be read, parsed, or built.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The comparison tolerance is tighter than the relaxation tolerance,
    /// so two correct results could be reported as different.
    #[error("--tolerance-check {check} must be at least --tolerance {tolerance}")]
    ToleranceCheck {
        /// Requested comparison tolerance.
        check: f64,
        /// Requested relaxation tolerance.
        tolerance: f64,
    },
    /// A solver failed.
    #[error("solver failed: {0}")]
    Solve(#[from] SolveError),
}

impl CliError {
    /// Process exit status: 2 for input errors, 3 for solver failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Load(_) | Self::ToleranceCheck { .. } => 2,
            Self::Solve(_) => 3,
        }
    }
}

/// Both results and their comparison.
#[derive(Debug)]
pub struct RunSummary {
    /// Sequential solver metrics.
    pub sequential: SolveReport,
    /// Concurrent solver metrics.
    pub concurrent: SolveReport,
    /// End-by-end comparison of the two results.
    pub comparison: Comparison,
    /// The concurrent result.
    pub structure: Structure,
}

impl RunSummary {
    /// Process exit status: 0 when the results agree, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.comparison.is_match() {
            0
        } else {
            1
        }
    }
}

/// Load the file named in `args`, run both solvers, and compare.
///
/// # Errors
///
/// [`CliError::ToleranceCheck`] if `--tolerance-check` is below
/// `--tolerance`, and [`CliError::Load`] if the input is unusable; in
/// both cases nothing is solved.
/// [`CliError::Solve`] if either solver fails.
pub fn execute(args: &Args) -> Result<RunSummary, CliError> {
    if args.tolerance_check.is_nan() || args.tolerance_check < args.tolerance {
        return Err(CliError::ToleranceCheck {
            check: args.tolerance_check,
            tolerance: args.tolerance,
        });
    }
    let structure = load_structure(&args.file)?;
    let config = args.solver_config();
    info!(
        file = %args.file.display(),
        nodes = structure.len(),
        ends = structure.end_count(),
        workers = args.workers,
        "structure loaded"
    );

    let mut reference = structure.clone();
    let sequential = SequentialSolver::new(config.clone()).solve(&mut reference)?;
    let solved = ConcurrentSolver::new(config).solve(structure)?;

    let comparison = compare(&reference, &solved.structure, args.tolerance_check);
    Ok(RunSummary {
        sequential,
        concurrent: solved.report,
        comparison,
        structure: solved.structure,
    })
}

/// Write the human-readable report for `summary`.
pub fn render(summary: &RunSummary, print: bool, out: &mut impl Write) -> io::Result<()> {
    if print {
        writeln!(out, "{}", summary.structure)?;
    }
    writeln!(
        out,
        "Sequential version took {:?} ({} sweeps)",
        Duration::from_micros(summary.sequential.elapsed_us),
        summary.sequential.passes
    )?;
    writeln!(
        out,
        "Parallel version took {:?} ({} workers, {} passes)",
        Duration::from_micros(summary.concurrent.elapsed_us),
        summary.concurrent.workers,
        summary.concurrent.passes
    )?;
    if summary.comparison.is_match() {
        writeln!(out, "Same")?;
    } else {
        writeln!(out, "Not Same")?;
        for m in &summary.comparison.mismatches {
            writeln!(
                out,
                "\tnode {} end {}: {:.3} vs {:.3}",
                m.node, m.end, m.left, m.right
            )?;
        }
    }
    Ok(())
}

//! Hardy: concurrent moment distribution for rigid frames.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Hardy sub-crates. For most users, adding `hardy` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hardy::prelude::*;
//!
//! let text = "3\n0 F\n1 N\n2 N\n2\n\
//!             0 1.0 0 -172.8 1 0.5 0 115.2\n\
//!             1 0.5 0 -416.7 2 1.0 0 416.7\n";
//! let structure = parse_structure(text).unwrap();
//!
//! let mut reference = structure.clone();
//! SequentialSolver::default().solve(&mut reference).unwrap();
//!
//! let solved = ConcurrentSolver::new(SolverConfig::default().with_workers(2))
//!     .solve(structure)
//!     .unwrap();
//! assert!(moments_match(&reference, &solved.structure, TOLERANCE_CHECK));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hardy-core` | IDs, the update message, constants, error enums |
//! | [`frame`] | `hardy-frame` | Joint graph, builder, normalizer, parser, comparison |
//! | [`engine`] | `hardy-engine` | Sequential and concurrent solvers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, constants, and errors (`hardy-core`).
pub use hardy_core as types;

/// Joint graph, construction, parsing, and comparison (`hardy-frame`).
///
/// [`frame::Structure`] is the central type; build it with
/// [`frame::Structure::build`] or [`frame::parse_structure`].
pub use hardy_frame as frame;

/// Solvers (`hardy-engine`).
///
/// [`engine::SequentialSolver`] for the deterministic reference result,
/// [`engine::ConcurrentSolver`] for the multi-threaded solve.
pub use hardy_engine as engine;

/// Common imports for typical Hardy usage.
///
/// ```rust
/// use hardy::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use hardy_core::{
        EndIndex, NodeId, Update, CARRYOVER_RATIO, TOLERANCE, TOLERANCE_CHECK,
    };

    // Errors
    pub use hardy_core::{BuildError, ConfigError, ParseError, SolveError};

    // Frame
    pub use hardy_frame::{
        compare, load_structure, moments_match, parse_structure, Comparison, EndSpec, LoadError,
        MemberSpec, Node, NodeSpec, Structure,
    };

    // Engine
    pub use hardy_engine::{ConcurrentSolver, SequentialSolver, SolveReport, Solved, SolverConfig};
}

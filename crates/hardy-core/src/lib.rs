//! Core types for the Hardy moment distribution solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the frame model and both solvers: typed
//! identifiers, the [`Update`] carry-over message, the relaxation
//! constants, and the error enums for every subsystem.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod id;
pub mod update;

pub use constants::{CARRYOVER_RATIO, DEFAULT_MAX_PASSES, TOLERANCE, TOLERANCE_CHECK};
pub use error::{BuildError, ConfigError, ParseError, SolveError};
pub use id::{EndIndex, EndRef, NodeId, WorkerId};
pub use update::Update;

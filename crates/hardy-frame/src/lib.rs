//! Rigid-frame joint graph for the Hardy solver.
//!
//! A [`Structure`] is built from node and member specifications (or
//! parsed from the text description), normalized so every joint's
//! distribution factors sum to 1, solved by `hardy-engine`, and finally
//! checked against another solution with [`compare`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod compare;
pub mod normalize;
pub mod parse;
pub mod structure;

pub use builder::{EndSpec, MemberSpec, NodeSpec};
pub use compare::{compare, moments_match, Comparison, MomentMismatch};
pub use normalize::{normalize, NormalizeReport};
pub use parse::{load_structure, parse_specs, parse_structure, LoadError};
pub use structure::{End, Node, Relaxation, Structure};

//! Test fixtures and seeded frame generators for Hardy development.
//!
//! - [`three_node_chain`]: the reference chain with known moments
//!   ([`CHAIN_EXPECTED`]) and its text form ([`CHAIN_TEXT`]).
//! - [`continuous_beam`]: a symmetric multi-span beam.
//! - [`random_frame`]: reproducible random frames from a seed.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod frames;

pub use frames::{random_frame, random_specs, FrameShape};

use hardy_frame::{EndSpec, MemberSpec, NodeSpec, Structure};

/// Text description of [`three_node_chain`].
pub const CHAIN_TEXT: &str = "\
3
0 F
1 N
2 N
2
0 1.0 0 -172.8 1 0.5 0 115.2
1 0.5 0 -416.7 2 1.0 0 416.7
";

/// Converged moments of [`three_node_chain`] as `(node, end, moment)`.
///
/// Exact values of the linear system; a solve at the default tolerance
/// lands within 0.5 of each.
pub const CHAIN_EXPECTED: &[(u32, u32, f64)] = &[
    (0, 0, -27.129),
    (1, 0, 406.543),
    (1, 1, -406.543),
    (2, 0, 0.0),
];

/// Node 0 fixed, nodes 1 and 2 free.
///
/// Member A joins 0–1 with fixed-end moments −172.8 / 115.2; member B
/// joins 1–2 with −416.7 / 416.7. Node 1 splits evenly between A and B.
pub fn three_node_chain() -> Structure {
    build(
        &[NodeSpec::fixed(0), NodeSpec::free(1), NodeSpec::free(2)],
        &[
            MemberSpec::new(EndSpec::new(0, 1.0, -172.8), EndSpec::new(1, 0.5, 115.2)),
            MemberSpec::new(EndSpec::new(1, 0.5, -416.7), EndSpec::new(2, 1.0, 416.7)),
        ],
    )
}

/// A beam over `spans + 1` supports with both outer ones fixed.
///
/// Span `i` carries fixed-end moments `∓fem · (1 + i/4)`; odd spans are
/// twice as stiff as even ones. `spans` must be at least 1.
pub fn continuous_beam(spans: u32, fem: f64) -> Structure {
    assert!(spans >= 1, "a beam needs at least one span");
    let mut nodes = vec![NodeSpec::fixed(0)];
    nodes.extend((1..spans).map(NodeSpec::free));
    nodes.push(NodeSpec::fixed(spans));

    let members: Vec<MemberSpec> = (0..spans)
        .map(|i| {
            let stiffness = if i % 2 == 1 { 2.0 } else { 1.0 };
            let load = fem * (1.0 + i as f64 * 0.25);
            MemberSpec::new(
                EndSpec::new(i, stiffness, -load),
                EndSpec::new(i + 1, stiffness, load),
            )
        })
        .collect();
    build(&nodes, &members)
}

fn build(nodes: &[NodeSpec], members: &[MemberSpec]) -> Structure {
    match Structure::build(nodes, members) {
        Ok(s) => s,
        Err(e) => panic!("fixture failed to build: {e}"),
    }
}

//! Seeded random frame generation.
//!
//! Frames are connected (a spanning chain over every node plus random
//! extra members), always have node 0 fixed, and use strictly positive
//! raw distribution factors, so both solvers converge on them.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hardy_frame::{EndSpec, MemberSpec, NodeSpec, Structure};

/// Shape parameters for [`random_frame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameShape {
    /// Number of joints. At least 2.
    pub nodes: u32,
    /// Members added on top of the spanning chain.
    pub extra_members: u32,
    /// Probability that a joint other than node 0 is fixed.
    pub fixed_ratio: f64,
    /// Fixed-end moments are drawn from `-max_moment..max_moment`.
    pub max_moment: f64,
}

impl Default for FrameShape {
    fn default() -> Self {
        Self {
            nodes: 12,
            extra_members: 6,
            fixed_ratio: 0.25,
            max_moment: 500.0,
        }
    }
}

impl FrameShape {
    /// A larger frame for benchmarks.
    pub fn large(nodes: u32) -> Self {
        Self {
            nodes,
            extra_members: nodes / 2,
            ..Self::default()
        }
    }
}

/// Generate node and member specs for a random frame.
pub fn random_specs(seed: u64, shape: FrameShape) -> (Vec<NodeSpec>, Vec<MemberSpec>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = shape.nodes.max(2);

    let nodes: Vec<NodeSpec> = (0..n)
        .map(|id| NodeSpec {
            id: id.into(),
            fixed: id == 0 || rng.random_bool(shape.fixed_ratio),
        })
        .collect();

    let mut pairs: Vec<(u32, u32)> = (1..n).map(|i| (i - 1, i)).collect();
    for _ in 0..shape.extra_members {
        pairs.push((rng.random_range(0..n), rng.random_range(0..n)));
    }

    let end = |rng: &mut ChaCha8Rng, node: u32| {
        EndSpec::new(
            node,
            rng.random_range(0.5..2.0),
            rng.random_range(-shape.max_moment..shape.max_moment),
        )
    };
    let members = pairs
        .into_iter()
        .map(|(a, b)| {
            let near = end(&mut rng, a);
            let far = end(&mut rng, b);
            MemberSpec::new(near, far)
        })
        .collect();
    (nodes, members)
}

/// Build a random frame. Same seed and shape, same frame.
pub fn random_frame(seed: u64, shape: FrameShape) -> Structure {
    let (nodes, members) = random_specs(seed, shape);
    match Structure::build(&nodes, &members) {
        Ok(s) => s,
        Err(e) => panic!("random frame (seed {seed}) failed to build: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_frame() {
        let a = random_frame(7, FrameShape::default());
        let b = random_frame(7, FrameShape::default());
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn node_zero_is_always_fixed() {
        for seed in 0..20 {
            let s = random_frame(seed, FrameShape::default());
            assert!(s.node(hardy_core::NodeId(0)).unwrap().is_fixed());
        }
    }

    #[test]
    fn every_member_contributes_two_ends() {
        let shape = FrameShape::default();
        let s = random_frame(3, shape);
        let members = (shape.nodes - 1 + shape.extra_members) as usize;
        assert_eq!(s.end_count(), 2 * members);
    }
}

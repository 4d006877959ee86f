//! Distribution-factor normalization.

use tracing::warn;

use hardy_core::NodeId;

use crate::structure::Structure;

/// Outcome of a [`normalize`] pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizeReport {
    /// Nodes whose factors were rescaled.
    pub normalized: usize,
    /// Nodes whose raw factors summed to zero and were left untouched.
    pub skipped: Vec<NodeId>,
}

/// Rescale every node's distribution factors so they sum to 1.
///
/// A node whose raw factors sum to exactly 0 cannot be rescaled and is
/// skipped. Such a node never balances if it is free, which the solvers
/// report as divergence once their pass bound is reached.
pub fn normalize(structure: &mut Structure) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for node in structure.nodes.values_mut() {
        if node.ends.is_empty() {
            continue;
        }
        let sum: f64 = node.ends.iter().map(|e| e.df).sum();
        if sum == 0.0 {
            warn!(node = %node.id(), "distribution factors sum to zero, skipping");
            report.skipped.push(node.id());
            continue;
        }
        for end in node.ends.iter_mut() {
            end.df /= sum;
        }
        report.normalized += 1;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{EndSpec, MemberSpec, NodeSpec};
    use proptest::prelude::*;

    #[test]
    fn zero_sum_node_is_skipped() {
        let nodes = vec![NodeSpec::fixed(0), NodeSpec::free(1)];
        let members = vec![MemberSpec::new(
            EndSpec::new(0, 0.0, 1.0),
            EndSpec::new(1, 2.0, 1.0),
        )];
        let mut s = Structure::build(&nodes, &members).unwrap();
        let report = normalize(&mut s);
        assert_eq!(report.skipped, vec![NodeId(0)]);
        assert_eq!(report.normalized, 1);
        assert_eq!(s.node(NodeId(1)).unwrap().ends()[0].df(), 1.0);
    }

    #[test]
    fn normalize_is_idempotent() {
        let nodes = vec![NodeSpec::free(0), NodeSpec::free(1)];
        let members = vec![
            MemberSpec::new(EndSpec::new(0, 3.0, 0.0), EndSpec::new(1, 1.0, 0.0)),
            MemberSpec::new(EndSpec::new(0, 1.0, 0.0), EndSpec::new(1, 1.0, 0.0)),
        ];
        let mut s = Structure::build(&nodes, &members).unwrap();
        let before = s.clone();
        normalize(&mut s);
        for (a, b) in before.nodes().zip(s.nodes()) {
            for (ea, eb) in a.ends().iter().zip(b.ends()) {
                assert!((ea.df() - eb.df()).abs() < 1e-12);
            }
        }
        assert_eq!(s.node(NodeId(0)).unwrap().ends()[0].df(), 0.75);
    }

    proptest! {
        #[test]
        fn factors_sum_to_one(
            dfs in prop::collection::vec((0.01f64..100.0, 0.01f64..100.0), 1..20),
            fan in 2u32..6,
        ) {
            // `fan` joints, members between consecutive joints (mod fan).
            let nodes: Vec<NodeSpec> = (0..fan).map(NodeSpec::free).collect();
            let members: Vec<MemberSpec> = dfs
                .iter()
                .enumerate()
                .map(|(i, &(a, b))| {
                    let i = i as u32;
                    MemberSpec::new(
                        EndSpec::new(i % fan, a, 0.0),
                        EndSpec::new((i + 1) % fan, b, 0.0),
                    )
                })
                .collect();
            let s = Structure::build(&nodes, &members).unwrap();
            for node in s.nodes() {
                let sum: f64 = node.ends().iter().map(|e| e.df()).sum();
                prop_assert!((sum - 1.0).abs() < 1e-9, "node {} sums to {}", node.id(), sum);
            }
        }
    }
}

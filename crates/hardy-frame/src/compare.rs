//! End-by-end comparison of two solved structures.
//!
//! Used to validate a concurrent result against the sequential
//! reference. Every mismatching end is reported, not only the first.

use hardy_core::{EndIndex, NodeId};

use crate::structure::Structure;

/// A single end whose moments differ by more than the tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentMismatch {
    /// Node owning the end.
    pub node: NodeId,
    /// Local index of the end.
    pub end: EndIndex,
    /// Moment in the first structure.
    pub left: f64,
    /// Moment in the second structure.
    pub right: f64,
}

impl MomentMismatch {
    /// Absolute difference between the two moments.
    pub fn delta(&self) -> f64 {
        (self.left - self.right).abs()
    }
}

/// Result of [`compare`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comparison {
    /// Ends compared (present in both structures).
    pub compared_ends: usize,
    /// Ends outside the tolerance, in the first structure's node order.
    pub mismatches: Vec<MomentMismatch>,
    /// Node ids present in only one of the two structures.
    pub missing: Vec<NodeId>,
}

impl Comparison {
    /// `true` iff every compared end is within tolerance.
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// The largest mismatch, if any.
    pub fn worst(&self) -> Option<&MomentMismatch> {
        self.mismatches
            .iter()
            .max_by(|a, b| a.delta().total_cmp(&b.delta()))
    }
}

/// Compare two structures end by end.
///
/// For every node present in both and every end index present at both
/// copies of that node, the moments must agree within `tolerance`. A NaN
/// moment on either side always counts as a mismatch.
pub fn compare(a: &Structure, b: &Structure, tolerance: f64) -> Comparison {
    let mut result = Comparison::default();
    for left in a.nodes() {
        let Some(right) = b.node(left.id()) else {
            result.missing.push(left.id());
            continue;
        };
        for (ea, eb) in left.ends().iter().zip(right.ends()) {
            result.compared_ends += 1;
            let within = (ea.moment() - eb.moment()).abs() <= tolerance;
            if !within {
                result.mismatches.push(MomentMismatch {
                    node: left.id(),
                    end: ea.index(),
                    left: ea.moment(),
                    right: eb.moment(),
                });
            }
        }
    }
    result
        .missing
        .extend(b.ids().filter(|id| !a.contains(*id)));
    result
}

/// Boolean shorthand for [`compare`].
pub fn moments_match(a: &Structure, b: &Structure, tolerance: f64) -> bool {
    compare(a, b, tolerance).is_match()
}

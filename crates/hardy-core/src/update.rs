//! The carry-over message exchanged between joints.

use crate::id::EndIndex;

/// A pending moment correction for one end of a node.
///
/// Produced when a joint redistributes its unbalance: each end's increment
/// is scaled by the carry-over ratio and sent to the partner end. The
/// receiving node adds `carry_over` to the addressed end's moment when it
/// drains its mailbox. Each update is consumed exactly once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Update {
    /// End of the receiving node the correction applies to.
    pub end: EndIndex,
    /// Signed moment delta.
    pub carry_over: f64,
}

impl Update {
    /// Create an update for `end` carrying `carry_over`.
    pub fn new(end: EndIndex, carry_over: f64) -> Self {
        Self { end, carry_over }
    }
}

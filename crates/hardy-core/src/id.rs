//! Strongly-typed identifiers and the [`EndRef`] routing address.

use std::fmt;

/// Identifies a joint within a structure.
///
/// Ids come from the structure description and are stable for the whole
/// run. They need not be dense or sorted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Local index of an end within its owning node.
///
/// Assigned in attachment order when members are built: the first end
/// attached to a node is `EndIndex(0)`. Together with a [`NodeId`] it
/// forms the address an [`Update`](crate::Update) is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndIndex(pub u32);

impl EndIndex {
    /// The index as a `usize`, for slice access.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EndIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EndIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one worker thread of a concurrent run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// The index as a `usize`, for slice access.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Address of an end anywhere in the structure: owning node + local index.
///
/// Partner links are stored as `EndRef` values rather than references so
/// that an end owned by one worker can name an end owned by another
/// without sharing memory between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndRef {
    /// Node that owns the end.
    pub node: NodeId,
    /// Index of the end within that node.
    pub end: EndIndex,
}

impl EndRef {
    /// Build an address from its parts.
    pub fn new(node: NodeId, end: EndIndex) -> Self {
        Self { node, end }
    }
}

impl fmt::Display for EndRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.node, self.end)
    }
}

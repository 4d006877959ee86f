//! Structure construction from node and member specifications.

use indexmap::IndexMap;
use tracing::debug;

use hardy_core::{BuildError, EndIndex, EndRef, NodeId};

use crate::normalize::normalize;
use crate::structure::{Node, Structure};

/// Declaration of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeSpec {
    /// Joint id, unique within the structure.
    pub id: NodeId,
    /// `true` for a support.
    pub fixed: bool,
}

impl NodeSpec {
    /// A free (rotating) joint.
    pub fn free(id: u32) -> Self {
        Self {
            id: NodeId(id),
            fixed: false,
        }
    }

    /// A fixed support.
    pub fn fixed(id: u32) -> Self {
        Self {
            id: NodeId(id),
            fixed: true,
        }
    }
}

/// One end of a member as declared in the input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndSpec {
    /// Joint the end frames into.
    pub node: NodeId,
    /// Raw distribution factor (rescaled during normalization).
    pub df: f64,
    /// Fixed-end moment.
    pub moment: f64,
}

impl EndSpec {
    /// Shorthand constructor.
    pub fn new(node: u32, df: f64, moment: f64) -> Self {
        Self {
            node: NodeId(node),
            df,
            moment,
        }
    }
}

/// A member: two ends, each linked to the other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberSpec {
    /// End appended first.
    pub near: EndSpec,
    /// End appended second.
    pub far: EndSpec,
}

impl MemberSpec {
    /// Shorthand constructor.
    pub fn new(near: EndSpec, far: EndSpec) -> Self {
        Self { near, far }
    }
}

impl Structure {
    /// Build and normalize a structure.
    ///
    /// Nodes are kept in `nodes` order. Each member appends its near end
    /// to the near node and then its far end to the far node, so a node's
    /// end indices follow member order. Nodes left without ends are
    /// dropped; distribution factors are then normalized per node.
    ///
    /// # Errors
    ///
    /// - [`BuildError::DuplicateNode`] if an id is declared twice.
    /// - [`BuildError::UnreachableNode`] if a member names an undeclared id.
    /// - [`BuildError::NonFinite`] for NaN or infinite factors or moments.
    ///
    /// On error no structure is produced.
    pub fn build(nodes: &[NodeSpec], members: &[MemberSpec]) -> Result<Self, BuildError> {
        let mut map: IndexMap<NodeId, Node> = IndexMap::with_capacity(nodes.len());
        for spec in nodes {
            if map.contains_key(&spec.id) {
                return Err(BuildError::DuplicateNode { node: spec.id });
            }
            map.insert(spec.id, Node::new(spec.id, spec.fixed));
        }

        for (i, member) in members.iter().enumerate() {
            check_finite(i, member)?;
            for end in [member.near, member.far] {
                if !map.contains_key(&end.node) {
                    return Err(BuildError::UnreachableNode {
                        node: end.node,
                        member: i,
                    });
                }
            }
            let near_index = next_index(&map, member.near.node);
            let far_index = if member.near.node == member.far.node {
                EndIndex(near_index.0 + 1)
            } else {
                next_index(&map, member.far.node)
            };
            let near_ref = EndRef::new(member.near.node, near_index);
            let far_ref = EndRef::new(member.far.node, far_index);

            if let Some(node) = map.get_mut(&member.near.node) {
                node.attach(member.near.df, member.near.moment, far_ref);
            }
            if let Some(node) = map.get_mut(&member.far.node) {
                node.attach(member.far.df, member.far.moment, near_ref);
            }
        }

        let declared = map.len();
        map.retain(|_, node| !node.ends.is_empty());
        if map.len() < declared {
            debug!(
                dropped = declared - map.len(),
                "dropped nodes with no members"
            );
        }

        let mut structure = Structure { nodes: map };
        normalize(&mut structure);
        Ok(structure)
    }
}

fn next_index(map: &IndexMap<NodeId, Node>, id: NodeId) -> EndIndex {
    EndIndex(map.get(&id).map_or(0, |n| n.ends.len() as u32))
}

fn check_finite(member: usize, spec: &MemberSpec) -> Result<(), BuildError> {
    let values = [
        ("near distribution factor", spec.near.df),
        ("near moment", spec.near.moment),
        ("far distribution factor", spec.far.df),
        ("far moment", spec.far.moment),
    ];
    for (field, value) in values {
        if !value.is_finite() {
            return Err(BuildError::NonFinite {
                member,
                field,
                value,
            });
        }
    }
    Ok(())
}

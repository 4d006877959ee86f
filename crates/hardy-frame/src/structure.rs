//! Joint graph: [`Structure`], [`Node`], and [`End`].
//!
//! A structure is an ordered map of joints. Each joint owns the ends of
//! the members framing into it; each end names its partner by
//! [`EndRef`] (node id + local index), never by reference, so joints can
//! be split across threads and still route carry-overs to each other.
//!
//! # Ordering
//!
//! Nodes iterate in declaration order. That order is the sweep order of
//! the sequential solver and the round-robin order of the partitioner.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use hardy_core::{EndIndex, EndRef, NodeId, SolveError, Update, CARRYOVER_RATIO};

/// One terminus of a member, owned by exactly one [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub struct End {
    pub(crate) index: EndIndex,
    pub(crate) df: f64,
    pub(crate) moment: f64,
    pub(crate) partner: EndRef,
}

impl End {
    /// Local index of this end within its node.
    pub fn index(&self) -> EndIndex {
        self.index
    }

    /// Distribution factor: this end's share of the node's unbalance.
    pub fn df(&self) -> f64 {
        self.df
    }

    /// Accumulated moment at this end.
    pub fn moment(&self) -> f64 {
        self.moment
    }

    /// Address of the end at the other side of the member.
    pub fn partner(&self) -> EndRef {
        self.partner
    }
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "End df: {:.2} moment: {:.1}", self.df, self.moment)
    }
}

/// What a single [`Node::relax`] call did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Relaxation {
    /// The node is a support; moments accumulate but are never redistributed.
    Fixed,
    /// `|Σ moment| ≤ tolerance`; nothing was sent.
    Balanced,
    /// The unbalance was redistributed and one update sent per end.
    Redistributed {
        /// The unbalance that was cancelled.
        unbalance: f64,
        /// Number of updates emitted.
        sent: usize,
    },
}

impl Relaxation {
    /// Whether the call emitted any updates.
    pub fn redistributed(&self) -> bool {
        matches!(self, Self::Redistributed { .. })
    }
}

/// A structural joint.
///
/// The set of ends is fixed once the structure is built; only moments
/// change during a solve, and only through [`apply`](Node::apply) and
/// [`relax`](Node::relax).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    fixed: bool,
    pub(crate) ends: SmallVec<[End; 4]>,
}

impl Node {
    /// Create a node with no ends.
    pub fn new(id: NodeId, fixed: bool) -> Self {
        Self {
            id,
            fixed,
            ends: SmallVec::new(),
        }
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether this node models a support.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// The node's ends in local-index order.
    pub fn ends(&self) -> &[End] {
        &self.ends
    }

    /// Look up an end by local index.
    pub fn end(&self, index: EndIndex) -> Option<&End> {
        self.ends.get(index.get())
    }

    /// Sum of the moments at every end: the node's unbalance.
    pub fn moment_sum(&self) -> f64 {
        self.ends.iter().map(|e| e.moment).sum()
    }

    /// Append an end and return its local index.
    pub(crate) fn attach(&mut self, df: f64, moment: f64, partner: EndRef) -> EndIndex {
        let index = EndIndex(self.ends.len() as u32);
        self.ends.push(End {
            index,
            df,
            moment,
            partner,
        });
        index
    }

    /// Add an incoming carry-over to the addressed end.
    ///
    /// # Errors
    ///
    /// [`SolveError::Misrouted`] if the node has no such end.
    pub fn apply(&mut self, update: Update) -> Result<(), SolveError> {
        let id = self.id;
        let end = self
            .ends
            .get_mut(update.end.get())
            .ok_or(SolveError::Misrouted {
                node: id,
                end: update.end,
            })?;
        end.moment += update.carry_over;
        Ok(())
    }

    /// Run one relaxation step on this node.
    ///
    /// Fixed nodes and balanced nodes emit nothing. Otherwise every end
    /// receives `-unbalance * df`, which cancels the unbalance when the
    /// factors sum to 1, and `emit` is called once per end with the
    /// partner's node and an [`Update`] carrying half the increment.
    ///
    /// Emission stops at the first error, which is returned as-is.
    pub fn relax<E>(
        &mut self,
        tolerance: f64,
        mut emit: impl FnMut(NodeId, Update) -> Result<(), E>,
    ) -> Result<Relaxation, E> {
        if self.fixed {
            return Ok(Relaxation::Fixed);
        }
        let unbalance = self.moment_sum();
        if unbalance.abs() <= tolerance {
            return Ok(Relaxation::Balanced);
        }
        for end in self.ends.iter_mut() {
            let increment = -unbalance * end.df;
            end.moment += increment;
            emit(
                end.partner.node,
                Update::new(end.partner.end, increment * CARRYOVER_RATIO),
            )?;
        }
        Ok(Relaxation::Redistributed {
            unbalance,
            sent: self.ends.len(),
        })
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node id: {}, num of ends: {}", self.id, self.ends.len())?;
        if self.fixed {
            write!(f, ", Fix")?;
        } else {
            write!(f, ", Non-fix")?;
        }
        for end in &self.ends {
            write!(f, "\n\t{end}")?;
        }
        Ok(())
    }
}

/// A rigid frame: joints keyed by id, in declaration order.
///
/// Built with [`Structure::build`](crate::builder) or the parser in
/// [`parse`](crate::parse). Every node has at least one end and every
/// end's partner exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Structure {
    pub(crate) nodes: IndexMap<NodeId, Node>,
}

impl Structure {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the structure has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up a node by id, mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// The node at a declaration-order position, mutably.
    pub fn node_at_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_index_mut(index).map(|(_, node)| node)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Node ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Total number of ends (twice the member count).
    pub fn end_count(&self) -> usize {
        self.nodes.values().map(|n| n.ends.len()).sum()
    }

    /// Moment at the addressed end, if it exists.
    pub fn moment(&self, node: NodeId, end: EndIndex) -> Option<f64> {
        self.node(node).and_then(|n| n.end(end)).map(End::moment)
    }

    /// Largest `|Σ moment|` over all non-fixed nodes.
    pub fn max_unbalance(&self) -> f64 {
        self.nodes
            .values()
            .filter(|n| !n.is_fixed())
            .map(|n| n.moment_sum().abs())
            .fold(0.0, f64::max)
    }

    /// Consume the structure, yielding nodes in declaration order.
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes.into_values().collect()
    }

    /// Reassemble a structure from nodes that were split apart, restoring
    /// `order`. Nodes not named in `order` are appended afterwards in the
    /// order they are supplied.
    pub fn reassemble(order: &[NodeId], nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut by_id: HashMap<NodeId, Node> = nodes.into_iter().map(|n| (n.id(), n)).collect();
        let mut map = IndexMap::with_capacity(by_id.len());
        for id in order {
            if let Some(node) = by_id.remove(id) {
                map.insert(*id, node);
            }
        }
        let mut rest: Vec<Node> = by_id.into_values().collect();
        rest.sort_by_key(Node::id);
        for node in rest {
            map.insert(node.id(), node);
        }
        Self { nodes: map }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.values().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn free_node(moments: &[(f64, f64)]) -> Node {
        let mut node = Node::new(NodeId(1), false);
        for (i, &(df, m)) in moments.iter().enumerate() {
            node.attach(df, m, EndRef::new(NodeId(10 + i as u32), EndIndex(0)));
        }
        node
    }

    fn collect(node: &mut Node, tol: f64) -> (Relaxation, Vec<(NodeId, Update)>) {
        let mut out = Vec::new();
        let r = node
            .relax(tol, |to, u| {
                out.push((to, u));
                Ok::<(), Infallible>(())
            })
            .unwrap();
        (r, out)
    }

    #[test]
    fn relax_drives_unbalance_to_zero() {
        let mut node = free_node(&[(0.5, 115.2), (0.5, -416.7)]);
        let (r, out) = collect(&mut node, 0.1);
        assert!(r.redistributed());
        assert!(node.moment_sum().abs() < 1e-9);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn relax_carries_half_of_each_increment() {
        let mut node = free_node(&[(0.25, 100.0), (0.75, 0.0)]);
        let (_, out) = collect(&mut node, 0.1);
        // increments: -25 and -75
        assert_eq!(out[0], (NodeId(10), Update::new(EndIndex(0), -12.5)));
        assert_eq!(out[1], (NodeId(11), Update::new(EndIndex(0), -37.5)));
        assert_eq!(node.ends()[0].moment(), 75.0);
        assert_eq!(node.ends()[1].moment(), -75.0);
    }

    #[test]
    fn balanced_node_emits_nothing() {
        let mut node = free_node(&[(0.5, 10.0), (0.5, -9.95)]);
        let (r, out) = collect(&mut node, 0.1);
        assert_eq!(r, Relaxation::Balanced);
        assert!(out.is_empty());
    }

    #[test]
    fn fixed_node_never_redistributes() {
        let mut node = Node::new(NodeId(0), true);
        node.attach(1.0, -172.8, EndRef::new(NodeId(1), EndIndex(0)));
        let (r, out) = collect(&mut node, 0.1);
        assert_eq!(r, Relaxation::Fixed);
        assert!(out.is_empty());
        assert_eq!(node.moment_sum(), -172.8);
    }

    #[test]
    fn apply_rejects_missing_end() {
        let mut node = free_node(&[(1.0, 0.0)]);
        assert!(node.apply(Update::new(EndIndex(0), 2.5)).is_ok());
        assert_eq!(node.ends()[0].moment(), 2.5);
        assert_eq!(
            node.apply(Update::new(EndIndex(3), 1.0)),
            Err(SolveError::Misrouted {
                node: NodeId(1),
                end: EndIndex(3)
            })
        );
    }

    #[test]
    fn relax_stops_at_first_emit_error() {
        let mut node = free_node(&[(0.5, 10.0), (0.5, 10.0)]);
        let mut calls = 0;
        let r = node.relax(0.1, |_, _| {
            calls += 1;
            Err("closed")
        });
        assert_eq!(r, Err("closed"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn display_matches_listing_format() {
        let mut node = Node::new(NodeId(1), false);
        node.attach(0.5, 115.2, EndRef::new(NodeId(0), EndIndex(0)));
        assert_eq!(
            node.to_string(),
            "Node id: 1, num of ends: 1, Non-fix\n\tEnd df: 0.50 moment: 115.2"
        );
    }

    #[test]
    fn reassemble_restores_declaration_order() {
        let a = Node::new(NodeId(5), false);
        let b = Node::new(NodeId(2), true);
        let c = Node::new(NodeId(9), false);
        let s = Structure::reassemble(&[NodeId(9), NodeId(5), NodeId(2)], vec![a, b, c]);
        let ids: Vec<_> = s.ids().collect();
        assert_eq!(ids, vec![NodeId(9), NodeId(5), NodeId(2)]);
    }

    #[test]
    fn node_at_mut_follows_declaration_order() {
        let nodes = vec![Node::new(NodeId(7), false), Node::new(NodeId(3), true)];
        let mut s = Structure::reassemble(&[NodeId(7), NodeId(3)], nodes);
        assert_eq!(s.node_at_mut(1).map(|n| n.id()), Some(NodeId(3)));
        assert!(s.node_at_mut(2).is_none());
    }
}

//! Per-node mailboxes, the router that addresses them, and the in-flight
//! ledger that makes outstanding work observable.
//!
//! Every node gets one unbounded crossbeam channel. The [`Router`] keeps
//! all senders, addressed by [`NodeId`], and is shared by every worker;
//! each [`Mailbox`] (the receiving half) moves into the worker that owns
//! the node. Channels are multi-producer, and only the owner ever
//! receives, so updates for one node are applied by one thread.
//!
//! # Ledger protocol
//!
//! The [`Ledger`] counts work that exists but has not been settled:
//!
//! - one credit per worker, held from the start of the run,
//! - one unit per update, added by the sender *before* the update is
//!   enqueued and removed by the receiver *after* it has been applied
//!   and the node relaxed.
//!
//! A worker gives up its credit at the end of a pass that redistributed
//! nothing and takes it back (before settling what it drained) at the end
//! of a pass that did. A zero ledger therefore means no update is queued,
//! no worker is part-way through applying one, and every node was
//! balanced when last relaxed. Nothing can raise it again once it is zero.

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;

use hardy_core::{NodeId, SolveError, Update};
use hardy_frame::Node;

/// Outstanding-work counter shared by every worker and the detector.
#[derive(Debug)]
pub struct Ledger {
    count: AtomicUsize,
}

impl Ledger {
    /// Create a ledger holding `credits` initial units.
    pub fn new(credits: usize) -> Self {
        Self {
            count: AtomicUsize::new(credits),
        }
    }

    /// Add `n` units.
    pub fn acquire(&self, n: usize) {
        if n > 0 {
            self.count.fetch_add(n, Ordering::AcqRel);
        }
    }

    /// Remove `n` units.
    pub fn release(&self, n: usize) {
        if n > 0 {
            let prev = self.count.fetch_sub(n, Ordering::AcqRel);
            debug_assert!(prev >= n, "ledger underflow: {prev} - {n}");
        }
    }

    /// Current number of units.
    pub fn current(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

/// Sending side of every node's mailbox, addressed by node id.
#[derive(Debug)]
pub struct Router {
    mailboxes: IndexMap<NodeId, Sender<Update>>,
    ledger: Ledger,
}

impl Router {
    /// Create one mailbox per node id and a ledger holding `credits`
    /// initial units (one per worker).
    ///
    /// Returns the router and the receiving halves in `ids` order.
    pub fn new(ids: impl IntoIterator<Item = NodeId>, credits: usize) -> (Self, Vec<Mailbox>) {
        let mut mailboxes = IndexMap::new();
        let mut receivers = Vec::new();
        for node in ids {
            let (tx, rx) = crossbeam_channel::unbounded();
            mailboxes.insert(node, tx);
            receivers.push(Mailbox { node, rx });
        }
        let router = Self {
            mailboxes,
            ledger: Ledger::new(credits),
        };
        (router, receivers)
    }

    /// Enqueue `update` for node `to`.
    ///
    /// The ledger is incremented before the update becomes visible.
    ///
    /// # Errors
    ///
    /// - [`SolveError::Misrouted`] if `to` has no mailbox.
    /// - [`SolveError::WorkerLost`] if the owning worker dropped its
    ///   mailbox.
    pub fn send(&self, to: NodeId, update: Update) -> Result<(), SolveError> {
        let tx = self.mailboxes.get(&to).ok_or(SolveError::Misrouted {
            node: to,
            end: update.end,
        })?;
        self.ledger.acquire(1);
        tx.send(update).map_err(|_| {
            self.ledger.release(1);
            SolveError::WorkerLost
        })
    }

    /// Whether every mailbox is empty right now.
    pub fn all_empty(&self) -> bool {
        self.mailboxes.values().all(Sender::is_empty)
    }

    /// Total updates queued across all mailboxes right now.
    pub fn pending(&self) -> usize {
        self.mailboxes.values().map(Sender::len).sum()
    }

    /// Number of mailboxes.
    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    /// Whether the router has no mailboxes.
    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }

    /// The shared in-flight ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

/// Receiving side of one node's mailbox.
#[derive(Debug)]
pub struct Mailbox {
    node: NodeId,
    rx: Receiver<Update>,
}

impl Mailbox {
    /// The node this mailbox delivers to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Apply every queued update to `node` without blocking.
    ///
    /// Returns the number of updates applied. The ledger is not touched;
    /// the caller settles drained updates once the node has relaxed.
    ///
    /// # Errors
    ///
    /// [`SolveError::Misrouted`] if an update addresses an end `node`
    /// does not have. Updates already applied stay applied.
    pub fn drain(&self, node: &mut Node) -> Result<usize, SolveError> {
        let mut applied = 0;
        while let Ok(update) = self.rx.try_recv() {
            applied += 1;
            node.apply(update)?;
        }
        Ok(applied)
    }
}

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::OnceLock;

use anyhow::{ensure, Result};

use crate::hash::Element;

/// Scheduling state of a node.
///
/// ```text
/// Pending --try_claim--> Claimed --complete--> Done
/// ```
///
/// Transitions only move forward and each happens at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeState {
    /// Not yet scheduled.
    Pending = 0,
    /// Won by exactly one worker, hash not published yet.
    Claimed = 1,
    /// Hash written and visible to every thread that observes this state.
    Done = 2,
}

impl From<u8> for NodeState {
    fn from(v: u8) -> Self {
        match v {
            0 => NodeState::Pending,
            1 => NodeState::Claimed,
            2 => NodeState::Done,
            _ => unreachable!("invalid node state {}", v),
        }
    }
}

/// What a node hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Raw input record.
    Leaf(Vec<u8>),
    /// Interior node over two arena indices; `left == right` when the last
    /// node of an odd level is paired with itself.
    Internal {
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
}

/// Arena entry of the merkle tree.
///
/// Children and parent are plain indices into the owning arena, the parent
/// link is only followed to propagate completion upwards.
#[derive(Debug)]
pub struct Node<T: Element> {
    kind: NodeKind,
    parent: Option<usize>,
    hash: OnceLock<T>,
    state: AtomicU8,
    computations: AtomicUsize,
}

impl<T: Element> Node<T> {
    pub(crate) fn leaf(payload: Vec<u8>) -> Node<T> {
        Node::with_kind(NodeKind::Leaf(payload))
    }

    pub(crate) fn internal(left: usize, right: usize) -> Node<T> {
        Node::with_kind(NodeKind::Internal { left, right })
    }

    fn with_kind(kind: NodeKind) -> Node<T> {
        Node {
            kind,
            parent: None,
            hash: OnceLock::new(),
            state: AtomicU8::new(NodeState::Pending as u8),
            computations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: usize) {
        self.parent = Some(parent);
    }

    /// Returns what this node hashes.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns `true` for leaf nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Returns the parent index, `None` for the root.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Returns the current scheduling state.
    pub fn state(&self) -> NodeState {
        NodeState::from(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` once the hash has been published.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state() == NodeState::Done
    }

    /// Returns the node hash, `None` until the node is done.
    pub fn hash(&self) -> Option<&T> {
        if self.is_done() {
            self.hash.get()
        } else {
            None
        }
    }

    /// Number of times this node's digest was computed.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Moves the node from `Pending` to `Claimed`. Only one caller ever
    /// observes `true`.
    pub fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(
                NodeState::Pending as u8,
                NodeState::Claimed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Bumps the computation counter; called right before the digest runs.
    pub(crate) fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    /// Writes the hash and then publishes `Done`.
    pub(crate) fn complete(&self, hash: T) -> Result<()> {
        ensure!(
            self.state() == NodeState::Claimed,
            "node completed in state {:?}",
            self.state()
        );
        ensure!(self.hash.set(hash).is_ok(), "node hash written twice");
        self.state.store(NodeState::Done as u8, Ordering::Release);
        Ok(())
    }
}

use std::ops;

use anyhow::{anyhow, Result as AnyResult};
use log::trace;

use crate::error::{Error, Result};
use crate::hash::{Algorithm, Element};
use crate::node::{Node, NodeKind};

/// Merkle tree shape.
///
/// All leafs and nodes are stored in a linear array (vec), children and
/// parents are addressed by index.
///
/// ```text
///         root = h123c = h(h12 + hcc)
///        /                          \
///  h12 = h(h1 + h2)           hcc = h(h3 + h3)
///   /            \              /          \
/// h1 = h(d1)  h2 = h(d2)     h3 = h(d3)  (h3)
/// ```
///
/// In memory layout:
///
/// ```text
///     [h1 h2 h3 h12 hcc root]
/// ```
///
/// Leafs keep input order at the front and the root is always the last
/// element in the array. When a level has an odd number of nodes, the last
/// one is paired with itself: both child indices of its parent point at it.
#[derive(Debug)]
pub struct Tree<T: Element> {
    nodes: Vec<Node<T>>,
    leafs: usize,
    height: usize,
}

impl<T: Element> Tree<T> {
    /// Builds the tree shape from an ordered list of leaf payloads.
    ///
    /// Hashes are not computed here; every node starts `Pending`.
    pub fn from_leaves<D: AsRef<[u8]>, I: IntoIterator<Item = D>>(data: I) -> Result<Tree<T>> {
        let iter = data.into_iter();
        let mut nodes: Vec<Node<T>> = match iter.size_hint().0 {
            0 => Vec::new(),
            e => Vec::with_capacity(get_merkle_tree_len(e)),
        };

        nodes.extend(iter.map(|d| Node::leaf(d.as_ref().to_vec())));

        let leafs = nodes.len();
        if leafs == 0 {
            return Err(Error::EmptyInput);
        }

        let mut height = 1;
        let mut level_start = 0;
        let mut width = leafs;
        while width > 1 {
            let level_end = level_start + width;
            let mut i = level_start;
            while i < level_end {
                let left = i;
                let right = if i + 1 < level_end { i + 1 } else { i };

                let parent = nodes.len();
                nodes.push(Node::internal(left, right));
                nodes[left].set_parent(parent);
                if right != left {
                    nodes[right].set_parent(parent);
                }

                i += 2;
            }

            level_start = level_end;
            width = (width + 1) / 2;
            height += 1;
        }

        debug_assert_eq!(nodes.len(), get_merkle_tree_len(leafs));

        Ok(Tree {
            nodes,
            leafs,
            height,
        })
    }

    /// Returns the node at `index`.
    pub fn node(&self, index: usize) -> Option<&Node<T>> {
        self.nodes.get(index)
    }

    /// Returns all nodes, leafs first, root last.
    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    /// Returns the leaf nodes in input order.
    pub fn leaves(&self) -> &[Node<T>] {
        &self.nodes[..self.leafs]
    }

    /// Returns the index of the root node.
    pub fn root_index(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node<T> {
        &self.nodes[self.root_index()]
    }

    /// Returns number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`, a tree holds at least one leaf.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns number of levels, `1` for a single leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns original number of elements the tree was built upon.
    pub fn leafs(&self) -> usize {
        self.leafs
    }

    /// A node is ready when both of its children are done. Leaves are never
    /// ready: they are hashed during initialization, not scheduled.
    pub fn is_ready(&self, index: usize) -> bool {
        match self.nodes[index].kind() {
            NodeKind::Leaf(_) => false,
            NodeKind::Internal { left, right } if left == right => self.nodes[*left].is_done(),
            NodeKind::Internal { left, right } => {
                self.nodes[*left].is_done() && self.nodes[*right].is_done()
            }
        }
    }

    /// Claims `index` for processing if it is ready. Returns `true` only for
    /// the single caller that wins the claim; that caller must enqueue it.
    pub fn try_schedule(&self, index: usize) -> bool {
        if self.is_ready(index) && self.nodes[index].try_claim() {
            trace!("scheduled node {}", index);
            return true;
        }
        false
    }

    /// Hashes a claimed node and publishes the result.
    ///
    /// Leaves digest their payload, interior nodes the concatenation of
    /// their children's hashes.
    pub(crate) fn compute<A: Algorithm<T>>(&self, index: usize, alg: &mut A) -> AnyResult<()> {
        let node = &self.nodes[index];
        node.record_computation();

        let hash = match node.kind() {
            NodeKind::Leaf(payload) => alg.leaf(payload)?,
            NodeKind::Internal { left, right } => {
                let lhs = self.child_hash(*left)?;
                let rhs = self.child_hash(*right)?;
                alg.node(lhs, rhs)?
            }
        };

        node.complete(hash)
    }

    fn child_hash(&self, index: usize) -> AnyResult<&T> {
        self.nodes[index]
            .hash()
            .ok_or_else(|| anyhow!("child {} is not done", index))
    }
}

impl<T: Element> ops::Index<usize> for Tree<T> {
    type Output = Node<T>;

    fn index(&self, index: usize) -> &Node<T> {
        &self.nodes[index]
    }
}

/// Returns the number of nodes of a tree built over `leafs` leaves.
pub fn get_merkle_tree_len(leafs: usize) -> usize {
    assert!(leafs > 0);

    let mut len = leafs;
    let mut width = leafs;
    while width > 1 {
        width = (width + 1) / 2;
        len += width;
    }
    len
}

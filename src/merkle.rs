use std::marker::PhantomData;
use std::time::Instant;

use log::debug;

use crate::config::TreeConfig;
use crate::digest::{Sha256Algorithm, Sha256Hash};
use crate::error::{Error, NodeFailure, Result};
use crate::hash::{Algorithm, Element};
use crate::node::Node;
use crate::pool::WorkerPool;
use crate::queue::WorkQueue;
use crate::tree::Tree;

/// Merkle tree over SHA-256.
pub type Sha256MerkleTree = MerkleTree<Sha256Hash, Sha256Algorithm>;

/// Merkle Tree.
///
/// A merkle tree is a tree in which every non-leaf node is the hash of its
/// children nodes. A diagram depicting how it works:
///
/// ```text
///         root = h1234 = h(h12 + h34)
///        /                           \
///  h12 = h(h1 + h2)            h34 = h(h3 + h4)
///   /            \              /            \
/// h1 = h(tx1)  h2 = h(tx2)    h3 = h(tx3)  h4 = h(tx4)
/// ```
///
/// Interior nodes are hashed by a pool of workers as soon as both children
/// are known, so the order in which they are computed is arbitrary. The root
/// only depends on the leaves and the [`Algorithm`], never on the number of
/// threads.
#[derive(Debug)]
pub struct MerkleTree<T, A>
where
    T: Element,
    A: Algorithm<T>,
{
    tree: Tree<T>,

    // Cache with the `root` of the tree.
    root: T,

    _a: PhantomData<A>,
}

impl<T: Element, A: Algorithm<T>> MerkleTree<T, A> {
    /// Creates new merkle tree from a list of leaf payloads with the default
    /// [`TreeConfig`].
    pub fn new<D: AsRef<[u8]>, I: IntoIterator<Item = D>>(data: I) -> Result<MerkleTree<T, A>> {
        Self::from_config(data, &TreeConfig::default())
    }

    /// Creates new merkle tree from a list of leaf payloads using
    /// `thread_count` workers.
    pub fn build<D: AsRef<[u8]>, I: IntoIterator<Item = D>>(
        data: I,
        thread_count: usize,
    ) -> Result<MerkleTree<T, A>> {
        Self::from_config(data, &TreeConfig::new(thread_count))
    }

    /// Creates new merkle tree from a list of leaf payloads.
    ///
    /// Fails with [`Error::EmptyInput`] when `data` is empty. Digest failures
    /// of all nodes are collected into [`Error::DigestFailure`]; a tree is only
    /// returned when every node, the root included, has been hashed.
    pub fn from_config<D: AsRef<[u8]>, I: IntoIterator<Item = D>>(
        data: I,
        config: &TreeConfig,
    ) -> Result<MerkleTree<T, A>> {
        config.validate()?;

        let tree = Tree::from_leaves(data)?;
        let pool = WorkerPool::new(config)?;
        let start = Instant::now();

        let mut failures = pool.hash_leaves::<T, A>(&tree)?;

        let queue = WorkQueue::new();
        for leaf in tree.leaves() {
            if let Some(parent) = leaf.parent() {
                if tree.try_schedule(parent) {
                    queue.push(parent);
                }
            }
        }
        debug!(
            "hashed {} leafs, {} nodes ready for {} workers",
            tree.leafs(),
            queue.len(),
            pool.threads()
        );

        let reports = pool.run::<T, A>(&tree, &queue)?;
        failures.extend(reports.into_iter().flat_map(|r| r.failures));

        debug!(
            "built tree of {} nodes (height {}) in {:?}",
            tree.len(),
            tree.height(),
            start.elapsed()
        );

        Self::finish(tree, failures)
    }

    fn finish(tree: Tree<T>, mut failures: Vec<NodeFailure>) -> Result<MerkleTree<T, A>> {
        if !failures.is_empty() {
            failures.sort_by_key(|f| f.node);
            return Err(Error::DigestFailure(failures));
        }

        let root = match tree.root().hash() {
            Some(root) => root.clone(),
            None => {
                return Err(Error::PoolFailure(format!(
                    "root node {} was not completed",
                    tree.root_index()
                )))
            }
        };

        Ok(MerkleTree {
            tree,
            root,
            _a: PhantomData,
        })
    }

    /// Returns merkle root
    #[inline]
    pub fn root(&self) -> T {
        self.root.clone()
    }

    /// Returns number of elements in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns height of the tree
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns original number of elements the tree was built upon.
    pub fn leafs(&self) -> usize {
        self.tree.leafs()
    }

    /// Returns the node at `index`; leafs come first, the root is last.
    pub fn node(&self, index: usize) -> Option<&Node<T>> {
        self.tree.node(index)
    }

    /// Returns all nodes.
    pub fn nodes(&self) -> &[Node<T>] {
        self.tree.nodes()
    }
}

/// Computes the merkle root of `data` using `thread_count` workers.
pub fn root_hash<T, A, D, I>(data: I, thread_count: usize) -> Result<T>
where
    T: Element,
    A: Algorithm<T>,
    D: AsRef<[u8]>,
    I: IntoIterator<Item = D>,
{
    MerkleTree::<T, A>::build(data, thread_count).map(|t| t.root())
}

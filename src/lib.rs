//! _Merkle Tree_ root computation over a fixed pool of workers.
//!
//! Merkle tree (MT) built as a complete binary tree over an arena of nodes
//! addressed by index. Leafs are hashed first, then interior nodes are hashed
//! by parallel workers in dependency order: a node is scheduled by whichever
//! worker completes its last child, and an atomic claim guarantees it is
//! hashed exactly once. There is no central coordinator and the root digest
//! is the same for any number of threads.
//!
//! Encoding:
//!
//! ```text
//! leaf(d)        = ALG(d)
//! node(l, r)     = ALG(l || r)
//! ```
//!
//! At each level nodes are paired consecutively; when a level has an odd
//! number of nodes the last one is paired with itself, `node(x, x)`. A
//! single leaf is its own root.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Implementation choices
//!
//! The hashing algorithm is an interface: [`Algorithm`] complements
//! [`std::hash::Hasher`] with a fallible `hash` and a `reset`, so any digest
//! can be plugged in. Each worker owns its own instance created with
//! `Default`.
//!
//! Scheduling state of every node is a single atomic
//! (`Pending -> Claimed -> Done`). The only shared mutable structure besides
//! the nodes is the [`WorkQueue`].
//!
//! # Interface
//!
//! ```text
//! - build (leaves, thread_count) -> tree | error
//! - root -> hash
//! ```
//!
//! # Quick start
//!
//! ```
//! use merkle_cascade::{Sha256MerkleTree, TreeConfig};
//!
//! let leaves = vec!["a", "b", "c"];
//! let t = Sha256MerkleTree::build(&leaves, 4).unwrap();
//! let u = Sha256MerkleTree::from_config(&leaves, &TreeConfig::new(1)).unwrap();
//! assert_eq!(t.root(), u.root());
//! assert_eq!(t.leafs(), 3);
//! ```

#![deny(
    missing_docs,
    missing_debug_implementations,
    unsafe_code,
    unstable_features,
    unused_import_braces
)]

/// Hash infrastructure for items in Merkle tree.
pub mod hash;

/// Digest functions.
pub mod digest;

/// Tree construction errors.
pub mod error;

/// Tree construction settings.
pub mod config;

/// Arena node and its scheduling state.
pub mod node;

/// Tree shape and readiness tracking.
pub mod tree;

/// Queue of nodes ready to be hashed.
pub mod queue;

/// Worker pool.
pub mod pool;

/// Merkle tree abstractions, implementation and algorithms.
pub mod merkle;

pub use crate::config::TreeConfig;
pub use crate::digest::{Sha256Algorithm, Sha256Hash};
pub use crate::error::{Error, NodeFailure, Result};
pub use crate::hash::{Algorithm, Element};
pub use crate::merkle::{root_hash, MerkleTree, Sha256MerkleTree};
pub use crate::node::{Node, NodeKind, NodeState};
pub use crate::queue::WorkQueue;

#[cfg(feature = "ring")]
pub use crate::digest::RingSha256Algorithm;

#[cfg(test)]
mod test_common;


/// Tests for Merkle Hasher Customization
#[cfg(test)]
mod test_cmh;

use thiserror::Error;

/// Result type returned by tree construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Tree construction error.
#[derive(Debug, Error)]
pub enum Error {
    /// No leaves were supplied.
    #[error("cannot build a merkle tree without leaves")]
    EmptyInput,

    /// The worker pool was configured with zero threads.
    #[error("thread count must be at least 1")]
    InvalidThreadCount,

    /// The digest function failed for one or more nodes.
    #[error("digest failed for {} node(s): {}", .0.len(), summary(.0))]
    DigestFailure(Vec<NodeFailure>),

    /// The worker pool could not run to completion.
    #[error("worker pool failure: {0}")]
    PoolFailure(String),
}

/// Digest failure of a single node.
#[derive(Debug, Error)]
#[error("node {node}: {source}")]
pub struct NodeFailure {
    /// Arena index of the failed node.
    pub node: usize,
    /// Worker that processed the node, `None` for the leaf hashing pass.
    pub worker: Option<usize>,
    /// Error raised by the digest function.
    #[source]
    pub source: anyhow::Error,
}

fn summary(failures: &[NodeFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

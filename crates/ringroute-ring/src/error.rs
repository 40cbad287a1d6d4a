//! Error types for ring operations.

/// Errors returned by [`HashRing`](crate::HashRing) operations.
///
/// Every variant is a usage error: the ring is left exactly as it was before
/// the failed call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// A key was routed while no node is registered.
    #[error("cannot route on an empty ring")]
    EmptyRing,

    /// The node to remove is not registered.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// A node with the same key is already registered.
    #[error("node already registered: {0}")]
    DuplicateNode(String),

    /// The requested virtual node count is not positive.
    #[error("invalid replica count {0}, must be at least 1")]
    InvalidReplicaCount(usize),
}

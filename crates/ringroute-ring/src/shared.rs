//! Thread-safe ring handle.
//!
//! [`SharedRing`] is the read-mostly wrapper services hold when several
//! threads route keys while membership changes underneath: any number of
//! concurrent `route` calls share the read lock, and `add_node` /
//! `remove_node` take the write lock for their whole duration.

use parking_lot::RwLock;

use crate::error::RingError;
use crate::hash::{Blake3Hash, HashFunction};
use crate::node::Node;
use crate::ring::HashRing;

/// A [`HashRing`] behind a reader/writer lock.
pub struct SharedRing<N, H = Blake3Hash> {
    ring: RwLock<HashRing<N, H>>,
}

impl<N, H> SharedRing<N, H> {
    /// Wrap an existing ring.
    pub fn new(ring: HashRing<N, H>) -> Self {
        Self {
            ring: RwLock::new(ring),
        }
    }

    /// Return the number of physical nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.ring.read().node_count()
    }

    /// Return the total number of vnodes in the ring.
    pub fn vnode_count(&self) -> usize {
        self.ring.read().vnode_count()
    }

    /// Unwrap the ring.
    pub fn into_inner(self) -> HashRing<N, H> {
        self.ring.into_inner()
    }
}

impl<N: Node + Clone, H: HashFunction> SharedRing<N, H> {
    /// Route a key, returning a clone of the owning node.
    ///
    /// The node is cloned because it cannot outlive the read guard; share
    /// heavy nodes as `Arc<T>`.
    pub fn route(&self, key: &str) -> Result<N, RingError> {
        self.ring.read().route(key).cloned()
    }

    /// Add a node under the write lock.
    pub fn add_node(&self, node: N, replicas: usize) -> Result<(), RingError> {
        self.ring.write().add_node(node, replicas)
    }

    /// Remove a node under the write lock.
    pub fn remove_node(&self, node: &N) -> Result<N, RingError> {
        self.ring.write().remove_node(node)
    }

    /// Return a clone of the current ring, for diagnostics and diffs.
    pub fn snapshot(&self) -> HashRing<N, H>
    where
        H: Clone,
    {
        self.ring.read().clone()
    }
}

impl<N, H> From<HashRing<N, H>> for SharedRing<N, H> {
    fn from(ring: HashRing<N, H>) -> Self {
        Self::new(ring)
    }
}

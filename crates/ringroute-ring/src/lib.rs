//! Consistent hashing ring for routing string keys to nodes.
//!
//! This crate implements a consistent hash ring that maps arbitrary keys onto
//! a dynamic set of nodes. Adding or removing a node only reassigns the keys
//! that fall into the arcs the node gains or loses; every other key keeps its
//! owner.
//!
//! The ring uses virtual nodes (vnodes): each physical node gets `replicas`
//! positions on the ring, determined by `hash("{key}-{vnode_index}")`.
//! More vnodes per node = more uniform distribution.
//!
//! Nodes are anything implementing [`Node`] (a stable, unique key string) and
//! the hash is any [`HashFunction`]; [`Blake3Hash`] is the default.
//!
//! ```
//! use ringroute_ring::HashRing;
//!
//! let mut ring = HashRing::new(vec!["tN-a".to_string(), "tN-b".to_string()], 10)?;
//! let owner = ring.route("t-xyz")?.clone();
//!
//! ring.add_node("tN-c".to_string(), 10)?;
//! let after = ring.route("t-xyz")?;
//! assert!(after == &owner || after == "tN-c");
//! # Ok::<(), ringroute_ring::RingError>(())
//! ```

mod error;
mod hash;
mod node;
mod ring;
mod shared;


pub use error::RingError;
pub use hash::{Blake3Hash, HashAlgorithm, HashFunction, Xxh3Hash};
pub use node::Node;
pub use ring::{HashRing, Reassignment, VirtualNode};
pub use shared::SharedRing;

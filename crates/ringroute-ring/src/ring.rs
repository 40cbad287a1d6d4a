//! Consistent hashing ring implementation.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::RingError;
use crate::hash::{Blake3Hash, HashFunction};
use crate::node::Node;

/// One virtual node, as yielded by [`HashRing::vnodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualNode<'a> {
    /// Position on the ring.
    pub position: u64,
    /// Key of the physical node owning this position.
    pub owner: &'a str,
}

/// A key whose owner differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The routed key.
    pub key: String,
    /// Owner in the old ring (`None` if it was empty).
    pub from: Option<String>,
    /// Owner in the new ring (`None` if it is empty).
    pub to: Option<String>,
}

/// A registered node and the positions it holds.
#[derive(Debug, Clone)]
struct Registration<N> {
    node: N,
    positions: Vec<u64>,
}

/// Consistent hashing ring routing string keys to nodes.
///
/// Each node is mapped to `replicas` virtual nodes (vnodes) on a `u64` ring.
/// A key is routed to the owner of the first vnode at or after the key's
/// position, wrapping around past `u64::MAX`.
///
/// Two vnodes of different nodes may hash to the same position. Both are
/// kept, ordered by owner key, and the smallest owner key answers for that
/// position. Removing it hands the position to the next owner in line, so
/// the outcome never depends on insertion order.
///
/// Adding a key that is already registered fails with
/// [`RingError::DuplicateNode`]; nodes are never replaced implicitly.
#[derive(Clone)]
pub struct HashRing<N, H = Blake3Hash> {
    /// Ring position -> owner keys at that position, sorted ascending.
    vnodes: BTreeMap<u64, Vec<Arc<str>>>,
    /// Registered nodes by key.
    nodes: HashMap<Arc<str>, Registration<N>>,
    /// Places vnodes and keys on the ring.
    hasher: H,
    /// Vnode count used by [`add_node_default`](Self::add_node_default).
    replicas: usize,
}

impl<N: Node> HashRing<N, Blake3Hash> {
    /// Build a ring from `nodes`, each with `replicas` vnodes, using BLAKE3.
    pub fn new<I>(nodes: I, replicas: usize) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = N>,
    {
        Self::with_hasher(nodes, replicas, Blake3Hash)
    }
}

impl<N: Node, H: HashFunction> HashRing<N, H> {
    /// Build a ring from `nodes`, each with `replicas` vnodes, placed by
    /// `hasher`.
    ///
    /// Fails if `replicas` is zero or two nodes share a key.
    pub fn with_hasher<I>(nodes: I, replicas: usize, hasher: H) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = N>,
    {
        if replicas == 0 {
            return Err(RingError::InvalidReplicaCount(replicas));
        }

        let mut ring = Self {
            vnodes: BTreeMap::new(),
            nodes: HashMap::new(),
            hasher,
            replicas,
        };
        for node in nodes {
            ring.add_node(node, replicas)?;
        }
        Ok(ring)
    }

    /// Add a node with `replicas` vnodes at `hash("{key}-{i}")`.
    ///
    /// If two of the node's own vnodes hash to the same position, the second
    /// is skipped and the node holds one position fewer.
    pub fn add_node(&mut self, node: N, replicas: usize) -> Result<(), RingError> {
        if replicas == 0 {
            return Err(RingError::InvalidReplicaCount(replicas));
        }
        if self.nodes.contains_key(node.key()) {
            return Err(RingError::DuplicateNode(node.key().to_string()));
        }

        let key: Arc<str> = Arc::from(node.key());
        let mut positions = Vec::with_capacity(replicas);

        for i in 0..replicas {
            let pos = vnode_position(&self.hasher, &key, i);
            let owners = self.vnodes.entry(pos).or_default();
            // The key is new, so a hit can only be one of our own vnodes.
            if let Err(idx) = owners.binary_search(&key) {
                if !owners.is_empty() {
                    debug!(node = %key, position = pos, "vnode position collision");
                }
                owners.insert(idx, Arc::clone(&key));
                positions.push(pos);
            }
        }

        debug!(node = %key, replicas, vnodes = positions.len(), "added node to ring");
        self.nodes.insert(key, Registration { node, positions });
        Ok(())
    }

    /// Add a node with the vnode count the ring was built with.
    pub fn add_node_default(&mut self, node: N) -> Result<(), RingError> {
        self.add_node(node, self.replicas)
    }

    /// Remove a node and all of its vnodes, returning the registered value.
    pub fn remove_node(&mut self, node: &N) -> Result<N, RingError> {
        self.remove_key(node.key())
    }

    /// Remove the node registered under `key`.
    pub fn remove_key(&mut self, key: &str) -> Result<N, RingError> {
        let (owner, registration) = self
            .nodes
            .remove_entry(key)
            .ok_or_else(|| RingError::NodeNotFound(key.to_string()))?;

        for pos in &registration.positions {
            if let Entry::Occupied(mut slot) = self.vnodes.entry(*pos) {
                slot.get_mut().retain(|o| *o != owner);
                if slot.get().is_empty() {
                    slot.remove();
                }
            }
        }

        debug!(node = %owner, vnodes = registration.positions.len(), "removed node from ring");
        Ok(registration.node)
    }

    /// Route a string key to its owning node.
    pub fn route(&self, key: &str) -> Result<&N, RingError> {
        self.route_bytes(key.as_bytes())
    }

    /// Route a raw byte key to its owning node.
    pub fn route_bytes(&self, key: &[u8]) -> Result<&N, RingError> {
        let pos = self.hasher.hash(key);
        self.owner_at(pos)
            .and_then(|owner| self.nodes.get(owner))
            .map(|registration| &registration.node)
            .ok_or(RingError::EmptyRing)
    }

    /// Number of vnodes held by `node` (0 if it is not registered).
    pub fn existing_replicas(&self, node: &N) -> usize {
        self.nodes
            .get(node.key())
            .map_or(0, |registration| registration.positions.len())
    }

    /// Whether a node with the same key is registered.
    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains_key(node.key())
    }

    /// Compute which keys change owner between two ring states.
    ///
    /// Keys are routed in both rings; every key whose owner differs yields a
    /// [`Reassignment`], in input order.
    pub fn diff<S: AsRef<str>>(old: &Self, new: &Self, keys: &[S]) -> Vec<Reassignment> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                let from = old.route(key).ok().map(|n| n.key().to_string());
                let to = new.route(key).ok().map(|n| n.key().to_string());
                (from != to).then(|| Reassignment {
                    key: key.to_string(),
                    from,
                    to,
                })
            })
            .collect()
    }
}

impl<N, H> HashRing<N, H> {
    /// Owner key of the first vnode at or after `pos`, wrapping around.
    fn owner_at(&self, pos: u64) -> Option<&str> {
        self.vnodes
            .range(pos..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .and_then(|(_, owners)| owners.first())
            .map(|owner| &**owner)
    }

    /// Iterate over all vnodes in ring order.
    ///
    /// Colliding vnodes share a position and appear in owner-key order; the
    /// first one is the one that routes.
    pub fn vnodes(&self) -> impl Iterator<Item = VirtualNode<'_>> {
        self.vnodes.iter().flat_map(|(pos, owners)| {
            owners.iter().map(move |owner| VirtualNode {
                position: *pos,
                owner: &**owner,
            })
        })
    }

    /// Iterate over the registered nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.values().map(|registration| &registration.node)
    }

    /// Return the number of physical nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the total number of vnodes in the ring.
    pub fn vnode_count(&self) -> usize {
        self.nodes.values().map(|r| r.positions.len()).sum()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The vnode count the ring was built with.
    pub fn default_replicas(&self) -> usize {
        self.replicas
    }
}

impl<N, H> fmt::Debug for HashRing<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("nodes", &self.node_count())
            .field("vnodes", &self.vnode_count())
            .field("replicas", &self.replicas)
            .finish_non_exhaustive()
    }
}

/// Renders the vnode table, one `position owner` line per vnode.
impl<N, H> fmt::Display for HashRing<N, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for vnode in self.vnodes() {
            writeln!(f, "{:#018x} {}", vnode.position, vnode.owner)?;
        }
        Ok(())
    }
}

/// Compute a vnode's position on the ring: `hash("{key}-{vnode_index}")`.
fn vnode_position<H: HashFunction>(hasher: &H, key: &str, vnode_index: usize) -> u64 {
    hasher.hash(format!("{key}-{vnode_index}").as_bytes())
}

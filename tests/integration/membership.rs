//! Integration test: adding and removing nodes.
//!
//! Start from a small ring, change membership, and verify that only the
//! keys in the affected arcs change owner.

use ringroute_integration_tests::{TopicNode, routes, sample_keys, topic_nodes};
use ringroute_ring::{HashRing, Node, RingError};

/// Removing B from {A, B, C} only moves keys that B owned.
#[test]
fn test_remove_only_moves_removed_nodes_keys() {
    let nodes = topic_nodes("n-", 3);
    let b = nodes[1].clone();
    let mut ring = HashRing::new(nodes, 10).unwrap();

    let keys = sample_keys(5_000, 10);
    let before = routes(&ring, &keys);

    let removed = ring.remove_node(&b).unwrap();
    assert_eq!(removed.key(), "n-1");

    let after = routes(&ring, &keys);
    for ((key, old), new) in keys.iter().zip(&before).zip(&after) {
        if old == "n-1" {
            assert_ne!(new, "n-1", "{key} still routed to the removed node");
        } else {
            assert_eq!(old, new, "{key} moved from {old} to {new}");
        }
    }
}

/// Adding D only moves keys to D.
#[test]
fn test_add_only_moves_keys_to_new_node() {
    let mut ring = HashRing::new(topic_nodes("n-", 3), 10).unwrap();
    let keys = sample_keys(5_000, 11);
    let old = ring.clone();

    ring.add_node(TopicNode::new("n-new"), 10).unwrap();

    let moves = HashRing::diff(&old, &ring, &keys);
    assert!(!moves.is_empty());
    for m in &moves {
        assert_eq!(m.to.as_deref(), Some("n-new"), "{} moved elsewhere", m.key);
    }

    let before = routes(&old, &keys);
    let after = routes(&ring, &keys);
    let changed = before.iter().zip(&after).filter(|(b, a)| b != a).count();
    assert_eq!(changed, moves.len());
}

/// Adding then removing the same node restores every routing.
#[test]
fn test_add_then_remove_restores_routing() {
    let mut ring = HashRing::new(topic_nodes("n-", 4), 16).unwrap();
    let keys = sample_keys(2_000, 12);
    let before = routes(&ring, &keys);
    let table = ring.to_string();

    let extra = TopicNode::new("n-extra");
    ring.add_node(extra.clone(), 16).unwrap();
    ring.remove_node(&extra).unwrap();

    assert_eq!(routes(&ring, &keys), before);
    assert_eq!(ring.to_string(), table);
}

/// Removing an absent node fails and changes nothing.
#[test]
fn test_removing_absent_node_is_rejected() {
    let nodes = topic_nodes("n-", 3);
    let a = nodes[0].clone();
    let mut ring = HashRing::new(nodes, 10).unwrap();
    ring.remove_node(&a).unwrap();

    let keys = sample_keys(1_000, 13);
    let before = routes(&ring, &keys);
    let size = ring.vnode_count();

    assert_eq!(
        ring.remove_node(&a).unwrap_err(),
        RingError::NodeNotFound("n-0".to_string())
    );
    assert_eq!(ring.vnode_count(), size);
    assert_eq!(routes(&ring, &keys), before);
}

/// Re-adding a registered key is rejected; the ring keeps the original node.
#[test]
fn test_duplicate_add_is_rejected() {
    let mut ring = HashRing::new(topic_nodes("n-", 2), 10).unwrap();

    let err = ring.add_node(TopicNode::new("n-0"), 50).unwrap_err();
    assert_eq!(err, RingError::DuplicateNode("n-0".to_string()));
    assert_eq!(ring.existing_replicas(&TopicNode::new("n-0")), 10);
    assert_eq!(ring.vnode_count(), 20);
}

/// The walkthrough: three nodes, one key, a fourth node joins.
#[test]
fn test_key_moves_only_when_new_node_claims_it() {
    let mut ring = HashRing::new(
        ["tN-a", "tN-b", "tN-c"].map(TopicNode::new),
        10,
    )
    .unwrap();
    let before = ring.route("t-xyz").unwrap().key().to_string();

    let d = TopicNode::new("tN-d");
    ring.add_node(d.clone(), 10).unwrap();
    let after = ring.route("t-xyz").unwrap().key().to_string();

    assert!(after == before || after == "tN-d", "{before} -> {after}");

    // Taking D out again returns the key to its old owner.
    ring.remove_node(&d).unwrap();
    assert_eq!(ring.route("t-xyz").unwrap().key(), before);
}

/// Draining the ring node by node ends with an empty, unroutable ring.
#[test]
fn test_drain_to_empty() {
    let nodes = topic_nodes("n-", 3);
    let mut ring = HashRing::new(nodes.clone(), 5).unwrap();

    for node in &nodes {
        assert!(ring.route("k").is_ok());
        ring.remove_node(node).unwrap();
    }

    assert!(ring.is_empty());
    assert_eq!(ring.vnode_count(), 0);
    assert_eq!(ring.route("k").unwrap_err(), RingError::EmptyRing);
}

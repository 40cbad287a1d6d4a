//! Integration test: routing properties of a static ring.
//!
//! Determinism, coverage, vnode accounting and balance across hash
//! functions.

use std::collections::{HashMap, HashSet};

use ringroute_integration_tests::{routes, sample_keys, topic_nodes};
use ringroute_ring::{HashAlgorithm, HashRing, Node, Xxh3Hash};

/// Same ring state, same key: same node, every time.
#[test]
fn test_routing_is_deterministic() {
    let ring = HashRing::new(topic_nodes("n-", 5), 20).unwrap();
    let keys = sample_keys(1_000, 1);

    assert_eq!(routes(&ring, &keys), routes(&ring, &keys));

    // An independently built ring with the same membership agrees.
    let twin = HashRing::new(topic_nodes("n-", 5).into_iter().rev(), 20).unwrap();
    assert_eq!(routes(&ring, &keys), routes(&twin, &keys));
}

/// Every key lands on a registered node.
#[test]
fn test_every_key_is_covered() {
    let nodes = topic_nodes("n-", 7);
    let registered: HashSet<String> = nodes.iter().map(|n| n.key().to_string()).collect();
    let ring = HashRing::with_hasher(nodes, 3, Xxh3Hash).unwrap();

    for owner in routes(&ring, &sample_keys(5_000, 2)) {
        assert!(registered.contains(&owner), "{owner} is not registered");
    }
}

/// N nodes with R replicas give N * R vnodes in sorted order, and every
/// owner holds exactly R of them.
#[test]
fn test_vnode_count_matches_replication() {
    let ring = HashRing::new(topic_nodes("n-", 8), 25).unwrap();
    assert_eq!(ring.vnode_count(), 8 * 25);

    let vnodes: Vec<_> = ring.vnodes().collect();
    assert_eq!(vnodes.len(), 200);
    assert!(
        vnodes
            .windows(2)
            .all(|w| (w[0].position, w[0].owner) < (w[1].position, w[1].owner)),
        "vnodes must be strictly ordered by (position, owner)"
    );

    let mut per_owner: HashMap<&str, usize> = HashMap::new();
    for v in &vnodes {
        *per_owner.entry(v.owner).or_default() += 1;
    }
    assert_eq!(per_owner.len(), 8);
    assert!(per_owner.values().all(|&c| c == 25));
}

/// With enough vnodes, no node owns far more than its fair share.
#[test]
fn test_load_is_roughly_balanced() {
    for hash in [HashAlgorithm::Blake3, HashAlgorithm::Xxh3] {
        let ring = HashRing::with_hasher(topic_nodes("n-", 4), 160, hash).unwrap();

        let total = 20_000;
        let mut load: HashMap<String, usize> = HashMap::new();
        for owner in routes(&ring, &sample_keys(total, 3)) {
            *load.entry(owner).or_default() += 1;
        }

        assert_eq!(load.len(), 4, "{hash}: every node should own keys");
        for (node, count) in &load {
            let share = *count as f64 / total as f64;
            assert!(
                (0.15..=0.35).contains(&share),
                "{hash}: {node} owns {share:.2} of keys"
            );
        }
    }
}

/// Rebuilding the same ring repeatedly produces the same vnode table.
#[test]
fn test_vnode_table_is_stable_across_builds() {
    let first = HashRing::new(topic_nodes("n-", 3), 10).unwrap().to_string();
    for _ in 0..5 {
        let again = HashRing::new(topic_nodes("n-", 3), 10).unwrap().to_string();
        assert_eq!(first, again);
    }
}

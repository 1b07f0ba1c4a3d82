//! # Node Registry
//!
//! Known remote nodes with blacklist state and exclusion-aware sampling.
//!
//! The registry holds an immutable snapshot behind a lock. `replace_all`
//! swaps the whole snapshot, so a concurrent reader sees either the old set
//! or the new one, never a mix.

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

use super::entities::Node;

/// Registry of known nodes.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: RwLock<Arc<Vec<Node>>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with `nodes`.
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes: RwLock::new(Arc::new(dedup(nodes))),
        }
    }

    /// Atomically replace every known node.
    pub fn replace_all(&self, nodes: Vec<Node>) {
        let nodes = Arc::new(dedup(nodes));
        let count = nodes.len();
        *self.nodes.write() = nodes;
        debug!("[confirm] Registry replaced with {} nodes", count);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Node>> {
        Arc::clone(&self.nodes.read())
    }

    /// Number of known nodes.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// True when no node is known.
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Look up a node by address.
    pub fn get(&self, address: &str) -> Option<Node> {
        self.nodes.read().iter().find(|n| n.address == address).cloned()
    }

    /// Whether the node at `address` is currently blacklisted.
    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.nodes
            .read()
            .iter()
            .any(|n| n.address == address && n.is_blacklisted())
    }

    /// Flip the blacklist flag of a node. Returns false for unknown nodes.
    pub fn set_blacklisted(&self, address: &str, blacklisted: bool) -> bool {
        let mut guard = self.nodes.write();
        let nodes = Arc::make_mut(&mut *guard);
        match nodes.iter_mut().find(|n| n.address == address) {
            Some(node) => {
                node.blacklisted = blacklisted;
                true
            }
            None => false,
        }
    }

    /// Draw up to `count` distinct, non-blacklisted nodes whose address is
    /// not in `exclude`. Returns every eligible node when fewer exist.
    pub fn sample(&self, count: usize, exclude: &[&str]) -> Vec<Node> {
        self.sample_with(count, exclude, &mut rand::thread_rng())
    }

    /// [`NodeRegistry::sample`] with a caller-supplied RNG.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        exclude: &[&str],
        rng: &mut R,
    ) -> Vec<Node> {
        let snapshot = self.snapshot();
        let eligible: Vec<&Node> = snapshot
            .iter()
            .filter(|n| !n.is_blacklisted() && !exclude.contains(&n.address.as_str()))
            .collect();
        eligible
            .choose_multiple(rng, count)
            .map(|n| Node::clone(n))
            .collect()
    }
}

// Keep the first occurrence of each address.
fn dedup(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !out.iter().any(|n| n.address == node.address) {
            out.push(node);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|i| Node::new(format!("10.0.0.{}", i))).collect()
    }

    #[test]
    fn test_replace_all_swaps_snapshot() {
        let registry = NodeRegistry::with_nodes(nodes(3));
        let before = registry.snapshot();
        registry.replace_all(vec![Node::new("x")]);
        assert_eq!(before.len(), 3);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("x").is_some());
        assert!(registry.get("10.0.0.0").is_none());
    }

    #[test]
    fn test_replace_all_drops_duplicate_addresses() {
        let registry = NodeRegistry::new();
        registry.replace_all(vec![Node::new("a"), Node::new("a"), Node::new("b")]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sample_excludes_blacklisted_and_excluded() {
        let registry = NodeRegistry::with_nodes(nodes(5));
        assert!(registry.set_blacklisted("10.0.0.1", true));
        let picked = registry.sample(10, &["10.0.0.2"]);
        let addresses: HashSet<_> = picked.iter().map(|n| n.address.as_str()).collect();
        assert_eq!(addresses.len(), 3);
        assert!(!addresses.contains("10.0.0.1"));
        assert!(!addresses.contains("10.0.0.2"));
    }

    #[test]
    fn test_sample_returns_distinct_nodes() {
        let registry = NodeRegistry::with_nodes(nodes(10));
        let picked = registry.sample(4, &[]);
        let distinct: HashSet<_> = picked.iter().map(|n| n.address.clone()).collect();
        assert_eq!(picked.len(), 4);
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_sample_empty_registry() {
        let registry = NodeRegistry::new();
        assert!(registry.sample(3, &[]).is_empty());
    }

    #[test]
    fn test_blacklist_unknown_node() {
        let registry = NodeRegistry::with_nodes(nodes(1));
        assert!(!registry.set_blacklisted("nope", true));
        assert!(!registry.is_blacklisted("nope"));
    }

    #[test]
    fn test_blacklist_does_not_mutate_old_snapshot() {
        let registry = NodeRegistry::with_nodes(nodes(2));
        let before = registry.snapshot();
        registry.set_blacklisted("10.0.0.0", true);
        assert!(!before[0].blacklisted);
        assert!(registry.is_blacklisted("10.0.0.0"));
    }

    #[test]
    fn test_sample_is_near_uniform() {
        let registry = NodeRegistry::with_nodes(nodes(5));
        let mut rng = StdRng::seed_from_u64(7);
        let mut hits: HashMap<String, usize> = HashMap::new();
        for _ in 0..5000 {
            for node in registry.sample_with(2, &[], &mut rng) {
                *hits.entry(node.address).or_default() += 1;
            }
        }
        // Each node is expected 2000 times.
        assert_eq!(hits.len(), 5);
        for count in hits.values() {
            assert!((1700..2300).contains(count), "skewed count {}", count);
        }
    }

    proptest! {
        #[test]
        fn prop_sample_respects_exclusions(
            total in 0usize..30,
            count in 0usize..40,
            blacklisted in proptest::collection::vec(any::<bool>(), 30),
            excluded in 0usize..30,
        ) {
            let mut all = nodes(total);
            for (node, flag) in all.iter_mut().zip(blacklisted.iter()) {
                node.blacklisted = *flag;
            }
            let exclude = format!("10.0.0.{}", excluded);
            let eligible = all
                .iter()
                .filter(|n| !n.blacklisted && n.address != exclude)
                .count();
            let registry = NodeRegistry::with_nodes(all);

            let picked = registry.sample(count, &[exclude.as_str()]);
            prop_assert!(picked.len() <= count);
            prop_assert_eq!(picked.len(), count.min(eligible));
            for node in &picked {
                prop_assert!(!node.blacklisted);
                prop_assert_ne!(&node.address, &exclude);
            }
        }
    }
}

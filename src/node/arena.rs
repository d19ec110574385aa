//! Hash-consing arena: the single place that turns a freshly built [`Node`]
//! into a shared, canonical [`NodeRef`].
//!
//! No direct teacher equivalent — new design per spec.md §9 ("global mutable
//! state (atom table, arena)"). `dashmap` is a genuine teacher dependency
//! (see `protocol/rest/mod.rs`'s `IpRateLimiter`), reused here for the same
//! reason the teacher reaches for it: sharded reads/writes that never block
//! across disjoint keys, with no write lock taken on a cache hit.

use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

use super::{Node, NodeRef};

type Arena = DashMap<Node, NodeRef>;

static ARENA: OnceLock<Arena> = OnceLock::new();

fn arena() -> &'static Arena {
    ARENA.get_or_init(DashMap::new)
}

/// Returns the canonical [`NodeRef`] for `node`, inserting it if this is the
/// first time this exact structural value has been built.
pub fn canonical(node: Node) -> NodeRef {
    let arena = arena();
    if let Some(existing) = arena.get(&node) {
        return existing.clone();
    }
    let node_ref: NodeRef = Arc::new(node.clone());
    arena.entry(node).or_insert(node_ref).clone()
}

/// Number of distinct canonical nodes currently held in the arena. Exposed
/// for diagnostics and property tests only.
pub fn len() -> usize {
    arena().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{entity, number};

    #[test]
    fn canonical_returns_same_pointer_for_equal_input() {
        let before = len();
        let a = canonical(Node::Number(42.0));
        let b = canonical(Node::Number(42.0));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(len() <= before + 1);
    }

    #[test]
    fn entity_and_number_helpers_go_through_arena() {
        let e = entity("x").unwrap();
        let n = number(1.0);
        assert_ne!(e.kind(), n.kind());
    }
}

//! Structural fingerprint: a 32-hex Blake2b-128 digest of a node's flattened
//! content, independent of identity or insertion order.

use blake2::Blake2b;
use blake2::digest::consts::U16;
use blake2::Digest;

use super::{Node, NodeRef};

type Blake2b128 = Blake2b<U16>;

/// Flattens `node` into the canonical text form
/// `kind|L=label|V=value|F[k:child;...]|A[child,...]` described in spec.md
/// §4.2. STRUCT fields are already lex-sorted by construction, so no extra
/// sorting happens here.
pub fn flatten(node: &Node) -> String {
    let kind = node.kind().as_str();
    match node {
        Node::Entity { label } | Node::Var { label } => format!("{kind}|L={label}"),
        Node::Rel { label, args } | Node::Op { label, args } => {
            let joined = args.iter().map(|a| flatten(a)).collect::<Vec<_>>().join(",");
            format!("{kind}|L={label}|A[{joined}]")
        }
        Node::Struct { fields } => {
            let joined = fields
                .iter()
                .map(|(k, v)| format!("{k}:{}", flatten(v)))
                .collect::<Vec<_>>()
                .join(";");
            format!("{kind}|F[{joined}]")
        }
        Node::List { items } => {
            let joined = items.iter().map(|a| flatten(a)).collect::<Vec<_>>().join(",");
            format!("{kind}|A[{joined}]")
        }
        Node::Text(s) => format!("{kind}|V={s}"),
        Node::Number(n) => format!("{kind}|V={n:?}"),
        Node::Bool(b) => format!("{kind}|V={b}"),
        Node::Nil => kind.to_string(),
    }
}

/// Returns the 32-hex-character Blake2b-128 digest of `node`'s flattened form.
pub fn fingerprint(node: &Node) -> String {
    digest_str(&flatten(node))
}

/// Generic 32-hex-character Blake2b-128 digest of arbitrary canonical text —
/// used outside the node layer for plan digests and meta-input digests,
/// which hash a flattened textual representation rather than a `Node`.
pub fn digest_str(s: &str) -> String {
    let mut hasher = Blake2b128::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn fingerprint_ref(node: &NodeRef) -> String {
    fingerprint(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{entity, number, relation, struct_};

    #[test]
    fn fingerprint_is_stable_for_equal_nodes() {
        let a = entity("socrates").unwrap();
        let b = entity("socrates").unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_independent_of_struct_field_order() {
        let a = struct_(vec![("a", number(1.0)), ("b", number(2.0))]).unwrap();
        let b = struct_(vec![("b", number(2.0)), ("a", number(1.0))]).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_differs_for_distinct_relations() {
        let a = relation("IS_A", vec![entity("a").unwrap(), entity("b").unwrap()]).unwrap();
        let b = relation("IS_A", vec![entity("b").unwrap(), entity("a").unwrap()]).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_is_32_hex_chars() {
        let a = entity("x").unwrap();
        assert_eq!(fingerprint(&a).len(), 32);
    }
}

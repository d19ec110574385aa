//! Static relation/operator/field signature tables (spec.md §3.2).
//!
//! These tables are fixed at compile time and never mutated — grounded on
//! the teacher's `schema::catalog`, but here the catalog itself is closed:
//! the reasoning core does not register new relations at runtime, only the
//! ontology content (a stream of `REL` nodes) does, and unregistered labels
//! fall back to a permissive variadic signature rather than failing, so the
//! LOGIC/TEXT routes can mint ad-hoc predicates from user text.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::kinds::{Signature, Sort};

pub fn rel_signatures() -> &'static HashMap<&'static str, Signature> {
    static TABLE: OnceLock<HashMap<&'static str, Signature>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        for sig in [
            Signature { name: "IS_A", args: &[Sort::Thing, Sort::Type], returns: Sort::Prop },
            Signature { name: "PART_OF", args: &[Sort::Thing, Sort::Thing], returns: Sort::Prop },
            Signature { name: "CAUSE", args: &[Sort::Thing, Sort::Thing], returns: Sort::Prop },
            Signature { name: "EQUAL", args: &[Sort::Thing, Sort::Thing], returns: Sort::Prop },
            Signature { name: "code/DEFN", args: &[Sort::Thing, Sort::State], returns: Sort::Prop },
            Signature { name: "HAS_PROPERTY", args: &[Sort::Thing, Sort::Thing], returns: Sort::Prop },
            Signature { name: "SIMILAR_TO", args: &[Sort::Thing, Sort::Thing], returns: Sort::Prop },
        ] {
            m.insert(sig.name, sig);
        }
        m
    })
}

pub fn op_signatures() -> &'static HashMap<&'static str, Signature> {
    static TABLE: OnceLock<HashMap<&'static str, Signature>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        for sig in [
            Signature { name: "NORMALIZE", args: &[], returns: Sort::State },
            Signature { name: "INTENT", args: &[Sort::Text], returns: Sort::State },
            Signature { name: "STRUCTURE", args: &[Sort::Text], returns: Sort::State },
            Signature { name: "SEMANTICS", args: &[Sort::Text], returns: Sort::State },
            Signature { name: "CALCULUS", args: &[Sort::Text], returns: Sort::State },
            Signature { name: "INFER", args: &[], returns: Sort::State },
            Signature { name: "SUMMARIZE", args: &[], returns: Sort::State },
            Signature { name: "ANSWER", args: &[Sort::Text], returns: Sort::Answer },
            Signature { name: "STATE_QUERY", args: &[], returns: Sort::State },
            Signature { name: "MAP", args: &[Sort::Operator, Sort::List], returns: Sort::List },
            Signature { name: "REDUCE", args: &[Sort::Operator, Sort::List], returns: Sort::Any },
            Signature { name: "REWRITE", args: &[Sort::Thing], returns: Sort::Thing },
            Signature { name: "EXPAND", args: &[Sort::Thing], returns: Sort::List },
            Signature { name: "EXPLAIN", args: &[Sort::Thing], returns: Sort::Text },
            Signature { name: "code/EVAL_PURE", args: &[Sort::Thing], returns: Sort::Any },
        ] {
            m.insert(sig.name, sig);
        }
        m
    })
}

/// Declared sort of well-known `STRUCT` field names. Unknown fields default
/// to `Sort::Any` (spec.md §3.2).
pub fn field_signatures() -> &'static HashMap<&'static str, Sort> {
    static TABLE: OnceLock<HashMap<&'static str, Sort>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        m.insert("subject", Sort::Thing);
        m.insert("object", Sort::Thing);
        m.insert("action", Sort::Thing);
        m.insert("modifier", Sort::Thing);
        m.insert("relations", Sort::List);
        m.insert("negation", Sort::Bool);
        m.insert("question_focus", Sort::Thing);
        m.insert("sentence_type", Sort::Text);
        m.insert("language", Sort::Text);
        m.insert("answer", Sort::Text);
        m.insert("context", Sort::Context);
        m.insert("intent", Sort::Text);
        m.insert("tokens", Sort::List);
        m.insert("length", Sort::Number);
        m.insert("semantic_kind", Sort::Text);
        m.insert("has_math", Sort::Bool);
        m.insert("expression", Sort::Text);
        m.insert("result", Sort::Number);
        m.insert("equivalence", Sort::Text);
        m
    })
}

/// Looks up `name` in `rel_signatures`, falling back to a permissive
/// variadic-`Any` signature for labels minted dynamically by LOGIC/TEXT
/// routes rather than declared ahead of time.
pub fn rel_signature_or_default(name: &str) -> Signature {
    rel_signatures().get(name).cloned().unwrap_or(Signature {
        name: "",
        args: &[],
        returns: Sort::Prop,
    })
}

pub fn op_signature_or_default(name: &str) -> Signature {
    op_signatures().get(name).cloned().unwrap_or(Signature {
        name: "",
        args: &[],
        returns: Sort::Operator,
    })
}

pub fn field_sort(name: &str) -> Sort {
    field_signatures().get(name).copied().unwrap_or(Sort::Any)
}

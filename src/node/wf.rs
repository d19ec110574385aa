//! Well-formedness / typing checker (spec.md §4.5).

use super::error::NodeError;
use super::kinds::Sort;
use super::signatures::{field_sort, op_signature_or_default, rel_signature_or_default};
use super::{Node, NodeRef};

fn sort_compatible(expected: Sort, actual: Sort) -> bool {
    expected == Sort::Any || actual == Sort::Any || expected == actual
}

fn infer_sort(n: &Node) -> Sort {
    match n {
        Node::Entity { .. } => Sort::Thing,
        Node::Rel { .. } => Sort::Prop,
        Node::Op { .. } => Sort::Operator,
        Node::Struct { .. } => Sort::State,
        Node::List { .. } => Sort::List,
        Node::Text(_) => Sort::Text,
        Node::Number(_) => Sort::Number,
        Node::Bool(_) => Sort::Bool,
        Node::Var { .. } | Node::Nil => Sort::Any,
    }
}

/// Validates `n` against the static signature tables, recursing into
/// children. Returns the first violation found, depth-first,
/// left-to-right — mirroring the path-carrying `IllFormed` contract.
pub fn check(n: &NodeRef) -> Result<(), NodeError> {
    check_at(n, "$")
}

fn check_at(n: &NodeRef, path: &str) -> Result<(), NodeError> {
    match n.as_ref() {
        Node::Rel { label, args } => {
            let sig = rel_signature_or_default(label);
            if !sig.name.is_empty() && sig.args.len() != args.len() {
                return Err(NodeError::ArityMismatch {
                    name: label.to_string(),
                    expected: sig.args.len(),
                    got: args.len(),
                });
            }
            for (i, arg) in args.iter().enumerate() {
                if !sig.name.is_empty() {
                    let expected = sig.args[i];
                    let actual = infer_sort(arg);
                    if !sort_compatible(expected, actual) {
                        return Err(NodeError::IllFormed {
                            path: format!("{path}.args[{i}]"),
                            reason: format!(
                                "relation {label} expects {expected} at position {i}, got {actual}"
                            ),
                        });
                    }
                }
                check_at(arg, &format!("{path}.args[{i}]"))?;
            }
            Ok(())
        }
        Node::Op { label, args } => {
            let sig = op_signature_or_default(label);
            if !sig.name.is_empty() && sig.args.len() != args.len() {
                return Err(NodeError::ArityMismatch {
                    name: label.to_string(),
                    expected: sig.args.len(),
                    got: args.len(),
                });
            }
            for (i, arg) in args.iter().enumerate() {
                if !sig.name.is_empty() {
                    let expected = sig.args[i];
                    let actual = infer_sort(arg);
                    if !sort_compatible(expected, actual) {
                        return Err(NodeError::IllFormed {
                            path: format!("{path}.args[{i}]"),
                            reason: format!(
                                "operator {label} expects {expected} at position {i}, got {actual}"
                            ),
                        });
                    }
                }
                check_at(arg, &format!("{path}.args[{i}]"))?;
            }
            Ok(())
        }
        Node::Struct { fields } => {
            let mut prev: Option<&str> = None;
            for (key, value) in fields {
                if let Some(p) = prev {
                    if key.as_ref() <= p {
                        return Err(NodeError::IllFormed {
                            path: path.to_string(),
                            reason: format!("struct fields not strictly sorted at key {key}"),
                        });
                    }
                }
                prev = Some(key);
                let expected = field_sort(key);
                let actual = infer_sort(value);
                if !sort_compatible(expected, actual) {
                    return Err(NodeError::IllFormed {
                        path: format!("{path}.{key}"),
                        reason: format!("field {key} expects {expected}, got {actual}"),
                    });
                }
                check_at(value, &format!("{path}.{key}"))?;
            }
            Ok(())
        }
        Node::List { items } => {
            for (i, item) in items.iter().enumerate() {
                check_at(item, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        Node::Var { label } => {
            if !label.starts_with('?') {
                return Err(NodeError::IllFormed {
                    path: path.to_string(),
                    reason: format!("VAR label {label:?} must start with '?'"),
                });
            }
            Ok(())
        }
        Node::Entity { .. } | Node::Text(_) | Node::Number(_) | Node::Bool(_) | Node::Nil => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{entity, number, relation, struct_, text};

    #[test]
    fn well_formed_relation_passes() {
        let n = relation("IS_A", vec![entity("dog").unwrap(), entity("animal").unwrap()]).unwrap();
        assert!(check(&n).is_ok());
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let n = relation("IS_A", vec![entity("dog").unwrap()]).unwrap();
        assert!(matches!(check(&n), Err(NodeError::ArityMismatch { .. })));
    }

    #[test]
    fn unknown_relation_is_permissive() {
        let n = relation("chuva", vec![]).unwrap();
        assert!(check(&n).is_ok());
    }

    #[test]
    fn struct_field_sort_mismatch_rejected() {
        let n = struct_(vec![("negation", text("not a bool"))]).unwrap();
        assert!(check(&n).is_err());
    }

    #[test]
    fn struct_number_field_ok() {
        let n = struct_(vec![("result", number(4.0))]).unwrap();
        assert!(check(&n).is_ok());
    }
}

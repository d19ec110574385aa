//! JSON (de)serialization with the fixed key order from spec.md §4.4:
//! `kind, label, value, args, fields`.

use serde_json::{Map, Value};

use super::error::NodeError;
use super::{arena, Node, NodeRef};

/// Serializes `n` to JSON, emitting keys in the fixed order
/// `kind, label, value, args, fields` (omitting keys that don't apply to the
/// variant). STRUCT fields are emitted as a sub-object with lex-sorted keys.
pub fn to_json(n: &NodeRef) -> Value {
    let mut map = Map::new();
    map.insert("kind".to_string(), Value::String(n.kind().as_str().to_string()));
    match n.as_ref() {
        Node::Entity { label } | Node::Var { label } => {
            map.insert("label".to_string(), Value::String(label.to_string()));
        }
        Node::Rel { label, args } | Node::Op { label, args } => {
            map.insert("label".to_string(), Value::String(label.to_string()));
            map.insert(
                "args".to_string(),
                Value::Array(args.iter().map(to_json).collect()),
            );
        }
        Node::Struct { fields } => {
            let mut fobj = Map::new();
            for (k, v) in fields {
                fobj.insert(k.to_string(), to_json(v));
            }
            map.insert("fields".to_string(), Value::Object(fobj));
        }
        Node::List { items } => {
            map.insert(
                "args".to_string(),
                Value::Array(items.iter().map(to_json).collect()),
            );
        }
        Node::Text(s) => {
            map.insert("value".to_string(), Value::String(s.clone()));
        }
        Node::Number(v) => {
            map.insert(
                "value".to_string(),
                serde_json::Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null),
            );
        }
        Node::Bool(b) => {
            map.insert("value".to_string(), Value::Bool(*b));
        }
        Node::Nil => {}
    }
    Value::Object(map)
}

/// Deserializes a JSON value produced by [`to_json`] back into a canonical
/// node. Unknown/missing fields fall back to the variant's zero value.
pub fn from_json(v: &Value) -> Result<NodeRef, NodeError> {
    let obj = v
        .as_object()
        .ok_or_else(|| NodeError::ParseError("expected JSON object for Node".to_string()))?;
    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| NodeError::ParseError("missing 'kind'".to_string()))?;

    let label = || -> Result<String, NodeError> {
        obj.get("label")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| NodeError::ParseError(format!("{kind} node missing 'label'")))
    };
    let args = || -> Result<Vec<NodeRef>, NodeError> {
        obj.get("args")
            .and_then(Value::as_array)
            .map(|a| a.iter().map(from_json).collect::<Result<Vec<_>, _>>())
            .transpose()?
            .ok_or_else(|| NodeError::ParseError(format!("{kind} node missing 'args'")))
    };

    match kind {
        "ENTITY" => super::entity(&label()?),
        "VAR" => super::var(&label()?),
        "REL" => super::relation(&label()?, args()?),
        "OP" => super::operation(&label()?, args()?),
        "STRUCT" => {
            let fobj = obj
                .get("fields")
                .and_then(Value::as_object)
                .ok_or_else(|| NodeError::ParseError("STRUCT node missing 'fields'".to_string()))?;
            let mut fields = Vec::with_capacity(fobj.len());
            for (k, v) in fobj {
                fields.push((k.as_str(), from_json(v)?));
            }
            super::struct_(fields)
        }
        "LIST" => {
            let items = obj
                .get("args")
                .and_then(Value::as_array)
                .ok_or_else(|| NodeError::ParseError("LIST node missing 'args'".to_string()))?
                .iter()
                .map(from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(super::list_node(items))
        }
        "TEXT" => {
            let s = obj
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| NodeError::ParseError("TEXT node missing 'value'".to_string()))?;
            Ok(super::text(s))
        }
        "NUMBER" => {
            let n = obj
                .get("value")
                .and_then(Value::as_f64)
                .ok_or_else(|| NodeError::ParseError("NUMBER node missing 'value'".to_string()))?;
            Ok(super::number(n))
        }
        "BOOL" => {
            let b = obj
                .get("value")
                .and_then(Value::as_bool)
                .ok_or_else(|| NodeError::ParseError("BOOL node missing 'value'".to_string()))?;
            Ok(super::boolean(b))
        }
        "NIL" => Ok(arena::canonical(Node::Nil)),
        other => Err(NodeError::ParseError(format!("unknown node kind {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::normalize::normalize;
    use crate::node::{entity, fingerprint::fingerprint, number, relation, struct_};

    #[test]
    fn round_trip_is_fingerprint_equal() {
        let n = struct_(vec![
            ("subject", entity("dog").unwrap()),
            ("result", number(42.0)),
        ])
        .unwrap();
        let normalized = normalize(&n);
        let json = to_json(&normalized);
        let back = from_json(&json).unwrap();
        assert_eq!(fingerprint(&normalized), fingerprint(&back));
    }

    #[test]
    fn rel_round_trips() {
        let n = relation("IS_A", vec![entity("dog").unwrap(), entity("animal").unwrap()]).unwrap();
        let json = to_json(&n);
        let back = from_json(&json).unwrap();
        assert_eq!(fingerprint(&n), fingerprint(&back));
    }
}

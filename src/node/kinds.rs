//! Node kinds and the static sort lattice used for well-formedness checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of a LIU [`super::Node`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Entity,
    Rel,
    Op,
    Struct,
    List,
    Text,
    Number,
    Bool,
    Var,
    Nil,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Entity => "ENTITY",
            NodeKind::Rel => "REL",
            NodeKind::Op => "OP",
            NodeKind::Struct => "STRUCT",
            NodeKind::List => "LIST",
            NodeKind::Text => "TEXT",
            NodeKind::Number => "NUMBER",
            NodeKind::Bool => "BOOL",
            NodeKind::Var => "VAR",
            NodeKind::Nil => "NIL",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort (lightweight type) attached to a node for well-formedness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sort {
    Thing,
    Type,
    Prop,
    Operator,
    State,
    Context,
    Goal,
    Answer,
    Text,
    Number,
    Bool,
    List,
    Any,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Sort::Thing => "Thing",
            Sort::Type => "Type",
            Sort::Prop => "Prop",
            Sort::Operator => "Operator",
            Sort::State => "State",
            Sort::Context => "Context",
            Sort::Goal => "Goal",
            Sort::Answer => "Answer",
            Sort::Text => "Text",
            Sort::Number => "Number",
            Sort::Bool => "Bool",
            Sort::List => "List",
            Sort::Any => "Any",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arity + sort signature shared by `REL_SIGNATURES` and `OP_SIGNATURES`.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: &'static str,
    pub args: &'static [Sort],
    pub returns: Sort,
}

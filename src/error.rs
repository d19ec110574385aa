//! Crate-wide error taxonomy (spec.md §7), modeled on the teacher's
//! `protocol::error::InputLayerError`: one variant per taxonomy entry, with
//! `From` conversions from the narrower per-module error enums so call sites
//! can use `?` across module boundaries.

use thiserror::Error;

use crate::node::NodeError;
use crate::router::RouteError;
use crate::vm::VmError;

#[derive(Debug, Error, Clone)]
pub enum RuntimeError {
    #[error("invalid atom: {0}")]
    InvalidAtom(String),

    #[error("ill-formed node at {path}: {reason}")]
    IllFormed { path: String, reason: String },

    #[error("arity mismatch for {name}: expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("invalid bytecode: {0}")]
    InvalidBytecode(String),

    #[error("stack underflow executing {opcode}")]
    StackUnderflow { opcode: String },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("scheduler step budget ({budget}) exhausted")]
    BudgetExhausted { budget: u32 },

    #[error("inconsistent execution: {detail}")]
    InconsistentExecution { detail: String },

    #[error("route classification failed: {0}")]
    Route(String),
}

impl From<NodeError> for RuntimeError {
    fn from(e: NodeError) -> Self {
        match e {
            NodeError::InvalidAtom(s) => RuntimeError::InvalidAtom(s),
            NodeError::IllFormed { path, reason } => RuntimeError::IllFormed { path, reason },
            NodeError::ArityMismatch { name, expected, got } => {
                RuntimeError::ArityMismatch { name, expected, got }
            }
            NodeError::UnknownRelation(name) => {
                RuntimeError::IllFormed { path: "$".to_string(), reason: format!("unknown relation {name}") }
            }
            NodeError::UnknownOperator(name) => {
                RuntimeError::IllFormed { path: "$".to_string(), reason: format!("unknown operator {name}") }
            }
            NodeError::ParseError(s) => RuntimeError::ParseError(s),
        }
    }
}

impl From<VmError> for RuntimeError {
    fn from(e: VmError) -> Self {
        match e {
            VmError::InvalidBytecode(s) => RuntimeError::InvalidBytecode(s),
            VmError::StackUnderflow { opcode } => RuntimeError::StackUnderflow { opcode },
            VmError::TypeMismatch { expected, got } => RuntimeError::TypeMismatch { expected, got },
            VmError::Node(inner) => inner.into(),
        }
    }
}

impl From<RouteError> for RuntimeError {
    fn from(e: RouteError) -> Self {
        RuntimeError::Route(e.to_string())
    }
}

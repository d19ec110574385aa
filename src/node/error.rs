//! Errors raised by the LIU node layer (atoms, arena, well-formedness).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("invalid atom: {0:?}")]
    InvalidAtom(String),

    #[error("ill-formed node at {path}: {reason}")]
    IllFormed { path: String, reason: String },

    #[error("arity mismatch for {name}: expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("unknown relation signature: {0}")]
    UnknownRelation(String),

    #[error("unknown operator signature: {0}")]
    UnknownOperator(String),

    #[error("parse error: {0}")]
    ParseError(String),
}

//! Intermediate Symbolic Representation — the per-turn mutable state
//! threaded through a single run (spec.md §3.3-§3.4).

use std::collections::VecDeque;

use crate::node::{nil, NodeRef};
use crate::plan::OpLabel;

/// Label an operator is enqueued under; carried alongside its argument node
/// so the scheduler can dispatch on the label without inspecting payload.
#[derive(Debug, Clone)]
pub struct OpCall {
    pub label: OpLabel,
    pub arg: Option<NodeRef>,
}

impl OpCall {
    pub fn new(label: OpLabel) -> Self {
        OpCall { label, arg: None }
    }

    pub fn with_arg(label: OpLabel, arg: NodeRef) -> Self {
        OpCall { label, arg: Some(arg) }
    }
}

/// Maximum length of `ISR.context` after the first `NORMALIZE` (spec.md §4.7).
pub const CONTEXT_CAP: usize = 16;

#[derive(Debug, Clone)]
pub struct Isr {
    pub ontology: Vec<NodeRef>,
    pub relations: Vec<NodeRef>,
    pub context: VecDeque<NodeRef>,
    pub goals: Vec<NodeRef>,
    pub ops_queue: VecDeque<OpCall>,
    pub answer: NodeRef,
    pub quality: f64,
    /// Mutable scratch STRUCT the Φ-operators stamp fields onto (intent,
    /// tokens, semantic_kind, calculus, ...). Rebuilt via `struct_` on every
    /// write since `Node` is immutable.
    pub scratch: NodeRef,
    pub contradiction_detected: bool,
}

impl Default for Isr {
    fn default() -> Self {
        Isr {
            ontology: Vec::new(),
            relations: Vec::new(),
            context: VecDeque::new(),
            goals: Vec::new(),
            ops_queue: VecDeque::new(),
            answer: nil(),
            quality: 0.0,
            scratch: nil(),
            contradiction_detected: false,
        }
    }
}

impl Isr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_context(&mut self, n: NodeRef) {
        self.context.push_back(n);
    }

    pub fn enqueue_back(&mut self, op: OpCall) {
        self.ops_queue.push_back(op);
    }

    /// `INTENT` prepends, never appends (spec.md §4.7, §9).
    pub fn enqueue_front(&mut self, op: OpCall) {
        self.ops_queue.push_front(op);
    }

    pub fn bump_quality(&mut self, delta: f64) {
        self.quality = (self.quality + delta).clamp(0.0, 1.0);
    }
}

/// One entry in the append-only trace (spec.md §3.4).
#[derive(Debug, Clone)]
pub struct TraceStep {
    pub order: usize,
    pub label: String,
    pub delta_quality: f64,
    pub delta_relations: i64,
    pub context_size: usize,
}

impl TraceStep {
    /// Category derived from the label prefix, e.g. `"CALCULUS"` → `calc`,
    /// used purely for auditing/grouping in the Meta-Reflection phase chain.
    pub fn category(&self) -> &'static str {
        match self.label.as_str() {
            "NORMALIZE" => "hygiene",
            "INTENT" | "STRUCTURE" | "SEMANTICS" => "parse",
            "CALCULUS" => "calc",
            "INFER" => "infer",
            "ANSWER" | "SUMMARIZE" | "STATE_QUERY" => "answer",
            _ => "other",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
}

impl Trace {
    pub fn push(&mut self, step: TraceStep) {
        self.steps.push(step);
    }
}

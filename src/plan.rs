//! `OpLabel`, `Route`, and the Φ-plan (spec.md §3.5). A closed tagged enum
//! stands in for "dynamic dispatch over Φ-operators" per the re-architecture
//! note in spec.md §9: the scheduler matches on `OpLabel`, never registers
//! operators at runtime.

use serde::{Deserialize, Serialize};

use crate::node::fingerprint::digest_str;
use crate::node::{fingerprint::fingerprint, NodeRef};
use crate::vm::opcode::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpLabel {
    Normalize,
    Intent,
    Structure,
    Semantics,
    Calculus,
    Infer,
    Summarize,
    StateQuery,
    Answer,
}

impl OpLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            OpLabel::Normalize => "NORMALIZE",
            OpLabel::Intent => "INTENT",
            OpLabel::Structure => "STRUCTURE",
            OpLabel::Semantics => "SEMANTICS",
            OpLabel::Calculus => "CALCULUS",
            OpLabel::Infer => "INFER",
            OpLabel::Summarize => "SUMMARIZE",
            OpLabel::StateQuery => "STATE_QUERY",
            OpLabel::Answer => "ANSWER",
        }
    }
}

impl std::fmt::Display for OpLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the five routes the Meta-Transformer classifies input into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Math,
    Logic,
    Code,
    Instinct,
    Text,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Math => "math",
            Route::Logic => "logic",
            Route::Code => "code",
            Route::Instinct => "instinct",
            Route::Text => "text",
        }
    }

    /// `language_category` field on the Meta-Summary (SPEC_FULL.md / spec.md
    /// §4.10): code/math/logic map to themselves, instinct maps to text.
    pub fn language_category(self) -> &'static str {
        match self {
            Route::Math => "math",
            Route::Logic => "logic",
            Route::Code => "code",
            Route::Instinct | Route::Text => "text",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{ route, description, ops, program, constants, digest }` (spec.md §3.5).
#[derive(Debug, Clone)]
pub struct Plan {
    pub route: Route,
    pub description: String,
    pub ops: Vec<OpLabel>,
    pub program: Vec<Instruction>,
    pub constants: Vec<NodeRef>,
    pub digest: String,
}

impl Plan {
    /// Builds a plan and computes its digest over `(ops, description,
    /// constants)` — reordering constants of equal value changes the digest
    /// (spec.md P5), since constants contribute by position, not as a set.
    pub fn new(
        route: Route,
        description: impl Into<String>,
        ops: Vec<OpLabel>,
        program: Vec<Instruction>,
        constants: Vec<NodeRef>,
    ) -> Self {
        let description = description.into();
        let digest = plan_digest(&ops, &description, &constants);
        Plan { route, description, ops, program, constants, digest }
    }

    pub fn ops_chain(&self) -> String {
        self.ops.iter().map(OpLabel::as_str).collect::<Vec<_>>().join("→")
    }
}

fn plan_digest(ops: &[OpLabel], description: &str, constants: &[NodeRef]) -> String {
    let ops_part = ops.iter().map(OpLabel::as_str).collect::<Vec<_>>().join(",");
    let consts_part = constants.iter().map(|c| fingerprint(c)).collect::<Vec<_>>().join(",");
    digest_str(&format!("OPS[{ops_part}]|DESC[{description}]|CONST[{consts_part}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::number;
    use crate::vm::opcode::Opcode;

    #[test]
    fn plan_digest_depends_on_constant_order() {
        let p1 = Plan::new(
            Route::Math,
            "d",
            vec![OpLabel::Answer],
            vec![Instruction::bare(Opcode::Halt)],
            vec![number(1.0), number(2.0)],
        );
        let p2 = Plan::new(
            Route::Math,
            "d",
            vec![OpLabel::Answer],
            vec![Instruction::bare(Opcode::Halt)],
            vec![number(2.0), number(1.0)],
        );
        assert_ne!(p1.digest, p2.digest);
    }

    #[test]
    fn plan_digest_is_deterministic() {
        let p1 = Plan::new(Route::Math, "d", vec![OpLabel::Answer], vec![], vec![number(1.0)]);
        let p2 = Plan::new(Route::Math, "d", vec![OpLabel::Answer], vec![], vec![number(1.0)]);
        assert_eq!(p1.digest, p2.digest);
    }
}

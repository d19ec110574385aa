//! The deterministic Φ-execution loop (spec.md §4.8).

use serde::{Deserialize, Serialize};

use crate::isr::TraceStep;
use crate::phi;
use crate::plan::OpLabel;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HaltReason {
    QueueEmpty,
    StepBudget,
    QualityThreshold,
    Contradiction,
    PlanExecuted,
}

impl HaltReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HaltReason::QueueEmpty => "QUEUE_EMPTY",
            HaltReason::StepBudget => "STEP_BUDGET",
            HaltReason::QualityThreshold => "QUALITY_THRESHOLD",
            HaltReason::Contradiction => "CONTRADICTION",
            HaltReason::PlanExecuted => "PLAN_EXECUTED",
        }
    }
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the Φ-execution loop against `session.isr` until the queue drains,
/// the step budget is hit, the quality threshold is reached with a
/// non-`NIL` answer, or a contradiction is flagged. Single-threaded,
/// in-order, no randomness — identical inputs always halt the same way.
pub fn run(session: &mut Session) -> HaltReason {
    let budget = session.config.scheduler.step_budget;
    let threshold = session.config.scheduler.quality_threshold;
    let enable_contradictions = session.config.scheduler.enable_contradictions;
    let mut steps: u32 = 0;

    loop {
        if steps >= budget {
            return HaltReason::StepBudget;
        }
        let Some(op) = session.isr.ops_queue.pop_front() else {
            return HaltReason::QueueEmpty;
        };

        let pre_relations = session.isr.relations.len();
        let pre_quality = session.isr.quality;

        tracing::debug!(op = %op.label, step = steps, "dispatching phi operator");

        match op.label {
            OpLabel::Normalize => phi::normalize(&mut session.isr),
            OpLabel::Intent => {
                let arg = op.arg.clone().unwrap_or_else(crate::node::nil);
                phi::intent(&mut session.isr, arg);
            }
            OpLabel::Structure => {
                let arg = op.arg.clone().unwrap_or_else(crate::node::nil);
                phi::structure(&mut session.isr, arg);
            }
            OpLabel::Semantics => {
                let arg = op.arg.clone().unwrap_or_else(crate::node::nil);
                phi::semantics(&mut session.isr, arg);
            }
            OpLabel::Calculus => {
                let arg = op.arg.clone().unwrap_or_else(crate::node::nil);
                phi::calculus(&mut session.isr, arg);
            }
            OpLabel::Infer => phi::infer(&mut session.isr, enable_contradictions, budget.saturating_sub(steps)),
            OpLabel::Summarize => phi::summarize(&mut session.isr),
            OpLabel::StateQuery => phi::state_query(&mut session.isr, enable_contradictions, budget.saturating_sub(steps)),
            OpLabel::Answer => {
                let arg = op.arg.clone().unwrap_or_else(crate::node::nil);
                phi::answer(&mut session.isr, arg);
            }
        }

        steps += 1;
        session.trace.push(TraceStep {
            order: steps as usize,
            label: op.label.as_str().to_string(),
            delta_quality: session.isr.quality - pre_quality,
            delta_relations: session.isr.relations.len() as i64 - pre_relations as i64,
            context_size: session.isr.context.len(),
        });

        if enable_contradictions && session.isr.contradiction_detected {
            return HaltReason::Contradiction;
        }
        if !session.isr.answer.is_nil() && session.isr.quality >= threshold {
            return HaltReason::QualityThreshold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isr::OpCall;
    use crate::node::text;

    #[test]
    fn empty_queue_halts_queue_empty() {
        let mut session = Session::default();
        assert_eq!(run(&mut session), HaltReason::QueueEmpty);
    }

    #[test]
    fn budget_exhaustion_halts_step_budget() {
        let mut session = Session::default();
        session.config.scheduler.step_budget = 2;
        for _ in 0..5 {
            session.isr.enqueue_back(OpCall::new(crate::plan::OpLabel::Normalize));
        }
        assert_eq!(run(&mut session), HaltReason::StepBudget);
    }

    #[test]
    fn text_pipeline_reaches_answer() {
        let mut session = Session::default();
        session.isr.enqueue_back(OpCall::with_arg(crate::plan::OpLabel::Normalize, text("como você está?")));
        session.isr.enqueue_back(OpCall::with_arg(crate::plan::OpLabel::Infer, text("como você está?")));
        session.isr.enqueue_back(OpCall::with_arg(crate::plan::OpLabel::Answer, text("como você está?")));
        session.isr.enqueue_back(OpCall::new(crate::plan::OpLabel::Summarize));
        let halt = run(&mut session);
        assert!(matches!(halt, HaltReason::QueueEmpty | HaltReason::QualityThreshold));
        assert!(!session.isr.answer.is_nil());
    }
}

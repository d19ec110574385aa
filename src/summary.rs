//! Meta-Summary assembler (spec.md §4.10): the auditable per-turn record.
//! Builds a STRUCT whose `meta_digest` is the canonical identity of the
//! turn, and runs the VM/Φ consistency cross-check
//! (`meta_calc_exec.consistent`) that P7 requires.

use serde_json::json;

use crate::config::RuntimeConfig;
use crate::isr::Isr;
use crate::node::fingerprint::{fingerprint, fingerprint_ref};
use crate::node::{boolean, list_node, nil, number, struct_, text, NodeRef};
use crate::plan::Plan;
use crate::router::RouteResult;
use crate::scheduler::HaltReason;
use crate::vm::{snapshot, Vm};

/// Result of re-running `calc_plan.program` in a fresh VM bound to a copy of
/// the final ISR, compared fingerprint-for-fingerprint against the answer
/// the Φ scheduler actually produced (spec.md §4.10 "calc_exec_consistent").
#[derive(Debug, Clone)]
pub struct CalcResult {
    pub plan_route: String,
    pub plan_description: String,
    pub consistent: bool,
    pub answer_fingerprint: String,
    pub snapshot_digest: String,
    pub error: Option<String>,
}

/// Re-executes `plan.program` against a clone of `isr`, then compares the
/// VM's resulting answer fingerprint to `isr.answer`'s fingerprint.
pub fn verify_calc_exec(isr: &Isr, plan: &Plan, config: &RuntimeConfig) -> CalcResult {
    let mut isr_copy = isr.clone();
    let budget = config.scheduler.step_budget;
    let enable_contradictions = config.scheduler.enable_contradictions;
    let answer_fingerprint = fingerprint_ref(&isr.answer);

    let mut vm = Vm::new(&mut isr_copy, &plan.constants, enable_contradictions, budget);
    let run_result = vm.run(&plan.program);

    match run_result {
        Ok(()) => {
            let vm_fingerprint = fingerprint_ref(&isr_copy.answer);
            let consistent = vm_fingerprint == answer_fingerprint;
            let snapshot = snapshot::build_snapshot(
                &plan.program,
                &plan.constants,
                &isr_copy,
                json!({ "enable_contradictions": enable_contradictions, "budget": budget }),
                config.vm.snapshot_digest,
            )
            .ok();
            CalcResult {
                plan_route: plan.route.as_str().to_string(),
                plan_description: plan.description.clone(),
                consistent,
                answer_fingerprint,
                snapshot_digest: snapshot.map(|s| s.digest).unwrap_or_default(),
                error: if consistent {
                    None
                } else {
                    Some(format!("answer fingerprint mismatch: phi={answer_fingerprint} vm={vm_fingerprint}"))
                },
            }
        }
        Err(e) => CalcResult {
            plan_route: plan.route.as_str().to_string(),
            plan_description: plan.description.clone(),
            consistent: false,
            answer_fingerprint,
            snapshot_digest: String::new(),
            error: Some(e.to_string()),
        },
    }
}

fn field_text(n: &NodeRef, key: &str) -> Option<String> {
    n.fields()?.iter().find(|(k, _)| k.as_ref() == key).and_then(|(_, v)| v.as_text().map(str::to_string))
}

fn field_number(n: &NodeRef, key: &str) -> Option<f64> {
    n.fields()?.iter().find(|(k, _)| k.as_ref() == key).and_then(|(_, v)| v.as_number())
}

fn merge(fields: &mut Vec<(String, NodeRef)>, key: &str, value: NodeRef) {
    fields.push((key.to_string(), value));
}

/// Builds the `meta_summary` STRUCT (spec.md §4.10) for one finished turn.
pub fn build(
    trimmed_input: &str,
    route_result: &RouteResult,
    isr: &Isr,
    halt_reason: HaltReason,
    calc: &CalcResult,
) -> NodeRef {
    let plan = &route_result.calc_plan;
    let lang = field_text(&route_result.language_profile, "language").unwrap_or_else(|| "unknown".to_string());
    let lang_confidence = field_number(&route_result.language_profile, "lang_confidence").unwrap_or(0.0);

    let mut fields: Vec<(String, NodeRef)> = vec![
        ("route".to_string(), text(route_result.route.as_str())),
        ("lang".to_string(), text(lang)),
        ("lang_confidence".to_string(), number(lang_confidence)),
        ("input".to_string(), text(trimmed_input)),
        ("answer".to_string(), isr.answer.clone()),
        ("phi_plan_chain".to_string(), text(plan.ops_chain())),
        (
            "phi_plan_ops".to_string(),
            list_node(plan.ops.iter().map(|o| text(o.as_str())).collect()),
        ),
        ("phi_plan_description".to_string(), text(plan.description.clone())),
        ("phi_plan_digest".to_string(), text(plan.digest.clone())),
        ("phi_plan_program_len".to_string(), number(plan.program.len() as f64)),
        ("phi_plan_const_len".to_string(), number(plan.constants.len() as f64)),
        ("language_category".to_string(), text(route_result.route.language_category())),
        ("halt_reason".to_string(), text(halt_reason.as_str())),
        ("quality".to_string(), number(isr.quality)),
    ];

    if let Some(math_ast) = &route_result.math_ast {
        merge(&mut fields, "math_ast_operator", text(field_text(math_ast, "operator").unwrap_or_default()));
        merge(&mut fields, "math_ast_operand_count", number(field_number(math_ast, "operand_count").unwrap_or(0.0)));
        merge(&mut fields, "math_ast_language", text(field_text(math_ast, "language").unwrap_or_default()));
    }

    if let Some(code_ast) = &route_result.code_ast {
        merge(&mut fields, "code_ast_language", text(field_text(code_ast, "language").unwrap_or_default()));
        merge(&mut fields, "code_ast_node_count", number(field_number(code_ast, "node_count").unwrap_or(0.0)));
    }
    if let Some(code_summary) = &route_result.code_summary {
        merge(
            &mut fields,
            "code_summary_function_count",
            number(field_number(code_summary, "function_count").unwrap_or(0.0)),
        );
    }

    if route_result.route == crate::plan::Route::Text {
        if let Some(payload) = plan.constants.first() {
            let json_str = serde_json::to_string(&crate::node::json::to_json(payload)).unwrap_or_default();
            merge(&mut fields, "meta_calculation", text(json_str));
        }
    }

    let mut calc_exec_fields = vec![
        ("plan_route".to_string(), text(calc.plan_route.clone())),
        ("plan_description".to_string(), text(calc.plan_description.clone())),
        ("consistent".to_string(), boolean(calc.consistent)),
        ("answer_fingerprint".to_string(), text(calc.answer_fingerprint.clone())),
        ("snapshot_digest".to_string(), text(calc.snapshot_digest.clone())),
    ];
    if let Some(err) = &calc.error {
        calc_exec_fields.push(("error".to_string(), text(err.clone())));
    }
    let calc_exec_refs: Vec<(&str, NodeRef)> = calc_exec_fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    merge(&mut fields, "meta_calc_exec", struct_(calc_exec_refs).unwrap_or_else(|_| nil()));

    let refs: Vec<(&str, NodeRef)> = fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    let without_digest = struct_(refs).unwrap_or_else(|_| nil());
    let digest = fingerprint(&without_digest);

    let mut final_fields: Vec<(&str, NodeRef)> = fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    final_fields.push(("meta_digest", text(digest)));
    struct_(final_fields).unwrap_or_else(|_| nil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::detect_language;
    use crate::router::math;
    use crate::session::Session;

    #[test]
    fn math_route_summary_carries_math_ast_fields() {
        let trimmed = "2+2";
        let guess = detect_language(trimmed);
        let route_result = math::try_route(trimmed, &guess).unwrap();
        let mut session = Session::default();
        crate::router::seed_session(&mut session, &route_result);
        crate::scheduler::run(&mut session);
        let calc = verify_calc_exec(&session.isr, &route_result.calc_plan, &session.config);
        let summary = build(trimmed, &route_result, &session.isr, HaltReason::QueueEmpty, &calc);
        assert_eq!(field_text(&summary, "route").as_deref(), Some("math"));
        assert!(field_text(&summary, "math_ast_operator").is_some());
        assert!(calc.consistent);
    }

    #[test]
    fn meta_digest_is_deterministic_for_identical_input() {
        let trimmed = "FACT chuva";
        let guess = detect_language(trimmed);
        let route_result = crate::router::logic::try_route(trimmed, &guess).unwrap();
        let mut session1 = Session::default();
        crate::router::seed_session(&mut session1, &route_result);
        crate::scheduler::run(&mut session1);
        let calc1 = verify_calc_exec(&session1.isr, &route_result.calc_plan, &session1.config);
        let summary1 = build(trimmed, &route_result, &session1.isr, HaltReason::QueueEmpty, &calc1);

        let route_result2 = crate::router::logic::try_route(trimmed, &guess).unwrap();
        let mut session2 = Session::default();
        crate::router::seed_session(&mut session2, &route_result2);
        crate::scheduler::run(&mut session2);
        let calc2 = verify_calc_exec(&session2.isr, &route_result2.calc_plan, &session2.config);
        let summary2 = build(trimmed, &route_result2, &session2.isr, HaltReason::QueueEmpty, &calc2);

        assert_eq!(field_text(&summary1, "meta_digest"), field_text(&summary2, "meta_digest"));
    }
}

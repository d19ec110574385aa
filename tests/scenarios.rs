//! End-to-end scenario tests (spec.md §8, S1–S6): each checks the exact
//! expected answer/route/meta fields the spec calls out, plus the
//! "same input twice -> identical meta_digest" requirement every scenario
//! carries.

use meta_runtime::run_text;

fn meta_field(summary: &meta_runtime::node::NodeRef, key: &str) -> Option<meta_runtime::node::NodeRef> {
    summary.fields()?.iter().find(|(k, _)| k.as_ref() == key).map(|(_, v)| v.clone())
}

fn meta_digest(summary: &meta_runtime::node::NodeRef) -> String {
    meta_field(summary, "meta_digest").and_then(|v| v.as_text().map(str::to_string)).unwrap_or_default()
}

fn assert_repeatable(input: &str) {
    let a = run_text(input, None);
    let b = run_text(input, None);
    assert_eq!(meta_digest(&a.meta_summary), meta_digest(&b.meta_summary), "meta_digest must be stable for {input:?}");
}

#[test]
fn s1_math_expression() {
    let outcome = run_text("2+2", None);
    assert_eq!(outcome.answer.as_text(), Some("2+2 = 4"));
    assert_eq!(meta_field(&outcome.meta_summary, "route").unwrap().as_text(), Some("math"));
    assert_eq!(
        meta_field(&outcome.meta_summary, "math_ast_operator").unwrap().as_text(),
        Some("EXPRESSION")
    );
    assert!(outcome.calc_result.consistent);
    assert_eq!(meta_field(&outcome.meta_summary, "phi_plan_program_len").unwrap().as_number(), Some(3.0));
    assert_eq!(meta_field(&outcome.meta_summary, "phi_plan_const_len").unwrap().as_number(), Some(1.0));
    assert_repeatable("2+2");
}

#[test]
fn s2_text_route_embedded_arithmetic() {
    let outcome = run_text("Quanto é 10 + 5?", None);
    let answer = outcome.answer.as_text().unwrap();
    assert!(answer.contains("15"), "answer {answer:?} must mention 15");
    assert_eq!(meta_field(&outcome.meta_summary, "route").unwrap().as_text(), Some("text"));
    assert_eq!(
        meta_field(&outcome.meta_summary, "phi_plan_chain").unwrap().as_text(),
        Some("NORMALIZE→INFER→SUMMARIZE")
    );
    assert!(outcome.calc_result.consistent);
    assert_repeatable("Quanto é 10 + 5?");
}

#[test]
fn s3_instinct_greeting_with_vocative() {
    let outcome = run_text("Oi Metanúcleo!", None);
    let answer = outcome.answer.as_text().unwrap();
    assert!(answer.starts_with("Olá"));
    assert!(answer.contains("Metanúcleo"));
    assert_eq!(meta_field(&outcome.meta_summary, "route").unwrap().as_text(), Some("instinct"));
    assert_eq!(meta_field(&outcome.meta_summary, "lang").unwrap().as_text(), Some("pt"));
    assert!(outcome.quality >= 0.85);
    assert_repeatable("Oi Metanúcleo!");
}

#[test]
fn s4_logic_fact() {
    let outcome = run_text("FACT chuva", None);
    assert!(!outcome.answer.is_nil());
    assert_eq!(meta_field(&outcome.meta_summary, "route").unwrap().as_text(), Some("logic"));
    assert!(outcome.calc_result.consistent);
    assert_repeatable("FACT chuva");
}

#[test]
fn s5_code_python_def() {
    let outcome = run_text("def soma(x, y):\n    return x + y\n", None);
    let answer = outcome.answer.as_text().unwrap();
    assert!(answer.to_lowercase().contains("python"));
    assert_eq!(
        meta_field(&outcome.meta_summary, "code_ast_language").unwrap().as_text(),
        Some("python")
    );
    assert!(meta_field(&outcome.meta_summary, "code_ast_node_count").unwrap().as_number().unwrap() >= 1.0);
    assert!(meta_field(&outcome.meta_summary, "code_summary_function_count").unwrap().as_number().unwrap() >= 1.0);
    assert_repeatable("def soma(x, y):\n    return x + y\n");
}

#[test]
fn s6_text_state_query() {
    let outcome = run_text("como você está?", None);
    assert!(!outcome.answer.is_nil());
    assert_eq!(meta_field(&outcome.meta_summary, "phi_plan_program_len").unwrap().as_number(), Some(4.0));
    assert_eq!(meta_field(&outcome.meta_summary, "phi_plan_const_len").unwrap().as_number(), Some(1.0));
    let calc_json = meta_field(&outcome.meta_summary, "meta_calculation").unwrap();
    assert!(calc_json.as_text().unwrap().contains("STATE_QUERY"));
    assert!(outcome.calc_result.consistent);
    assert_repeatable("como você está?");
}

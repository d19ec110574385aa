//! The Φ-operator library (spec.md §4.7): nine pure functions over ISR.
//! Each takes `(&mut Isr, args)` and returns `()`; all mutation happens
//! in-place on `isr.scratch` (a STRUCT rebuilt immutably on every write,
//! since [`crate::node::Node`] itself never mutates) plus the other ISR
//! fields named in spec.md §3.3. Running any operator twice with the same
//! inputs produces the same ISR state.

use crate::isr::{Isr, OpCall, CONTEXT_CAP};
use crate::lang;
use crate::mathexpr;
use crate::node::{self, boolean, list_node, nil, number, struct_, text, NodeRef};
use crate::plan::OpLabel;

fn scratch_fields(isr: &Isr) -> Vec<(String, NodeRef)> {
    match isr.scratch.fields() {
        Some(fields) => fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        None => Vec::new(),
    }
}

fn scratch_get<'a>(fields: &'a [(String, NodeRef)], key: &str) -> Option<&'a NodeRef> {
    fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn set_fields(isr: &mut Isr, updates: Vec<(&str, NodeRef)>) {
    let mut fields = scratch_fields(isr);
    for (key, value) in updates {
        if let Some(existing) = fields.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            fields.push((key.to_string(), value));
        }
    }
    let refs: Vec<(&str, NodeRef)> = fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    isr.scratch = struct_(refs).expect("scratch keys are always valid atoms");
}

fn message_text(arg: &Option<NodeRef>) -> String {
    arg.as_ref().and_then(|n| n.as_text().map(str::to_string)).unwrap_or_default()
}

/// `NORMALIZE()`: cap `context` at [`CONTEXT_CAP`], bump quality by 0.05.
pub fn normalize(isr: &mut Isr) {
    while isr.context.len() > CONTEXT_CAP {
        isr.context.pop_front();
    }
    isr.bump_quality(0.05);
}

/// `INTENT(msg)`: classify greeting/question/statement, prepend
/// `STRUCTURE(msg)` then `SEMANTICS(msg)`.
pub fn intent(isr: &mut Isr, msg: NodeRef) {
    let text_val = message_text(&Some(msg.clone()));
    let feats = lang::extract_language_features(&text_val);
    let intent_label = if feats.is_greeting_like {
        "greeting"
    } else if feats.has_question_mark {
        "question"
    } else {
        "statement"
    };
    set_fields(isr, vec![("intent", text(intent_label)), ("language", text(feats.lang.clone()))]);
    isr.enqueue_front(OpCall::with_arg(OpLabel::Semantics, msg.clone()));
    isr.enqueue_front(OpCall::with_arg(OpLabel::Structure, msg));
}

/// `STRUCTURE(msg)`: ensure `tokens`/`length` fields exist.
pub fn structure(isr: &mut Isr, msg: NodeRef) {
    let fields = scratch_fields(isr);
    if scratch_get(&fields, "tokens").is_some() {
        return;
    }
    let text_val = message_text(&Some(msg));
    let tokens = lang::tokenize(&text_val);
    let token_nodes = tokens.iter().map(|t| text(t.clone())).collect();
    set_fields(
        isr,
        vec![("tokens", list_node(token_nodes)), ("length", number(tokens.len() as f64))],
    );
}

/// `SEMANTICS(msg)`: compute `semantic_kind`, token counts, `has_math`;
/// enqueue `CALCULUS(msg)` next.
pub fn semantics(isr: &mut Isr, msg: NodeRef) {
    let text_val = message_text(&Some(msg.clone()));
    let feats = lang::extract_language_features(&text_val);
    let has_math = mathexpr::looks_like_math(&text_val);
    let kind = if feats.has_question_mark && has_math {
        "math_question"
    } else if feats.is_greeting_like {
        "greeting"
    } else if feats.has_question_mark {
        "question"
    } else {
        "statement"
    };
    set_fields(
        isr,
        vec![
            ("semantic_kind", text(kind)),
            ("has_math", boolean(has_math)),
            ("token_count", number(feats.tokens.len() as f64)),
        ],
    );
    isr.enqueue_front(OpCall::with_arg(OpLabel::Calculus, msg));
}

/// `CALCULUS(msg)`: evaluate an embedded arithmetic expression if present.
pub fn calculus(isr: &mut Isr, msg: NodeRef) {
    let text_val = message_text(&Some(msg));
    if let Some((expr, value)) = mathexpr::extract_embedded_expression(&text_val) {
        let calc = struct_(vec![("expression", text(expr.clone())), ("result", number(value))])
            .expect("calc struct fields are valid");
        set_fields(
            isr,
            vec![("calculus", calc), ("equivalence", text(format!("{expr} = {value}")))],
        );
    }
}

fn relation_label_args(n: &NodeRef) -> Option<(String, Vec<String>)> {
    match n.as_ref() {
        node::Node::Rel { label, args } => Some((
            label.to_string(),
            args.iter().map(|a| a.label().map(|l| l.to_string()).unwrap_or_default()).collect(),
        )),
        _ => None,
    }
}

/// `INFER()`: chase-to-fixpoint transitive closure over `IS_A`/`PART_OF`,
/// bounded by a hard step budget; flags a contradiction when both `R(a,b)`
/// and `NOT_R(a,b)` are derivable and contradiction checking is enabled.
pub fn infer(isr: &mut Isr, enable_contradictions: bool, budget: u32) {
    const TRANSITIVE: [&str; 2] = ["IS_A", "PART_OF"];
    let mut known: Vec<NodeRef> = isr.relations.clone();
    let mut steps = 0u32;
    loop {
        if steps >= budget {
            break;
        }
        steps += 1;
        let mut derived = Vec::new();
        let parsed: Vec<Option<(String, Vec<String>)>> = known.iter().map(relation_label_args).collect();
        for label in TRANSITIVE {
            let edges: Vec<(&str, &str)> = parsed
                .iter()
                .filter_map(|r| r.as_ref())
                .filter(|(l, args)| l == label && args.len() == 2)
                .map(|(_, args)| (args[0].as_str(), args[1].as_str()))
                .collect();
            for (a, b) in &edges {
                for (c, d) in &edges {
                    if b == c && a != d {
                        if let (Ok(ea), Ok(ed)) = (node::entity(a), node::entity(d)) {
                            if let Ok(rel) = node::relation(label, vec![ea, ed]) {
                                derived.push(rel);
                            }
                        }
                    }
                }
            }
        }
        let before = known.len();
        known = crate::node::normalize::dedup_relations(&[known, derived].concat());
        if known.len() == before {
            break;
        }
    }
    isr.relations = known;

    if enable_contradictions {
        let labels: Vec<(String, Vec<String>)> =
            isr.relations.iter().filter_map(relation_label_args).collect();
        for (label, args) in &labels {
            if let Some(stripped) = label.strip_prefix("NOT_") {
                if labels.iter().any(|(l, a)| l == stripped && a == args) {
                    isr.contradiction_detected = true;
                    break;
                }
            }
        }
    }
}

pub(crate) fn greeting_template(lang_code: &str) -> &'static str {
    match lang_code {
        "pt" => "Olá! Como posso ajudar?",
        "es" => "¡Hola! ¿Cómo puedo ayudar?",
        "fr" => "Salut ! Comment puis-je aider ?",
        "it" => "Ciao! Come posso aiutare?",
        "de" => "Hallo! Wie kann ich helfen?",
        _ => "Hello! How can I help?",
    }
}

/// `ANSWER(msg)`: builds the final answer from available fields in
/// priority order, writes it into `ISR.answer`, boosts quality by +0.2.
pub fn answer(isr: &mut Isr, msg: NodeRef) {
    let text_val = message_text(&Some(msg));
    let fields = scratch_fields(isr);
    let answer_text = if let Some(equivalence) = scratch_get(&fields, "equivalence").and_then(|n| n.as_text()) {
        equivalence.to_string()
    } else if scratch_get(&fields, "intent").and_then(|n| n.as_text()) == Some("greeting") {
        let lang_code = scratch_get(&fields, "language").and_then(|n| n.as_text()).unwrap_or("en");
        greeting_template(lang_code).to_string()
    } else if scratch_get(&fields, "semantic_kind")
        .and_then(|n| n.as_text())
        .map(|k| k.contains("question"))
        .unwrap_or(false)
    {
        format!("Entendi: {}", text_val.trim())
    } else {
        format!("Recebido: {}", text_val.trim())
    };
    isr.answer = text(answer_text);
    isr.bump_quality(0.2);
}

/// `SUMMARIZE()`: idempotent finalization of the condensed STRUCT consumed
/// by the Meta-Summary assembler.
pub fn summarize(isr: &mut Isr) {
    let answer_text = isr.answer.as_text().map(str::to_string).unwrap_or_default();
    set_fields(isr, vec![("summary", text(answer_text))]);
}

/// `STATE_QUERY()`: convenience alias equivalent to
/// `NORMALIZE → INFER → SUMMARIZE`, run synchronously.
pub fn state_query(isr: &mut Isr, enable_contradictions: bool, budget: u32) {
    normalize(isr);
    infer(isr, enable_contradictions, budget);
    summarize(isr);
}

/// Builds the compact `lc_meta_calc` node describing the TEXT route's
/// symbolic calculation (spec.md §4.6) — an `OP` node labeled `STATE_QUERY`
/// carrying the trimmed input as its sole argument, pushed as the plan's
/// constant payload.
pub fn state_query_calc_node(trimmed_input: &str) -> NodeRef {
    node::operation("STATE_QUERY", vec![text(trimmed_input)]).unwrap_or_else(|_| nil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isr::Isr;

    #[test]
    fn normalize_caps_context_and_bumps_quality() {
        let mut isr = Isr::new();
        for i in 0..20 {
            isr.push_context(number(i as f64));
        }
        normalize(&mut isr);
        assert!(isr.context.len() <= CONTEXT_CAP);
        assert!((isr.quality - 0.05).abs() < 1e-9);
    }

    #[test]
    fn intent_prepends_structure_then_semantics() {
        let mut isr = Isr::new();
        intent(&mut isr, text("hello"));
        assert_eq!(isr.ops_queue.len(), 2);
        assert_eq!(isr.ops_queue[0].label, OpLabel::Structure);
        assert_eq!(isr.ops_queue[1].label, OpLabel::Semantics);
    }

    #[test]
    fn calculus_stamps_result() {
        let mut isr = Isr::new();
        calculus(&mut isr, text("Quanto é 10 + 5?"));
        let fields = scratch_fields(&isr);
        let calc = scratch_get(&fields, "calculus").unwrap();
        assert_eq!(calc.fields().unwrap().iter().find(|(k, _)| k.as_ref() == "result").unwrap().1.as_number(), Some(15.0));
    }

    #[test]
    fn answer_prioritizes_calculus_result() {
        let mut isr = Isr::new();
        calculus(&mut isr, text("10 + 5"));
        answer(&mut isr, text("10 + 5"));
        assert_eq!(isr.answer.as_text(), Some("10 + 5 = 15"));
    }

    #[test]
    fn infer_derives_transitive_is_a() {
        let mut isr = Isr::new();
        isr.relations.push(node::relation("IS_A", vec![node::entity("dog").unwrap(), node::entity("mammal").unwrap()]).unwrap());
        isr.relations.push(node::relation("IS_A", vec![node::entity("mammal").unwrap(), node::entity("animal").unwrap()]).unwrap());
        infer(&mut isr, false, 8);
        let has_derived = isr.relations.iter().any(|r| {
            relation_label_args(r).map(|(l, a)| l == "IS_A" && a == vec!["dog".to_string(), "animal".to_string()]).unwrap_or(false)
        });
        assert!(has_derived);
    }
}

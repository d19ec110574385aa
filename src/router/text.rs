//! TEXT route (spec.md §4.6 item 5): the unconditional fallback. Builds a
//! PSE-lite parse structure (`LxU` tokenization + a shallow
//! subject/object/modifier split) and hands the turn to the Φ pipeline —
//! no preseed answer, the scheduler produces it.

use super::RouteResult;
use crate::lang::{self, LanguageGuess};
use crate::node::{boolean, list_node, nil, number, struct_, text, NodeRef};
use crate::phi;
use crate::plan::{OpLabel, Plan, Route};

/// Builds the `LxU`/PSE STRUCT: `action, subject, object, modifier,
/// relations, negation, question_focus, sentence_type, language`.
fn lxu_struct(trimmed: &str, feats: &lang::LanguageFeatures) -> NodeRef {
    let tokens = &feats.tokens;
    let sentence_type = if feats.has_question_mark {
        "question"
    } else if feats.is_greeting_like {
        "greeting"
    } else {
        "statement"
    };
    let action = if feats.has_question_mark { "QUERY" } else { "STATEMENT" };
    let subject = tokens.first().cloned().unwrap_or_default();
    let object = if tokens.len() > 1 { tokens.last().cloned().unwrap_or_default() } else { String::new() };
    let question_focus = if feats.has_question_mark {
        text(tokens.last().cloned().unwrap_or_default())
    } else {
        nil()
    };

    struct_(vec![
        ("action", text(action)),
        ("subject", text(subject)),
        ("object", text(object)),
        ("modifier", text(trimmed)),
        ("relations", list_node(vec![])),
        ("negation", boolean(feats.is_no_like)),
        ("question_focus", question_focus),
        ("sentence_type", text(sentence_type)),
        ("language", text(feats.lang.clone())),
    ])
    .unwrap_or_else(|_| nil())
}

fn lc_meta_struct(guess: &LanguageGuess, trimmed: &str) -> NodeRef {
    struct_(vec![
        ("language", text(guess.code.clone())),
        ("context", text(trimmed)),
        ("length", number(trimmed.len() as f64)),
    ])
    .unwrap_or_else(|_| nil())
}

/// Builds the TEXT route unconditionally; never fails.
pub fn build_route(trimmed: &str, guess: &LanguageGuess) -> RouteResult {
    let feats = lang::extract_language_features(trimmed);
    let struct_node = lxu_struct(trimmed, &feats);
    let lc_meta = lc_meta_struct(guess, trimmed);

    let payload = phi::state_query_calc_node(trimmed);
    let ops = vec![OpLabel::Normalize, OpLabel::Infer, OpLabel::Summarize];
    let plan = Plan::new(Route::Text, "text_pipeline", ops, super::text_path_program(), vec![payload]);

    let language_profile = struct_(vec![
        ("language", text(guess.code.clone())),
        ("lang_confidence", number(guess.confidence)),
    ])
    .unwrap_or_else(|_| nil());

    RouteResult {
        route: Route::Text,
        trimmed_input: trimmed.to_string(),
        trace_label: "TEXT[PSE]".to_string(),
        preseed_answer: None,
        preseed_quality: None,
        preseed_context: vec![struct_node.clone(), lc_meta.clone()],
        calc_plan: plan,
        language_profile,
        struct_node,
        lc_meta: Some(lc_meta),
        code_ast: None,
        code_summary: None,
        math_ast: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::detect_language;

    #[test]
    fn builds_question_sentence_type() {
        let trimmed = "como você está?";
        let guess = detect_language(trimmed);
        let result = build_route(trimmed, &guess);
        let fields = result.struct_node.fields().unwrap();
        let sentence_type = fields.iter().find(|(k, _)| k.as_ref() == "sentence_type").unwrap();
        assert_eq!(sentence_type.1.as_text(), Some("question"));
    }

    #[test]
    fn plan_has_three_ops_and_four_instructions() {
        let trimmed = "uma frase qualquer";
        let guess = detect_language(trimmed);
        let result = build_route(trimmed, &guess);
        assert_eq!(result.calc_plan.ops.len(), 3);
        assert_eq!(result.calc_plan.program.len(), 4);
        assert_eq!(result.calc_plan.constants.len(), 1);
    }

    #[test]
    fn no_preseed_answer() {
        let trimmed = "hello world statement";
        let guess = detect_language(trimmed);
        let result = build_route(trimmed, &guess);
        assert!(result.preseed_answer.is_none());
        assert!(result.preseed_quality.is_none());
    }
}

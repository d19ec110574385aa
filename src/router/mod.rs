//! Meta-Transformer — the route classifier + plan builder (spec.md §4.6).
//!
//! Route classification runs in fixed priority order, first match wins:
//! MATH → LOGIC → CODE → INSTINCT → TEXT (fallback). Any route parser that
//! fails mid-way falls back to TEXT rather than raising — a corrupted
//! payload never aborts, it just produces a TEXT route with a diagnostic
//! modifier (spec.md §4.6 Failure semantics).

pub mod code;
pub mod instinct;
pub mod logic;
pub mod math;
pub mod text;

use std::fmt;

use crate::isr::OpCall;
use crate::lang::{self, LanguageGuess};
use crate::node::fingerprint::{digest_str, fingerprint};
use crate::node::{self, entity, struct_, text as text_node, NodeRef};
use crate::plan::{OpLabel, Plan, Route};
use crate::session::Session;
use crate::vm::opcode::{Instruction, Opcode};

#[derive(Debug, Clone)]
pub struct RouteError(pub String);

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route classification failed: {}", self.0)
    }
}

impl std::error::Error for RouteError {}

/// Output of the Meta-Transformer for one turn (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct RouteResult {
    pub route: Route,
    pub trimmed_input: String,
    pub trace_label: String,
    pub preseed_answer: Option<NodeRef>,
    pub preseed_quality: Option<f64>,
    pub preseed_context: Vec<NodeRef>,
    pub calc_plan: Plan,
    pub language_profile: NodeRef,
    pub struct_node: NodeRef,
    pub lc_meta: Option<NodeRef>,
    pub code_ast: Option<NodeRef>,
    pub code_summary: Option<NodeRef>,
    pub math_ast: Option<NodeRef>,
}

fn language_profile_node(guess: &LanguageGuess) -> NodeRef {
    struct_(vec![
        ("language", text_node(guess.code.clone())),
        ("lang_confidence", crate::node::number(guess.confidence)),
    ])
    .unwrap_or_else(|_| crate::node::nil())
}

fn meta_route_node(route: Route) -> NodeRef {
    entity(route.as_str()).unwrap_or_else(|_| crate::node::nil())
}

fn meta_input_node(trimmed: &str) -> NodeRef {
    let t = text_node(trimmed);
    struct_(vec![("subject", t.clone()), ("context", text_node(fingerprint(&t)))]).unwrap_or_else(|_| crate::node::nil())
}

fn meta_plan_node(plan: &Plan) -> NodeRef {
    struct_(vec![
        ("action", text_node(plan.digest.clone())),
        ("modifier", text_node(plan.ops_chain())),
    ])
    .unwrap_or_else(|_| crate::node::nil())
}

fn base_struct_node(route: Route, trimmed: &str, plan: &Plan, lang_node: &NodeRef) -> NodeRef {
    struct_(vec![
        ("action", meta_route_node(route)),
        ("subject", meta_input_node(trimmed)),
        ("modifier", meta_plan_node(plan)),
        ("language", lang_node.clone()),
    ])
    .unwrap_or_else(|_| crate::node::nil())
}

/// Fast-path VM program: `PUSH_CONST(answer) ; STORE_ANSWER ; HALT`.
fn fast_path_program() -> Vec<Instruction> {
    vec![
        Instruction::new(Opcode::PushConst, 0),
        Instruction::bare(Opcode::StoreAnswer),
        Instruction::bare(Opcode::Halt),
    ]
}

/// TEXT route VM program: `PHI_NORMALIZE ; PHI_INFER ; PHI_SUMMARIZE ; HALT`.
///
/// None of these three bridges ever writes `isr.answer` — that's
/// `phi::answer()`'s job, and `answer` isn't part of this program (it already
/// ran as part of the scheduler's op chain before replay). So the replay must
/// leave `answer` untouched rather than stomping it with a `PUSH_CONST` of
/// the plan's `STATE_QUERY` descriptor, or `verify_calc_exec`'s fingerprint
/// comparison against the real answer can never match.
pub(crate) fn text_path_program() -> Vec<Instruction> {
    vec![
        Instruction::bare(Opcode::PhiNormalize),
        Instruction::bare(Opcode::PhiInfer),
        Instruction::bare(Opcode::PhiSummarize),
        Instruction::bare(Opcode::Halt),
    ]
}

/// Classifies `trimmed` into a route and builds its Φ-plan + preseed. Never
/// fails: a parser error in MATH/LOGIC/CODE falls back to the TEXT route.
pub fn classify(raw_input: &str, session: &Session) -> RouteResult {
    let trimmed = raw_input.trim();
    let guess = session
        .language_hint
        .as_ref()
        .map(|code| LanguageGuess { code: code.clone(), confidence: 1.0, scores: Default::default() })
        .unwrap_or_else(|| lang::detect_language(trimmed));

    if let Some(result) = math::try_route(trimmed, &guess) {
        return result;
    }
    if let Some(result) = logic::try_route(trimmed, &guess) {
        return result;
    }
    if let Some(result) = code::try_route(trimmed, &guess) {
        return result;
    }
    if let Some(result) = instinct::try_route(trimmed, &guess) {
        return result;
    }
    text::build_route(trimmed, &guess)
}

/// Seeds `session.isr` from a classified [`RouteResult`]: pushes preseed
/// context, sets answer/quality when a fast path applied, and enqueues the
/// route's bootstrapping ops.
pub fn seed_session(session: &mut Session, result: &RouteResult) {
    for ctx in &result.preseed_context {
        session.isr.push_context(ctx.clone());
    }
    if let (Some(answer), Some(quality)) = (&result.preseed_answer, result.preseed_quality) {
        session.isr.answer = answer.clone();
        session.isr.quality = quality;
    }
    match result.route {
        Route::Text => {
            let msg = text_node(result.trimmed_input.clone());
            session.isr.enqueue_back(OpCall::with_arg(OpLabel::Intent, msg.clone()));
            session.isr.enqueue_back(OpCall::new(OpLabel::Normalize));
            session.isr.enqueue_back(OpCall::new(OpLabel::Infer));
            session.isr.enqueue_back(OpCall::with_arg(OpLabel::Answer, msg));
            session.isr.enqueue_back(OpCall::new(OpLabel::Summarize));
        }
        _ => {}
    }
}

/// Helper shared by route submodules: builds a `RouteResult` for a fast
/// (non-TEXT) route given the preseed answer text and quality.
pub(crate) fn fast_route_result(
    route: Route,
    trace_label: &str,
    trimmed: &str,
    guess: &LanguageGuess,
    description: &str,
    answer_text: String,
    quality: f64,
    extra: RouteExtras,
) -> RouteResult {
    fast_route_result_with_context(route, trace_label, trimmed, guess, description, answer_text, quality, extra, vec![])
}

pub(crate) fn fast_route_result_with_context(
    route: Route,
    trace_label: &str,
    trimmed: &str,
    guess: &LanguageGuess,
    description: &str,
    answer_text: String,
    quality: f64,
    extra: RouteExtras,
    extra_context: Vec<NodeRef>,
) -> RouteResult {
    let answer_node = text_node(answer_text);
    let constants = vec![answer_node.clone()];
    let plan = Plan::new(route, description, vec![], fast_path_program(), constants);
    let lang_node = language_profile_node(guess);
    let mut struct_node = base_struct_node(route, trimmed, &plan, &lang_node);
    if let Some(math_ast) = &extra.math_ast {
        struct_node = merge_field(&struct_node, "result", math_ast.clone());
    }
    let mut preseed_context = vec![struct_node.clone()];
    preseed_context.extend(extra_context);
    RouteResult {
        route,
        trimmed_input: trimmed.to_string(),
        trace_label: trace_label.to_string(),
        preseed_answer: Some(answer_node),
        preseed_quality: Some(quality),
        preseed_context,
        calc_plan: plan,
        language_profile: lang_node,
        struct_node,
        lc_meta: None,
        code_ast: extra.code_ast,
        code_summary: extra.code_summary,
        math_ast: extra.math_ast,
    }
}

#[derive(Default)]
pub(crate) struct RouteExtras {
    pub code_ast: Option<NodeRef>,
    pub code_summary: Option<NodeRef>,
    pub math_ast: Option<NodeRef>,
}

fn merge_field(n: &NodeRef, key: &str, value: NodeRef) -> NodeRef {
    let mut fields: Vec<(String, NodeRef)> = n
        .fields()
        .map(|f| f.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
        .unwrap_or_default();
    fields.retain(|(k, _)| k != key);
    fields.push((key.to_string(), value));
    let refs: Vec<(&str, NodeRef)> = fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    struct_(refs).unwrap_or_else(|_| n.clone())
}

pub(crate) fn input_digest(trimmed: &str) -> String {
    digest_str(trimmed)
}

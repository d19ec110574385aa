//! MATH route (spec.md §4.6 item 1).

use regex::Regex;
use std::sync::OnceLock;

use super::{fast_route_result, RouteExtras, RouteResult};
use crate::lang::LanguageGuess;
use crate::mathexpr;
use crate::node::{number, struct_, text};
use crate::plan::Route;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("static regex is valid"))
}

/// Matches when `trimmed` contains a digit and an arithmetic operator, and
/// parses *in full* as a safe arithmetic expression (no trailing junk).
pub fn try_route(trimmed: &str, guess: &LanguageGuess) -> Option<RouteResult> {
    if !mathexpr::looks_like_math(trimmed) {
        return None;
    }
    let value = mathexpr::eval(trimmed).ok()?;
    let operand_count = number_regex().find_iter(trimmed).count();
    let math_ast = struct_(vec![
        ("operator", text("EXPRESSION")),
        ("operand_count", number(operand_count as f64)),
        ("language", text(guess.code.clone())),
    ])
    .ok()?;

    Some(fast_route_result(
        Route::Math,
        "MATH[EXPRESSION]",
        trimmed,
        guess,
        "math_direct_answer",
        format!("{trimmed} = {value}"),
        1.0,
        RouteExtras { math_ast: Some(math_ast), ..Default::default() },
    ))
}

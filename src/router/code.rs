//! CODE route (spec.md §4.6 item 3): a regex heuristic over Python/Rust
//! (with JS/Elixir as optional extensions per spec.md §9 Open Question (b),
//! left out of the default build).

use regex::Regex;
use std::sync::OnceLock;

use super::{fast_route_result, RouteExtras, RouteResult};
use crate::lang::LanguageGuess;
use crate::node::{number, struct_, text};
use crate::plan::Route;

fn python_keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*(def |class |async def |from |import )").expect("static regex is valid"))
}

fn python_def_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bdef\s+\w+\s*\(").expect("static regex is valid"))
}

fn rust_fn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bfn\s+\w+\s*\([^)]*\)\s*(->\s*\w+\s*)?\{").expect("static regex is valid"))
}

enum Lang {
    Python,
    Rust,
}

fn detect_code_language(trimmed: &str) -> Option<Lang> {
    if python_keyword_regex().is_match(trimmed) {
        Some(Lang::Python)
    } else if rust_fn_regex().is_match(trimmed) {
        Some(Lang::Rust)
    } else {
        None
    }
}

/// Matches when `trimmed` passes a Python or Rust source-code heuristic.
pub fn try_route(trimmed: &str, guess: &LanguageGuess) -> Option<RouteResult> {
    let lang = detect_code_language(trimmed)?;
    let (lang_name, function_count, node_count) = match lang {
        Lang::Python => {
            let fns = python_def_regex().find_iter(trimmed).count();
            let nodes = trimmed.lines().filter(|l| !l.trim().is_empty()).count();
            ("python", fns, nodes.max(1))
        }
        Lang::Rust => {
            let fns = rust_fn_regex().find_iter(trimmed).count();
            let nodes = trimmed.lines().filter(|l| !l.trim().is_empty()).count();
            ("rust", fns, nodes.max(1))
        }
    };

    let code_ast = struct_(vec![
        ("language", text(lang_name)),
        ("node_count", number(node_count as f64)),
    ])
    .ok()?;
    let code_summary = struct_(vec![
        ("function_count", number(function_count as f64)),
        ("action", text(format!("{function_count} definições"))),
    ])
    .ok()?;

    let answer = format!("Módulo {lang_name} com {function_count} definições");

    Some(fast_route_result(
        Route::Code,
        &format!("CODE[{}]", lang_name.to_uppercase()),
        trimmed,
        guess,
        "code_direct_answer",
        answer,
        0.85,
        RouteExtras { code_ast: Some(code_ast), code_summary: Some(code_summary), ..Default::default() },
    ))
}

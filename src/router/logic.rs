//! LOGIC route (spec.md §4.6 item 2): `FACT`/`RULE`/`QUERY` payloads.

use super::{fast_route_result_with_context, RouteExtras, RouteResult};
use crate::lang::LanguageGuess;
use crate::node::{self, NodeRef};
use crate::plan::Route;

enum Payload {
    Fact(String),
    Rule { condition: String, conclusion: String },
    Query(String),
}

fn slug(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "FACT".to_string()
    } else {
        cleaned
    }
}

fn parse_payload(keyword: &str, remainder: &str) -> Option<Payload> {
    let remainder = remainder.trim();
    if remainder.is_empty() {
        return None;
    }
    match keyword {
        "FACT" => Some(Payload::Fact(remainder.to_string())),
        "RULE" => {
            let upper = remainder.to_uppercase();
            let then_ix = upper.find("THEN")?;
            let if_ix = upper.find("IF").unwrap_or(0);
            let condition = remainder[if_ix + 2..then_ix].trim().to_string();
            let conclusion = remainder[then_ix + 4..].trim().to_string();
            if condition.is_empty() || conclusion.is_empty() {
                return None;
            }
            Some(Payload::Rule { condition, conclusion })
        }
        "QUERY" => Some(Payload::Query(remainder.to_string())),
        _ => None,
    }
}

/// Matches when `trimmed` starts with `FACT`/`RULE`/`QUERY` (case-insensitive)
/// followed by whitespace.
pub fn try_route(trimmed: &str, guess: &LanguageGuess) -> Option<RouteResult> {
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let head = parts.next()?;
    let keyword = head.to_uppercase();
    if !matches!(keyword.as_str(), "FACT" | "RULE" | "QUERY") {
        return None;
    }
    let remainder = parts.next().unwrap_or("");
    let payload = parse_payload(&keyword, remainder)?;

    let (trace_label, answer_text, context): (&str, String, Vec<NodeRef>) = match payload {
        Payload::Fact(fact) => {
            let rel = node::relation("HOLDS", vec![node::entity(&fact).ok()?]).ok()?;
            ("LOGIC[FACT]", format!("FACT[{fact}] registrado"), vec![rel])
        }
        Payload::Rule { condition, conclusion } => {
            let rel = node::operation(
                "REWRITE",
                vec![node::text(condition.clone()), node::text(conclusion.clone())],
            )
            .ok()?;
            ("LOGIC[RULE]", format!("RULE registrado: IF {condition} THEN {conclusion}"), vec![rel])
        }
        Payload::Query(query) => {
            let rel = node::relation("HOLDS", vec![node::entity(&slug(&query)).ok()?]).ok()?;
            ("LOGIC[QUERY]", format!("QUERY[{query}]: nenhum fato correspondente"), vec![rel])
        }
    };

    Some(fast_route_result_with_context(
        Route::Logic,
        trace_label,
        trimmed,
        guess,
        "logic_direct_answer",
        answer_text,
        0.9,
        RouteExtras::default(),
        context,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::detect_language;

    #[test]
    fn fact_route_matches() {
        let guess = detect_language("FACT chuva");
        let result = try_route("FACT chuva", &guess).unwrap();
        assert_eq!(result.trace_label, "LOGIC[FACT]");
    }

    #[test]
    fn rule_route_parses_if_then() {
        let guess = detect_language("RULE IF chove THEN molha");
        let result = try_route("RULE IF chove THEN molha", &guess).unwrap();
        assert_eq!(result.trace_label, "LOGIC[RULE]");
    }

    #[test]
    fn non_logic_input_is_none() {
        let guess = detect_language("hello");
        assert!(try_route("hello", &guess).is_none());
    }

    #[test]
    fn bare_keyword_with_no_payload_is_none() {
        let guess = detect_language("FACT");
        assert!(try_route("FACT", &guess).is_none());
    }
}

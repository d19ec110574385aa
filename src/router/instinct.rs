//! INSTINCT route (spec.md §4.6 item 4): greeting/yes/no reflexes — lexicon
//! hits with no ambiguity get a template answer without running the Φ loop.

use super::{fast_route_result, RouteExtras, RouteResult};
use crate::lang::{self, LanguageGuess};
use crate::phi::greeting_template;
use crate::plan::Route;

enum Reflex {
    Greeting,
    Yes,
    No,
}

/// Matches short greeting/yes/no utterances via the per-language lexicon
/// (spec.md §3). Questions and longer statements always fall through to
/// TEXT, even if they also contain a greeting or yes/no word.
pub fn try_route(trimmed: &str, _guess: &LanguageGuess) -> Option<RouteResult> {
    if trimmed.is_empty() {
        return None;
    }
    let feats = lang::extract_language_features(trimmed);
    if feats.has_question_mark || feats.tokens.len() > 4 {
        return None;
    }
    let reflex = if feats.is_greeting_like {
        Reflex::Greeting
    } else if feats.is_yes_like {
        Reflex::Yes
    } else if feats.is_no_like {
        Reflex::No
    } else {
        return None;
    };

    let guess = LanguageGuess { code: feats.lang.clone(), confidence: feats.confidence, scores: feats.raw_scores.clone() };
    let (trace_label, answer_text) = match reflex {
        Reflex::Greeting => {
            let mut answer = greeting_template(&feats.lang).to_string();
            if let Some(vocative) = addressed_name(trimmed) {
                answer.push(' ');
                answer.push_str(&vocative);
            }
            ("INSTINCT[GREETING]", answer)
        }
        Reflex::Yes => ("INSTINCT[YES]", affirmative_template(&feats.lang).to_string()),
        Reflex::No => ("INSTINCT[NO]", negative_template(&feats.lang).to_string()),
    };

    Some(fast_route_result(
        Route::Instinct,
        trace_label,
        trimmed,
        &guess,
        "instinct_direct_answer",
        answer_text,
        0.9,
        RouteExtras::default(),
    ))
}

/// Picks out a capitalized word from `trimmed` that isn't itself a greeting
/// token, so `"Oi Metanúcleo!"` answers with the name attached rather than
/// the bare template.
fn addressed_name(trimmed: &str) -> Option<String> {
    for raw in trimmed.split_whitespace() {
        let cleaned: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        if cleaned.is_empty() {
            continue;
        }
        let lower = cleaned.to_lowercase();
        let is_greeting_word = lang::profiles().iter().any(|p| p.greetings.iter().any(|g| *g == lower));
        if is_greeting_word {
            continue;
        }
        if cleaned.chars().next().is_some_and(char::is_uppercase) {
            return Some(cleaned);
        }
    }
    None
}

fn affirmative_template(lang_code: &str) -> &'static str {
    match lang_code {
        "pt" => "Entendido, confirmado.",
        "es" => "Entendido, confirmado.",
        "fr" => "Compris, confirmé.",
        "it" => "Capito, confermato.",
        "de" => "Verstanden, bestätigt.",
        _ => "Got it, confirmed.",
    }
}

fn negative_template(lang_code: &str) -> &'static str {
    match lang_code {
        "pt" => "Entendido, negado.",
        "es" => "Entendido, denegado.",
        "fr" => "Compris, refusé.",
        "it" => "Capito, negato.",
        "de" => "Verstanden, abgelehnt.",
        _ => "Got it, declined.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::detect_language;

    #[test]
    fn greeting_reflex_matches() {
        let guess = detect_language("hi");
        let result = try_route("hi", &guess).unwrap();
        assert_eq!(result.trace_label, "INSTINCT[GREETING]");
    }

    #[test]
    fn yes_reflex_matches() {
        let guess = detect_language("yes");
        let result = try_route("yes", &guess).unwrap();
        assert_eq!(result.trace_label, "INSTINCT[YES]");
    }

    #[test]
    fn no_reflex_matches() {
        let guess = detect_language("no");
        let result = try_route("no", &guess).unwrap();
        assert_eq!(result.trace_label, "INSTINCT[NO]");
    }

    #[test]
    fn greeting_with_vocative_carries_the_name() {
        let trimmed = "Oi Metanúcleo!";
        let guess = detect_language(trimmed);
        let result = try_route(trimmed, &guess).unwrap();
        let answer = result.preseed_answer.unwrap().as_text().unwrap().to_string();
        assert!(answer.starts_with("Olá"));
        assert!(answer.contains("Metanúcleo"));
    }

    #[test]
    fn question_falls_through_to_none() {
        let guess = detect_language("hi, how are you?");
        assert!(try_route("hi, how are you?", &guess).is_none());
    }

    #[test]
    fn long_statement_falls_through_to_none() {
        let guess = detect_language("hello my friend it is a nice day today");
        assert!(try_route("hello my friend it is a nice day today", &guess).is_none());
    }
}

//! Six-language deterministic profile table (SPEC_FULL.md §3), ported from
//! `lang_profiles.py`: stopword/greeting/question-marker scoring per
//! language, with `¿`/`¡` and Latin-diacritic fast paths ahead of the
//! stopword fallback.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

pub struct LanguageProfile {
    pub code: &'static str,
    pub stopwords: &'static [&'static str],
    pub greetings: &'static [&'static str],
    pub question_markers: &'static [&'static str],
    pub yes_words: &'static [&'static str],
    pub no_words: &'static [&'static str],
    pub command_markers: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct LanguageGuess {
    pub code: String,
    pub confidence: f64,
    pub scores: HashMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct LanguageFeatures {
    pub lang: String,
    pub confidence: f64,
    pub tokens: Vec<String>,
    pub has_question_mark: bool,
    pub is_greeting_like: bool,
    pub is_yes_like: bool,
    pub is_no_like: bool,
    pub raw_scores: HashMap<String, f64>,
}

macro_rules! profile {
    ($code:literal, $stop:expr, $greet:expr, $q:expr, $yes:expr, $no:expr, $cmd:expr) => {
        LanguageProfile {
            code: $code,
            stopwords: &$stop,
            greetings: &$greet,
            question_markers: &$q,
            yes_words: &$yes,
            no_words: &$no,
            command_markers: &$cmd,
        }
    };
}

pub fn profiles() -> &'static [LanguageProfile] {
    static PROFILES: OnceLock<Vec<LanguageProfile>> = OnceLock::new();
    PROFILES.get_or_init(|| {
        vec![
            profile!(
                "pt",
                ["o", "a", "os", "as", "um", "uma", "de", "do", "da", "das", "dos", "em", "no",
                 "na", "nos", "nas", "por", "pra", "para", "com", "sem", "é", "ser", "estar",
                 "foi", "era", "que", "se", "e", "ou", "mas", "eu", "tu", "você", "voce", "ele",
                 "ela", "nós", "nos", "eles", "elas"],
                ["oi", "olá", "ola", "bom dia", "boa tarde", "boa noite"],
                ["?", "por que", "porque", "como", "quando", "onde", "quem", "qual", "quais"],
                ["sim", "claro", "com certeza", "aham"],
                ["não", "nao", "nunca", "jamais"],
                ["faça", "faz", "cria", "gera", "mostra", "executa", "roda", "abre", "fecha", "lista"]
            ),
            profile!(
                "en",
                ["the", "a", "an", "and", "or", "but", "to", "of", "in", "on", "at", "for",
                 "with", "without", "is", "are", "am", "was", "were", "be", "being", "been",
                 "i", "you", "he", "she", "it", "we", "they"],
                ["hi", "hello", "hey", "good morning", "good afternoon", "good evening"],
                ["?", "why", "how", "when", "where", "who", "which"],
                ["yes", "yep", "yeah", "sure", "of course"],
                ["no", "nope", "never"],
                ["run", "execute", "do", "create", "make", "show", "list", "reset"]
            ),
            profile!(
                "es",
                ["el", "la", "los", "las", "un", "una", "unos", "unas", "de", "del", "en", "por",
                 "para", "con", "sin", "y", "o", "pero", "que", "se", "soy", "eres", "es",
                 "somos", "son", "yo", "tú", "tu", "usted", "nosotros", "ellos", "ellas"],
                ["hola", "buenos dias", "buenas tardes", "buenas noches"],
                ["?", "por qué", "porque", "como", "cuando", "donde", "quien", "qué"],
                ["sí", "si", "claro", "por supuesto"],
                ["no", "nunca", "jamás", "jamas"],
                ["haz", "hacer", "ejecuta", "lista", "muestra"]
            ),
            profile!(
                "fr",
                ["le", "la", "les", "un", "une", "des", "de", "du", "en", "dans", "pour", "avec",
                 "sans", "et", "ou", "mais", "que", "je", "tu", "il", "elle", "nous", "vous",
                 "ils", "elles"],
                ["salut", "bonjour", "bonsoir"],
                ["?", "pourquoi", "comment", "quand", "où", "ou", "qui", "quel"],
                ["oui", "bien sûr"],
                ["non", "jamais"],
                ["fais", "faire", "montre", "liste"]
            ),
            profile!(
                "it",
                ["il", "lo", "la", "i", "gli", "le", "un", "una", "di", "del", "della", "in",
                 "su", "per", "con", "senza", "e", "o", "ma", "che", "io", "tu", "lui", "lei",
                 "noi", "voi", "loro"],
                ["ciao", "buongiorno", "buonasera"],
                ["?", "perché", "perche", "come", "quando", "dove", "chi"],
                ["sì", "si", "certo"],
                ["no", "mai"],
                ["esegui", "fai", "crea", "mostra", "lista"]
            ),
            profile!(
                "de",
                ["der", "die", "das", "ein", "eine", "von", "zu", "in", "auf", "mit", "ohne",
                 "für", "und", "oder", "aber", "dass", "ich", "du", "er", "sie", "es", "wir",
                 "ihr"],
                ["hallo", "guten tag", "guten morgen", "guten abend"],
                ["?", "warum", "wie", "wann", "wo", "wer"],
                ["ja", "doch"],
                ["nein", "niemals"],
                ["mach", "ausführen", "liste", "zeige"]
            ),
        ]
    })
}

fn profile_for(code: &str) -> Option<&'static LanguageProfile> {
    profiles().iter().find(|p| p.code == code)
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-zA-ZÀ-ÖØ-öø-ÿ0-9_]+").expect("static regex is valid"))
}

pub fn tokenize(text: &str) -> Vec<String> {
    word_regex().find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Detects the dominant language of `text` per spec.md §4.6: explicit
/// `¿`/`¡` signals Spanish, Latin diacritics signal Portuguese, otherwise
/// per-language stopword/greeting/question-marker scoring decides.
pub fn detect_language(text: &str) -> LanguageGuess {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return LanguageGuess { code: "unknown".to_string(), confidence: 0.0, scores: HashMap::new() };
    }

    if text.contains('¿') || text.contains('¡') {
        let mut scores = HashMap::new();
        scores.insert("es".to_string(), 1.0);
        return LanguageGuess { code: "es".to_string(), confidence: 1.0, scores };
    }
    let lowered_full = text.to_lowercase();
    if lowered_full.chars().any(|c| "ãõáéíóúâêôç".contains(c)) {
        let mut scores = HashMap::new();
        scores.insert("pt".to_string(), 1.0);
        return LanguageGuess { code: "pt".to_string(), confidence: 0.9, scores };
    }

    let lowered = tokens.join(" ");
    let mut scores: HashMap<String, f64> = HashMap::new();
    for profile in profiles() {
        let mut score = 0.0;
        for token in &tokens {
            if profile.stopwords.contains(&token.as_str()) {
                score += 1.0;
            }
        }
        for greet in profile.greetings {
            if lowered.contains(greet) {
                score += 2.5;
            }
        }
        for qm in profile.question_markers {
            if lowered.contains(qm) {
                score += 1.5;
            }
        }
        scores.insert(profile.code.to_string(), score);
    }

    let (best_code, best_score) = scores
        .iter()
        .fold(("unknown".to_string(), 0.0_f64), |acc, (code, score)| {
            if *score > acc.1 {
                (code.clone(), *score)
            } else {
                acc
            }
        });
    let confidence = if best_score <= 0.0 { 0.0 } else { best_score / (best_score + 5.0) };
    let code = if best_score > 0.0 { best_code } else { "unknown".to_string() };
    LanguageGuess { code, confidence, scores }
}

pub fn normalize_for_language(text: &str, lang_code: Option<&str>) -> Vec<String> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return tokens;
    }
    let code = lang_code.map(str::to_string).unwrap_or_else(|| detect_language(text).code);
    match profile_for(&code) {
        Some(profile) => tokens.into_iter().filter(|t| !profile.stopwords.contains(&t.as_str())).collect(),
        None => tokens,
    }
}

pub fn extract_language_features(text: &str) -> LanguageFeatures {
    let guess = detect_language(text);
    let profile = profile_for(&guess.code);
    let tokens = normalize_for_language(text, Some(&guess.code));
    let joined = tokens.join(" ");

    let contains = |words: &[&str]| words.iter().any(|w| joined.contains(w));

    let has_q = text.contains('?');
    let is_greeting = profile.map(|p| contains(p.greetings)).unwrap_or(false);
    let is_yes = profile.map(|p| contains(p.yes_words)).unwrap_or(false);
    let is_no = profile.map(|p| contains(p.no_words)).unwrap_or(false);

    LanguageFeatures {
        lang: guess.code,
        confidence: guess.confidence,
        tokens,
        has_question_mark: has_q,
        is_greeting_like: is_greeting,
        is_yes_like: is_yes,
        is_no_like: is_no,
        raw_scores: guess.scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_greeting() {
        let guess = detect_language("hello there, how are you?");
        assert_eq!(guess.code, "en");
    }

    #[test]
    fn detects_portuguese_via_diacritic_fast_path() {
        let guess = detect_language("Você está aí?");
        assert_eq!(guess.code, "pt");
    }

    #[test]
    fn detects_spanish_via_inverted_punctuation() {
        let guess = detect_language("¿Cómo estás?");
        assert_eq!(guess.code, "es");
    }

    #[test]
    fn empty_text_is_unknown() {
        let guess = detect_language("   ");
        assert_eq!(guess.code, "unknown");
        assert_eq!(guess.confidence, 0.0);
    }

    #[test]
    fn extract_features_detects_question() {
        let feats = extract_language_features("how are you?");
        assert!(feats.has_question_mark);
        assert_eq!(feats.lang, "en");
    }
}

//! Lexical normalization for tool scoring.
//!
//! A small rule-based English lemmatizer: irregular forms are looked up,
//! regular inflections are stripped by suffix rules, and a final silent `e`
//! is dropped. The result is a comparison key rather than a dictionary word
//! (`schedule`, `scheduled` and `scheduling` all become `schedul`), applied
//! the same way to requests and to tool descriptions.

use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Stop words
// ---------------------------------------------------------------------------

/// Function words that carry no tool-selection signal.
///
/// Intent verbs such as `call`, `get`, `show` and `play` are deliberately
/// absent.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are",
    "as", "at", "be", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "either", "else", "even",
    "ever", "every", "for", "from", "further", "had", "has", "have", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "may", "me", "might", "mine", "more", "most", "much", "must",
    "my", "myself", "neither", "no", "nor", "not", "now", "of", "off", "often", "on", "once",
    "only", "onto", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "per",
    "please", "quite", "rather", "really", "same", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "though", "through", "thus", "to", "too", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "were", "what", "whatever", "when", "where",
    "whether", "which", "while", "who", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

// ---------------------------------------------------------------------------
// Lemmatizer
// ---------------------------------------------------------------------------

const IRREGULAR: &[(&str, &str)] = &[
    ("woke", "wake"),
    ("woken", "wake"),
    ("sent", "send"),
    ("found", "find"),
    ("got", "get"),
    ("gotten", "get"),
    ("went", "go"),
    ("gone", "go"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("told", "tell"),
    ("said", "say"),
    ("saw", "see"),
    ("seen", "see"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("wrote", "write"),
    ("written", "write"),
    ("gave", "give"),
    ("given", "give"),
    ("left", "leave"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("began", "begin"),
    ("begun", "begin"),
    ("rang", "ring"),
    ("rung", "ring"),
    ("sang", "sing"),
    ("sung", "sing"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("felt", "feel"),
    ("kept", "keep"),
    ("held", "hold"),
    ("heard", "hear"),
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("news", "news"),
    ("series", "series"),
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(stem: &str) -> bool {
    stem.chars().any(|c| is_vowel(c) || c == 'y')
}

/// Drop one letter of a doubled final consonant (`sett` -> `set`).
fn undouble(stem: &str) -> &str {
    let mut tail = stem.char_indices().rev();
    match (tail.next(), tail.next()) {
        (Some((last_at, last)), Some((_, prev)))
            if last == prev
                && last.is_ascii_alphabetic()
                && !is_vowel(last)
                && !matches!(last, 'l' | 's' | 'z') =>
        {
            &stem[..last_at]
        }
        _ => stem,
    }
}

fn strip_inflection(word: &str) -> String {
    if word.len() <= 3 {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies").or_else(|| word.strip_suffix("ied")) {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    for suffix in ["ches", "shes", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('s') {
        return stem.to_string();
    }
    for suffix in ["ing", "ed"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            if stem.len() >= 3 && has_vowel(stem) {
                return undouble(stem).to_string();
            }
        }
    }
    word.to_string()
}

/// Comparison lemma of one lowercase alphabetic word.
pub fn lemma(word: &str) -> String {
    let base = match IRREGULAR.iter().find(|(form, _)| *form == word) {
        Some((_, base)) => base.to_string(),
        None => strip_inflection(word),
    };
    match base.strip_suffix('e') {
        Some(stem) if base.len() > 3 => stem.to_string(),
        _ => base,
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Lowercase, split on anything non-alphabetic (so `get_weather` yields
/// `get` and `weather`), drop stop words and single letters, lemmatize.
pub fn lemmas(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() > 1 && !is_stop_word(w))
        .map(lemma)
        .collect()
}

// ---------------------------------------------------------------------------
// Synonyms
// ---------------------------------------------------------------------------

const SYNONYMS: &[(&str, &[&str])] = &[
    ("wake", &["alarm"]),
    ("text", &["message", "send"]),
    ("find", &["search", "contact"]),
    ("look", &["search", "contact"]),
    ("music", &["play", "song"]),
    ("weather", &["temperature"]),
    ("remind", &["reminder"]),
    ("call", &["contact"]),
];

/// Add the synonyms of every lemma in `lemmas`.
///
/// Expansion is one step; synonyms are not expanded again.
pub fn expand_synonyms(lemmas: &HashSet<String>) -> HashSet<String> {
    let mut expanded = lemmas.clone();
    for (word, synonyms) in SYNONYMS {
        if lemmas.contains(&lemma(word)) {
            expanded.extend(synonyms.iter().map(|s| lemma(s)));
        }
    }
    expanded
}

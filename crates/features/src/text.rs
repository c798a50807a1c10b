//! Text preprocessing for the lexical model.
//!
//! Lower-cases, strips accents, and splits documents into word tokens of two
//! or more characters, then expands them into contiguous n-grams.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"))
}

/// Lower-case and remove combining accents (`"Café"` -> `"cafe"`).
pub fn normalize_text(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Split normalized text into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    token_re()
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Expand tokens into all n-grams with `1 <= n <= max_n`, space-joined.
pub fn ngrams(tokens: &[String], max_n: usize) -> Vec<String> {
    let mut terms = Vec::with_capacity(tokens.len() * max_n.max(1));
    for n in 1..=max_n.max(1) {
        if tokens.len() < n {
            break;
        }
        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    terms
}

/// Tokenize and expand one document into its terms.
pub fn analyze(text: &str, max_n: usize) -> Vec<String> {
    ngrams(&tokenize(text), max_n)
}

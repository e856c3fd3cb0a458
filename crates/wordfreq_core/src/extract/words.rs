//! Lexical filter for candidate words.

use crate::model::word::WORD_LENGTH;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b[a-zA-Z]{{{WORD_LENGTH}}}\b")).expect("valid word regex")
});

/// Lowercased tokens of exactly five ASCII letters bounded by word breaks.
pub fn words_in_text(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE
        .find_iter(text)
        .map(|token| token.as_str().to_ascii_lowercase())
}

//! Word records and the rule for what counts as a word.
//!
//! # Invariants
//! - A valid word is exactly `WORD_LENGTH` lowercase ASCII letters.
//! - Stored counts are never negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of letters in every tracked word.
pub const WORD_LENGTH: usize = 5;

/// Cumulative occurrences of one word across all recorded documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: i64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: i64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }

    /// Checks the word shape and count sign before persistence.
    pub fn validate(&self) -> Result<(), WordValidationError> {
        validate_word(&self.word)?;
        if self.count < 0 {
            return Err(WordValidationError::NegativeCount {
                word: self.word.clone(),
                count: self.count,
            });
        }
        Ok(())
    }
}

/// Rejected word or count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordValidationError {
    /// Not exactly five lowercase ASCII letters.
    Malformed(String),
    NegativeCount { word: String, count: i64 },
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(word) => write!(
                f,
                "`{word}` is not {WORD_LENGTH} lowercase ASCII letters"
            ),
            Self::NegativeCount { word, count } => {
                write!(f, "negative count {count} for word `{word}`")
            }
        }
    }
}

impl Error for WordValidationError {}

/// Accepts only words that could have come out of the extractor.
pub fn validate_word(word: &str) -> Result<(), WordValidationError> {
    if word.len() == WORD_LENGTH && word.bytes().all(|b| b.is_ascii_lowercase()) {
        Ok(())
    } else {
        Err(WordValidationError::Malformed(word.to_string()))
    }
}

/// Lowercases and validates free-form input such as a CLI argument.
pub fn normalize_word(raw: &str) -> Result<String, WordValidationError> {
    let word = raw.trim().to_ascii_lowercase();
    validate_word(&word)?;
    Ok(word)
}

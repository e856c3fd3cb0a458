//! Scraped document record.

use serde::{Deserialize, Serialize};

/// One processed source page.
///
/// Written once when the page is first counted and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Canonical identifier after redirects, used as the dedup key.
    pub url: String,
    /// Sum of all five-letter word occurrences counted on the page.
    pub word_count: i64,
}

impl Document {
    pub fn new(url: impl Into<String>, word_count: i64) -> Self {
        Self {
            url: url.into(),
            word_count,
        }
    }
}

/// Aggregate over every recorded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub documents: i64,
    pub words: i64,
}

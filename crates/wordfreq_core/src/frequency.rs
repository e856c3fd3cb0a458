//! Per-document word frequencies.
//!
//! The map is owned by a single pipeline iteration and folded into the
//! global counts by the persistence layer. Nothing here is shared.

use std::collections::BTreeMap;

/// Word to occurrences within one document. Ordered so that logs and SQL
/// batches are deterministic.
pub type FrequencyMap = BTreeMap<String, i64>;

/// Counts occurrences of each word.
pub fn aggregate<I, S>(words: I) -> FrequencyMap
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts = FrequencyMap::new();
    for word in words {
        *counts.entry(word.into()).or_insert(0) += 1;
    }
    counts
}

/// Sum of all occurrences in `counts`.
pub fn total_occurrences(counts: &FrequencyMap) -> i64 {
    counts.values().sum()
}

//! Word extraction from fetched page content.
//!
//! # Responsibility
//! - Narrow an HTML page down to its article prose.
//! - Turn prose into normalized five-letter candidate words.
//!
//! # Invariants
//! - Output words are lowercase ASCII and exactly five letters long.
//! - No matches is an empty result, never an error.

pub mod html;
pub mod words;

pub use html::{content_fragments, ContentFragments};
pub use words::words_in_text;

/// Extracts every candidate word from paragraph prose and inline link labels
/// of the main content region.
pub fn extract_words(content: &str) -> Vec<String> {
    let fragments = content_fragments(content);
    fragments
        .all()
        .flat_map(|fragment| words_in_text(fragment))
        .collect()
}

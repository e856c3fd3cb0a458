//! Persisted records of the scraper.
//!
//! # Invariants
//! - A `Document` is identified by its canonical (post-redirect) URL.
//! - A `WordCount` is identified by its normalized word.
//! - Neither record is ever deleted.

pub mod document;
pub mod word;

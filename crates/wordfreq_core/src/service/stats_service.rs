//! Persistence gateway for document and word statistics.
//!
//! # Responsibility
//! - Implement the dedup-then-record-then-upsert protocol on top of the
//!   document and word repositories.
//! - Provide dictionary and summary read-backs.
//!
//! # Invariants
//! - `record_document` is only meaningful after `has_document` returned
//!   `false`; the check and the insert are not atomic, so a single writer
//!   per store is assumed.
//! - A failed word upsert commits nothing and yields an empty list.

use crate::frequency::FrequencyMap;
use crate::logging::single_line;
use crate::model::document::{Document, DocumentTotals};
use crate::model::word::{normalize_word, WordCount};
use crate::repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
use crate::repo::word_repo::{SqliteWordCountRepository, WordCountRepository};
use crate::repo::RepoResult;
use log::{debug, error, info};
use rusqlite::Connection;
use std::time::Instant;

const MAX_LOGGED_PAYLOAD_CHARS: usize = 4_000;

/// Store operations the pipeline runner relies on.
pub trait PersistenceGateway {
    /// Exact-match lookup of a canonical document URL.
    fn has_document(&self, url: &str) -> RepoResult<bool>;
    /// Inserts a document row. Call only after `has_document` returned false.
    fn record_document(&self, url: &str, total_word_count: i64) -> RepoResult<()>;
    /// Adds `counts` onto the stored totals.
    ///
    /// Returns the post-upsert rows, or an empty list when nothing was
    /// committed. Failures are logged with the attempted payload.
    fn upsert_word_counts(&self, counts: &FrequencyMap) -> Vec<WordCount>;
}

/// Gateway plus read-back use-cases over a pair of repositories.
pub struct StatsService<D: DocumentRepository, W: WordCountRepository> {
    documents: D,
    words: W,
}

impl<'conn> StatsService<SqliteDocumentRepository<'conn>, SqliteWordCountRepository<'conn>> {
    /// Wires SQLite repositories over one migrated connection.
    pub fn for_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteDocumentRepository::try_new(conn)?,
            SqliteWordCountRepository::try_new(conn)?,
        ))
    }
}

impl<D: DocumentRepository, W: WordCountRepository> StatsService<D, W> {
    pub fn new(documents: D, words: W) -> Self {
        Self { documents, words }
    }

    pub fn get_document(&self, url: &str) -> RepoResult<Option<Document>> {
        self.documents.get_document(url)
    }

    pub fn document_totals(&self) -> RepoResult<DocumentTotals> {
        self.documents.document_totals()
    }

    /// All counted words except those flagged invalid, ordered by word.
    pub fn dictionary(&self) -> RepoResult<Vec<WordCount>> {
        self.words.list_word_counts(true)
    }

    /// Stored counts for `words`, normalized first. Malformed input words
    /// are rejected rather than silently skipped.
    pub fn lookup_words(&self, words: &[&str]) -> RepoResult<Vec<WordCount>> {
        let normalized = words
            .iter()
            .map(|word| normalize_word(word))
            .collect::<Result<Vec<_>, _>>()?;
        self.words.get_word_counts(&normalized)
    }

    /// Flags `raw` as invalid. Returns `false` when it was already flagged.
    pub fn mark_invalid_word(&self, raw: &str) -> RepoResult<bool> {
        let word = normalize_word(raw)?;
        let inserted = self.words.mark_invalid_word(&word)?;
        info!(
            "event=invalid_word module=service status=ok word={} inserted={}",
            word, inserted
        );
        Ok(inserted)
    }

    pub fn invalid_words(&self) -> RepoResult<Vec<String>> {
        self.words.list_invalid_words()
    }
}

impl<D: DocumentRepository, W: WordCountRepository> PersistenceGateway for StatsService<D, W> {
    fn has_document(&self, url: &str) -> RepoResult<bool> {
        let exists = self.documents.has_document(url)?;
        debug!(
            "event=document_check module=service status=ok url={} exists={}",
            url, exists
        );
        Ok(exists)
    }

    fn record_document(&self, url: &str, total_word_count: i64) -> RepoResult<()> {
        match self
            .documents
            .record_document(&Document::new(url, total_word_count))
        {
            Ok(()) => {
                info!(
                    "event=document_record module=service status=ok url={} word_count={}",
                    url, total_word_count
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=document_record module=service status=error url={} word_count={} error={}",
                    url, total_word_count, err
                );
                Err(err)
            }
        }
    }

    fn upsert_word_counts(&self, counts: &FrequencyMap) -> Vec<WordCount> {
        if counts.is_empty() {
            return Vec::new();
        }

        let started_at = Instant::now();
        match self.words.upsert_word_counts(counts) {
            Ok(rows) => {
                info!(
                    "event=word_upsert module=service status=ok words={} duration_ms={}",
                    rows.len(),
                    started_at.elapsed().as_millis()
                );
                rows
            }
            Err(err) => {
                error!(
                    "event=word_upsert module=service status=error words={} duration_ms={} error={} attempted={}",
                    counts.len(),
                    started_at.elapsed().as_millis(),
                    err,
                    describe_payload(counts)
                );
                Vec::new()
            }
        }
    }
}

/// `word:count` pairs, comma separated, capped for the log line.
fn describe_payload(counts: &FrequencyMap) -> String {
    let pairs = counts
        .iter()
        .map(|(word, count)| format!("{word}:{count}"))
        .collect::<Vec<_>>()
        .join(",");
    single_line(&pairs, MAX_LOGGED_PAYLOAD_CHARS)
}

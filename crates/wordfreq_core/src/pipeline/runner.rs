//! Fetch, extract, aggregate and persist one document.
//!
//! Stages: `Fetching -> Extracting -> Aggregating -> Checking ->
//! (Skipped | Persisting) -> Done`. A fetch failure jumps straight to `Done`
//! without touching the store.

use crate::extract::extract_words;
use crate::fetch::DocumentFetcher;
use crate::frequency::{aggregate, total_occurrences};
use crate::service::stats_service::PersistenceGateway;
use log::{debug, error, info, warn};
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Aggregating,
    Checking,
    Skipped,
    Persisting,
    Done,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Aggregating => "aggregating",
            Self::Checking => "checking",
            Self::Skipped => "skipped",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }
}

/// Store step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStep {
    /// Store could not be opened for this iteration.
    StoreOpen,
    DocumentCheck,
    /// Nothing was written.
    DocumentRecord,
    /// The document row is committed but its word counts are not.
    WordUpsert,
}

impl PersistStep {
    fn as_str(self) -> &'static str {
        match self {
            Self::StoreOpen => "store_open",
            Self::DocumentCheck => "document_check",
            Self::DocumentRecord => "document_record",
            Self::WordUpsert => "word_upsert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    Recorded { total_words: i64 },
    /// Document was already recorded; nothing was written.
    Skipped,
    FetchFailed { status: Option<u16>, reason: String },
    PersistFailed { step: PersistStep, reason: String },
}

/// What an iteration reports on reaching `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    /// Reference handed to the fetcher.
    pub reference: String,
    /// Canonical URL, absent when the fetch failed.
    pub url: Option<String>,
    /// Distinct words committed; zero when skipped or failed.
    pub distinct_words: usize,
    pub outcome: IterationOutcome,
}

impl IterationReport {
    pub(crate) fn store_unavailable(reference: &str, reason: String) -> Self {
        Self {
            reference: reference.to_string(),
            url: None,
            distinct_words: 0,
            outcome: IterationOutcome::PersistFailed {
                step: PersistStep::StoreOpen,
                reason,
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            IterationOutcome::FetchFailed { .. } | IterationOutcome::PersistFailed { .. }
        )
    }
}

impl Display for IterationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let url = self.url.as_deref().unwrap_or("-");
        match &self.outcome {
            IterationOutcome::Recorded { total_words } => write!(
                f,
                "{url}: {} distinct words ({total_words} total)",
                self.distinct_words
            ),
            IterationOutcome::Skipped => write!(f, "{url}: already scraped, skipped"),
            IterationOutcome::FetchFailed {
                status: Some(status),
                ..
            } => write!(
                f,
                "request to {} failed with status: {status}",
                self.reference
            ),
            IterationOutcome::FetchFailed { reason, .. } => write!(f, "{reason}"),
            IterationOutcome::PersistFailed { step, reason } => write!(
                f,
                "{url}: persistence failed at {}: {reason}",
                step.as_str()
            ),
        }
    }
}

/// Drives single iterations for one source reference.
pub struct PipelineRunner<F: DocumentFetcher> {
    fetcher: F,
    reference: String,
}

impl<F: DocumentFetcher> PipelineRunner<F> {
    pub fn new(fetcher: F, reference: impl Into<String>) -> Self {
        Self {
            fetcher,
            reference: reference.into(),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs one iteration to `Done` against `gateway`.
    pub fn run_iteration<G: PersistenceGateway>(&self, gateway: &G) -> IterationReport {
        let started_at = Instant::now();
        let report = self.run_stages(gateway);
        enter(Stage::Done);

        let outcome = match &report.outcome {
            IterationOutcome::Recorded { .. } => "recorded",
            IterationOutcome::Skipped => "skipped",
            IterationOutcome::FetchFailed { .. } => "fetch_failed",
            IterationOutcome::PersistFailed { .. } => "persist_failed",
        };
        if report.is_failure() {
            warn!(
                "event=iteration module=pipeline status=error outcome={} reference={} url={} duration_ms={}",
                outcome,
                report.reference,
                report.url.as_deref().unwrap_or("-"),
                started_at.elapsed().as_millis()
            );
        } else {
            info!(
                "event=iteration module=pipeline status=ok outcome={} url={} distinct_words={} duration_ms={}",
                outcome,
                report.url.as_deref().unwrap_or("-"),
                report.distinct_words,
                started_at.elapsed().as_millis()
            );
        }
        report
    }

    fn run_stages<G: PersistenceGateway>(&self, gateway: &G) -> IterationReport {
        enter(Stage::Fetching);
        let document = match self.fetcher.fetch(&self.reference) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    "event=fetch module=pipeline status=error reference={} error_code={} error={}",
                    self.reference,
                    err.code(),
                    err
                );
                return IterationReport {
                    reference: self.reference.clone(),
                    url: None,
                    distinct_words: 0,
                    outcome: IterationOutcome::FetchFailed {
                        status: err.status(),
                        reason: err.to_string(),
                    },
                };
            }
        };

        let url = document.url;
        let report = |distinct_words: usize, outcome: IterationOutcome| IterationReport {
            reference: self.reference.clone(),
            url: Some(url.clone()),
            distinct_words,
            outcome,
        };
        let persist_failed = |step: PersistStep, reason: String| {
            report(0, IterationOutcome::PersistFailed { step, reason })
        };

        enter(Stage::Extracting);
        let words = extract_words(&document.content);
        debug!(
            "event=extract module=pipeline status=ok url={} words={}",
            url,
            words.len()
        );

        enter(Stage::Aggregating);
        let counts = aggregate(words);
        let total_words = total_occurrences(&counts);

        enter(Stage::Checking);
        match gateway.has_document(&url) {
            Ok(true) => {
                enter(Stage::Skipped);
                return report(0, IterationOutcome::Skipped);
            }
            Ok(false) => {}
            Err(err) => return persist_failed(PersistStep::DocumentCheck, err.to_string()),
        }

        enter(Stage::Persisting);
        if let Err(err) = gateway.record_document(&url, total_words) {
            return persist_failed(PersistStep::DocumentRecord, err.to_string());
        }

        let stored = gateway.upsert_word_counts(&counts);
        if stored.is_empty() && !counts.is_empty() {
            error!(
                "event=persist_partial module=pipeline status=error url={} document_recorded=true word_counts_committed=false words={}",
                url,
                counts.len()
            );
            return persist_failed(
                PersistStep::WordUpsert,
                format!(
                    "document recorded but {} word counts were not committed",
                    counts.len()
                ),
            );
        }

        report(stored.len(), IterationOutcome::Recorded { total_words })
    }
}

fn enter(stage: Stage) {
    debug!(
        "event=iteration_stage module=pipeline status=ok stage={}",
        stage.as_str()
    );
}

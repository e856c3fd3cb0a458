//! Core of the five-letter word frequency scraper.
//! Owns extraction, aggregation and the idempotent persistence protocol.

pub mod config;
pub mod db;
pub mod extract;
pub mod fetch;
pub mod frequency;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ScraperConfig};
pub use extract::extract_words;
pub use fetch::{DocumentFetcher, FetchError, FetchResult, FetchedDocument, HttpDocumentFetcher};
pub use frequency::{aggregate, FrequencyMap};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::{Document, DocumentTotals};
pub use model::word::{WordCount, WordValidationError, WORD_LENGTH};
pub use pipeline::{
    run_cadence, CadenceSummary, IterationOutcome, IterationReport, PersistStep, PipelineRunner,
};
pub use repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
pub use repo::word_repo::{SqliteWordCountRepository, WordCountRepository};
pub use repo::{RepoError, RepoResult};
pub use service::stats_service::{PersistenceGateway, StatsService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

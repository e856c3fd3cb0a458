use std::cell::{Cell, RefCell};
use std::time::Duration;
use wordfreq_core::db::{open_db, open_db_in_memory, DbError};
use wordfreq_core::{
    run_cadence, CadenceSummary, DocumentFetcher, FetchError, FetchResult, FetchedDocument,
    FrequencyMap, IterationOutcome, PersistStep, PersistenceGateway, PipelineRunner, RepoResult,
    StatsService, WordCount,
};

const RANDOM: &str = "https://en.wikipedia.org/wiki/Special:Random";
const TARN: &str = "https://en.wikipedia.org/wiki/Tarn";

fn page(prose: &str) -> String {
    format!(r#"<html><body><div class="mw-parser-output"><p>{prose}</p></div></body></html>"#)
}

fn document(url: &str, prose: &str) -> FetchedDocument {
    FetchedDocument {
        url: url.to_string(),
        content: page(prose),
    }
}

/// Serves the given pages in order, then repeats the last one.
struct SequenceFetcher {
    pages: Vec<FetchedDocument>,
    next: Cell<usize>,
}

impl SequenceFetcher {
    fn new(pages: Vec<FetchedDocument>) -> Self {
        Self {
            pages,
            next: Cell::new(0),
        }
    }
}

impl DocumentFetcher for SequenceFetcher {
    fn fetch(&self, _reference: &str) -> FetchResult<FetchedDocument> {
        let index = self.next.get().min(self.pages.len() - 1);
        self.next.set(self.next.get() + 1);
        Ok(self.pages[index].clone())
    }
}

struct FailingFetcher {
    status: u16,
}

impl DocumentFetcher for FailingFetcher {
    fn fetch(&self, reference: &str) -> FetchResult<FetchedDocument> {
        Err(FetchError::Status {
            reference: reference.to_string(),
            status: self.status,
        })
    }
}

/// Records every gateway call; optionally drops word upserts on the floor.
struct RecordingGateway<G> {
    inner: G,
    calls: RefCell<Vec<&'static str>>,
    fail_upsert: bool,
}

impl<G> RecordingGateway<G> {
    fn new(inner: G) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
            fail_upsert: false,
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl<G: PersistenceGateway> PersistenceGateway for RecordingGateway<G> {
    fn has_document(&self, url: &str) -> RepoResult<bool> {
        self.calls.borrow_mut().push("has_document");
        self.inner.has_document(url)
    }

    fn record_document(&self, url: &str, total_word_count: i64) -> RepoResult<()> {
        self.calls.borrow_mut().push("record_document");
        self.inner.record_document(url, total_word_count)
    }

    fn upsert_word_counts(&self, counts: &FrequencyMap) -> Vec<WordCount> {
        self.calls.borrow_mut().push("upsert_word_counts");
        if self.fail_upsert {
            return Vec::new();
        }
        self.inner.upsert_word_counts(counts)
    }
}

#[test]
fn new_document_is_recorded_with_its_word_counts() {
    let conn = open_db_in_memory().unwrap();
    let service = StatsService::for_connection(&conn).unwrap();
    let fetcher = SequenceFetcher::new(vec![document(
        TARN,
        "Hello World, these words apple apple grape",
    )]);
    let runner = PipelineRunner::new(fetcher, RANDOM);

    let report = runner.run_iteration(&service);

    assert_eq!(report.reference, RANDOM);
    assert_eq!(report.url.as_deref(), Some(TARN));
    assert_eq!(report.distinct_words, 6);
    assert_eq!(report.outcome, IterationOutcome::Recorded { total_words: 7 });
    assert_eq!(report.to_string(), format!("{TARN}: 6 distinct words (7 total)"));

    assert_eq!(service.get_document(TARN).unwrap().unwrap().word_count, 7);
    assert_eq!(
        service.lookup_words(&["apple", "grape"]).unwrap(),
        vec![WordCount::new("apple", 2), WordCount::new("grape", 1)]
    );
}

#[test]
fn same_document_twice_is_counted_once() {
    let conn = open_db_in_memory().unwrap();
    let service = StatsService::for_connection(&conn).unwrap();
    let fetcher = SequenceFetcher::new(vec![document(TARN, "apple apple grape")]);
    let runner = PipelineRunner::new(fetcher, RANDOM);

    let first = runner.run_iteration(&service);
    let second = runner.run_iteration(&service);

    assert_eq!(first.distinct_words, 2);
    assert_eq!(second.outcome, IterationOutcome::Skipped);
    assert_eq!(second.distinct_words, 0);
    assert_eq!(second.url.as_deref(), Some(TARN));

    assert_eq!(service.document_totals().unwrap().documents, 1);
    assert_eq!(
        service.dictionary().unwrap(),
        vec![WordCount::new("apple", 2), WordCount::new("grape", 1)]
    );
}

#[test]
fn counts_accumulate_across_distinct_documents() {
    let conn = open_db_in_memory().unwrap();
    let service = StatsService::for_connection(&conn).unwrap();
    let fetcher = SequenceFetcher::new(vec![
        document("https://example.org/one", "apple apple"),
        document("https://example.org/two", "apple apple apple lemon"),
    ]);
    let runner = PipelineRunner::new(fetcher, RANDOM);

    runner.run_iteration(&service);
    runner.run_iteration(&service);

    assert_eq!(
        service.dictionary().unwrap(),
        vec![WordCount::new("apple", 5), WordCount::new("lemon", 1)]
    );
    assert_eq!(service.document_totals().unwrap().words, 6);
}

#[test]
fn fetch_failure_reports_status_and_touches_nothing() {
    let conn = open_db_in_memory().unwrap();
    let gateway = RecordingGateway::new(StatsService::for_connection(&conn).unwrap());
    let runner = PipelineRunner::new(FailingFetcher { status: 404 }, RANDOM);

    let report = runner.run_iteration(&gateway);

    assert!(report.is_failure());
    assert_eq!(report.url, None);
    assert_eq!(report.distinct_words, 0);
    assert!(matches!(
        report.outcome,
        IterationOutcome::FetchFailed {
            status: Some(404),
            ..
        }
    ));
    assert_eq!(
        report.to_string(),
        format!("request to {RANDOM} failed with status: 404")
    );
    assert!(gateway.calls().is_empty());
    assert_eq!(gateway.inner.document_totals().unwrap().documents, 0);
    assert!(gateway.inner.dictionary().unwrap().is_empty());
}

#[test]
fn already_recorded_document_issues_no_writes() {
    let conn = open_db_in_memory().unwrap();
    let service = StatsService::for_connection(&conn).unwrap();
    service.record_document(TARN, 9).unwrap();
    let gateway = RecordingGateway::new(service);
    let runner = PipelineRunner::new(
        SequenceFetcher::new(vec![document(TARN, "apple grape")]),
        RANDOM,
    );

    let report = runner.run_iteration(&gateway);

    assert_eq!(report.outcome, IterationOutcome::Skipped);
    assert_eq!(report.distinct_words, 0);
    assert_eq!(gateway.calls(), vec!["has_document"]);
    assert!(gateway.inner.dictionary().unwrap().is_empty());
    assert_eq!(gateway.inner.get_document(TARN).unwrap().unwrap().word_count, 9);
}

#[test]
fn page_without_words_still_records_the_document() {
    let conn = open_db_in_memory().unwrap();
    let gateway = RecordingGateway::new(StatsService::for_connection(&conn).unwrap());
    let runner = PipelineRunner::new(
        SequenceFetcher::new(vec![document(TARN, "A cat sat.")]),
        RANDOM,
    );

    let report = runner.run_iteration(&gateway);

    assert_eq!(report.outcome, IterationOutcome::Recorded { total_words: 0 });
    assert_eq!(report.distinct_words, 0);
    assert_eq!(
        gateway.calls(),
        vec!["has_document", "record_document", "upsert_word_counts"]
    );
    assert_eq!(gateway.inner.get_document(TARN).unwrap().unwrap().word_count, 0);
}

#[test]
fn failed_upsert_after_document_insert_is_reported_as_partial() {
    let conn = open_db_in_memory().unwrap();
    let mut gateway = RecordingGateway::new(StatsService::for_connection(&conn).unwrap());
    gateway.fail_upsert = true;
    let runner = PipelineRunner::new(
        SequenceFetcher::new(vec![document(TARN, "apple grape")]),
        RANDOM,
    );

    let report = runner.run_iteration(&gateway);

    assert!(report.is_failure());
    assert_eq!(report.distinct_words, 0);
    assert!(matches!(
        report.outcome,
        IterationOutcome::PersistFailed {
            step: PersistStep::WordUpsert,
            ..
        }
    ));
    assert!(gateway.inner.has_document(TARN).unwrap());
    assert!(gateway.inner.dictionary().unwrap().is_empty());
}

#[test]
fn cadence_runs_bounded_iterations_with_fresh_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cadence.db");
    let runner = PipelineRunner::new(
        SequenceFetcher::new(vec![
            document("https://example.org/one", "apple"),
            document("https://example.org/two", "grape"),
        ]),
        RANDOM,
    );
    let opened = Cell::new(0);
    let mut lines = Vec::new();

    let summary = run_cadence(
        &runner,
        Duration::ZERO,
        Some(3),
        || {
            opened.set(opened.get() + 1);
            open_db(&path)
        },
        |report| lines.push(report.to_string()),
    );

    assert_eq!(
        summary,
        CadenceSummary {
            iterations: 3,
            recorded: 2,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(opened.get(), 3);
    assert_eq!(lines.len(), 3);
    assert!(lines[2].contains("already scraped"));

    let conn = open_db(&path).unwrap();
    let service = StatsService::for_connection(&conn).unwrap();
    assert_eq!(
        service.dictionary().unwrap(),
        vec![WordCount::new("apple", 1), WordCount::new("grape", 1)]
    );
}

/// Counts fetches so tests can tell whether an iteration started at all.
struct CountingFetcher {
    fetched: Cell<u32>,
}

impl DocumentFetcher for CountingFetcher {
    fn fetch(&self, _reference: &str) -> FetchResult<FetchedDocument> {
        self.fetched.set(self.fetched.get() + 1);
        Ok(document(TARN, "apple"))
    }
}

#[test]
fn cadence_with_zero_iterations_runs_nothing() {
    let runner = PipelineRunner::new(
        CountingFetcher {
            fetched: Cell::new(0),
        },
        RANDOM,
    );
    let opened = Cell::new(0);
    let mut reports = 0;

    let summary = run_cadence(
        &runner,
        Duration::from_secs(3600),
        Some(0),
        || {
            opened.set(opened.get() + 1);
            open_db_in_memory()
        },
        |_| reports += 1,
    );

    assert_eq!(summary, CadenceSummary::default());
    assert_eq!(runner.fetcher().fetched.get(), 0);
    assert_eq!(opened.get(), 0);
    assert_eq!(reports, 0);
}

#[test]
fn cadence_single_iteration_does_not_sleep() {
    let runner = PipelineRunner::new(
        CountingFetcher {
            fetched: Cell::new(0),
        },
        RANDOM,
    );
    let started = std::time::Instant::now();

    let summary = run_cadence(
        &runner,
        Duration::from_secs(3600),
        Some(1),
        open_db_in_memory,
        |_| {},
    );

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.recorded, 1);
    assert_eq!(runner.fetcher().fetched.get(), 1);
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[test]
fn cadence_contains_store_failures_and_keeps_going() {
    let runner = PipelineRunner::new(
        SequenceFetcher::new(vec![document(TARN, "apple")]),
        RANDOM,
    );
    let mut outcomes = Vec::new();

    let summary = run_cadence(
        &runner,
        Duration::ZERO,
        Some(2),
        || {
            Err(DbError::UnsupportedSchemaVersion {
                db_version: 9,
                latest_supported: 2,
            })
        },
        |report| outcomes.push(report.outcome.clone()),
    );

    assert_eq!(summary.failed, 2);
    assert!(outcomes.iter().all(|outcome| matches!(
        outcome,
        IterationOutcome::PersistFailed {
            step: PersistStep::StoreOpen,
            ..
        }
    )));
}

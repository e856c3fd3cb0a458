//! Fixed-interval driver for pipeline iterations.
//!
//! Each iteration gets its own store connection, dropped before the pause,
//! so no connection is held across iterations or while sleeping.

use crate::db::DbResult;
use crate::fetch::DocumentFetcher;
use crate::pipeline::runner::{IterationOutcome, IterationReport, PipelineRunner};
use crate::service::stats_service::StatsService;
use log::error;
use rusqlite::Connection;
use std::time::Duration;

/// Tally of a finished cadence run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CadenceSummary {
    pub iterations: u64,
    pub recorded: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl CadenceSummary {
    fn count(&mut self, report: &IterationReport) {
        self.iterations += 1;
        match report.outcome {
            IterationOutcome::Recorded { .. } => self.recorded += 1,
            IterationOutcome::Skipped => self.skipped += 1,
            IterationOutcome::FetchFailed { .. } | IterationOutcome::PersistFailed { .. } => {
                self.failed += 1
            }
        }
    }
}

/// Runs iterations back to back with `interval` between them.
///
/// `iterations = None` runs until the process is stopped; `Some(0)` runs
/// nothing. The pause only separates iterations. `open_store` is
/// called once per iteration; `on_report` sees every report in order.
pub fn run_cadence<F, O, R>(
    runner: &PipelineRunner<F>,
    interval: Duration,
    iterations: Option<u64>,
    mut open_store: O,
    mut on_report: R,
) -> CadenceSummary
where
    F: DocumentFetcher,
    O: FnMut() -> DbResult<Connection>,
    R: FnMut(&IterationReport),
{
    let mut summary = CadenceSummary::default();

    loop {
        if iterations.is_some_and(|limit| summary.iterations >= limit) {
            return summary;
        }
        if summary.iterations > 0 {
            std::thread::sleep(interval);
        }

        let report = run_with_fresh_store(runner, &mut open_store);
        summary.count(&report);
        on_report(&report);
    }
}

fn run_with_fresh_store<F, O>(runner: &PipelineRunner<F>, open_store: &mut O) -> IterationReport
where
    F: DocumentFetcher,
    O: FnMut() -> DbResult<Connection>,
{
    let conn = match open_store() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=iteration module=pipeline status=error outcome=store_unavailable error={}",
                err
            );
            return IterationReport::store_unavailable(runner.reference(), err.to_string());
        }
    };

    let report = match StatsService::for_connection(&conn) {
        Ok(gateway) => runner.run_iteration(&gateway),
        Err(err) => {
            error!(
                "event=iteration module=pipeline status=error outcome=store_unavailable error={}",
                err
            );
            IterationReport::store_unavailable(runner.reference(), err.to_string())
        }
    };
    report
}

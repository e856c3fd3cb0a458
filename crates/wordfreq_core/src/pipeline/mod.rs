//! One scrape iteration and the loop that repeats it.
//!
//! # Invariants
//! - Iterations run strictly one after another.
//! - No failure escapes an iteration; every iteration ends in a report.

pub mod cadence;
pub mod runner;

pub use cadence::{run_cadence, CadenceSummary};
pub use runner::{IterationOutcome, IterationReport, PersistStep, PipelineRunner, Stage};

//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Expose the persistence protocol the pipeline depends on.
//! - Expose read-back use-cases for the CLI.

pub mod stats_service;

//! Document fetching.
//!
//! # Responsibility
//! - Resolve a reference (usually the random-article URL) to the page it
//!   lands on and that page's content.
//!
//! # Invariants
//! - `FetchedDocument::url` is the URL after every redirect, never the
//!   requested reference.
//! - Fetchers do not retry; the cadence loop owns retry-by-next-iteration.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod http;

pub use http::HttpDocumentFetcher;

pub type FetchResult<T> = Result<T, FetchError>;

/// Resolved page and its raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub url: String,
    pub content: String,
}

/// Transport-level failure while fetching a reference.
#[derive(Debug)]
pub enum FetchError {
    /// Server answered with a non-success status.
    Status { reference: String, status: u16 },
    /// Connection, redirect or timeout failure.
    Transport {
        reference: String,
        source: Box<dyn Error + Send + Sync>,
    },
    /// Response body could not be read.
    Body {
        reference: String,
        source: Box<dyn Error + Send + Sync>,
    },
    /// HTTP client could not be built.
    Client(Box<dyn Error + Send + Sync>),
}

impl FetchError {
    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "http_status",
            Self::Transport { .. } => "transport",
            Self::Body { .. } => "body_read",
            Self::Client(_) => "client_build",
        }
    }

    /// HTTP status when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { reference, status } => {
                write!(f, "request to {reference} failed with status: {status}")
            }
            Self::Transport { reference, source } => {
                write!(f, "request to {reference} failed: {source}")
            }
            Self::Body { reference, source } => {
                write!(f, "reading response from {reference} failed: {source}")
            }
            Self::Client(source) => write!(f, "failed to build http client: {source}"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Status { .. } => None,
            Self::Transport { source, .. } | Self::Body { source, .. } | Self::Client(source) => {
                Some(source.as_ref())
            }
        }
    }
}

/// Fetch collaborator used by the pipeline.
pub trait DocumentFetcher {
    fn fetch(&self, reference: &str) -> FetchResult<FetchedDocument>;
}

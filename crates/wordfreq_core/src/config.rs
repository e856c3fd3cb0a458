//! Scraper runtime settings.
//!
//! # Invariants
//! - `interval` and `fetch_timeout` are non-zero.
//! - `source_url` is an absolute http(s) URL.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://en.wikipedia.org/wiki/Special:Random";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one scraper process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Reference handed to the fetcher on every iteration.
    pub source_url: String,
    /// Pause between the end of one iteration and the start of the next.
    pub interval: Duration,
    /// Upper bound on a single fetch, redirects included.
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            interval: DEFAULT_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: format!("wordfreq/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScraperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.source_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidSourceUrl(self.source_url.clone()));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroDuration("interval"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("fetch_timeout"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSourceUrl(String),
    ZeroDuration(&'static str),
    EmptyUserAgent,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSourceUrl(url) => {
                write!(f, "source url must be an absolute http(s) url, got `{url}`")
            }
            Self::ZeroDuration(field) => write!(f, "`{field}` must be greater than zero"),
            Self::EmptyUserAgent => write!(f, "user agent cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

//! Blocking HTTP fetcher.

use crate::config::ScraperConfig;
use crate::fetch::{DocumentFetcher, FetchError, FetchResult, FetchedDocument};
use log::info;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Instant;

const MAX_REDIRECTS: usize = 10;

/// Fetches pages over HTTP(S), following redirects.
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    /// Builds a client with the configured timeout and user agent.
    pub fn new(config: &ScraperConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| FetchError::Client(Box::new(err)))?;
        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    fn fetch(&self, reference: &str) -> FetchResult<FetchedDocument> {
        let started_at = Instant::now();
        let response = self
            .client
            .get(reference)
            .send()
            .map_err(|err| FetchError::Transport {
                reference: reference.to_string(),
                source: Box::new(err),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                reference: reference.to_string(),
                status: status.as_u16(),
            });
        }

        let url = response.url().to_string();
        let content = response.text().map_err(|err| FetchError::Body {
            reference: reference.to_string(),
            source: Box::new(err),
        })?;

        info!(
            "event=fetch module=fetch status=ok reference={} url={} bytes={} duration_ms={}",
            reference,
            url,
            content.len(),
            started_at.elapsed().as_millis()
        );
        Ok(FetchedDocument { url, content })
    }
}

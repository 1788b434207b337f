// src/ingest/fetch.rs
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("epubs-cache/", env!("CARGO_PKG_VERSION"));

/// Source of raw page text for a category URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_raw(&self, url: &str) -> Result<String, FetchError>;
}

/// Single-attempt HTTP fetcher. Redirects follow reqwest's default policy.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_raw(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }
}

/// Serves canned page bodies keyed by URL. Used by tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch_raw(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::MissingFixture(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_fetcher_serves_registered_pages_only() {
        let f = FixtureFetcher::new().with_page("https://a.example/", "body-a");
        assert_eq!(f.fetch_raw("https://a.example/").await.unwrap(), "body-a");
        let err = f.fetch_raw("https://b.example/").await.unwrap_err();
        assert!(matches!(err, FetchError::MissingFixture(u) if u == "https://b.example/"));
    }
}

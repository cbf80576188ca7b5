//! HTTP [`Fetcher`] for the source page.
//!
//! Every request carries the configured timeout, so a stalled source fails
//! the query instead of blocking it indefinitely. Non-success statuses are
//! transport errors.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use notes_reporter_core::resolver::Fetcher;

use crate::config::SourceConfig;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(source: &SourceConfig) -> Result<Self> {
        let user_agent = source
            .user_agent
            .clone()
            .unwrap_or_else(|| concat!("notes-reporter/", env!("CARGO_PKG_VERSION")).to_string());
        let client = Client::builder()
            .timeout(source.timeout())
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("source page {} returned an error status", url))?;

        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body from {}", url))?;

        info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

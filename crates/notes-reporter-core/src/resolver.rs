//! Live-versus-stored reconciliation.
//!
//! Every call fetches the source page, extracts its entries, and merges them
//! into the [`Store`] before deciding where the answer comes from:
//!
//! | Requested `n` | Answer |
//! |---------------|--------|
//! | none | newest `default_limit` rows from the store |
//! | `n <= k` | first `n` freshly extracted entries, in page order |
//! | `n > k` | newest `n` rows from the store, with a warning |
//!
//! where `k` is the number of entries extracted by this call. Duplicates in
//! the extracted list are not collapsed before the policy runs.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Entry, RawEntry};
use crate::store::Store;

/// Rows returned when the caller does not ask for a specific count.
pub const DEFAULT_LIMIT: usize = 60;

/// Retrieves the raw bytes of the source page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Turns raw page content into entries, preserving page order.
pub trait Extractor: Send + Sync {
    fn extract(&self, page: &[u8]) -> Result<Vec<RawEntry>>;
}

/// Hard failure of a resolver call. No variant is retried.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("extraction failed: {0:#}")]
    Extract(anyhow::Error),
    #[error("store operation failed: {0:#}")]
    Store(anyhow::Error),
}

/// Where a [`Resolution`]'s entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Live,
    Store,
}

/// Requested more entries than the live page offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub requested: usize,
    pub available: usize,
}

/// Entries selected by [`Resolver::resolve`] plus how they were chosen.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub entries: Vec<Entry>,
    pub origin: Origin,
    pub shortfall: Option<Shortfall>,
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Address of the page to fetch on every call.
    pub source_url: String,
    /// Store window used when no count is requested.
    pub default_limit: usize,
}

impl ResolverSettings {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

pub struct Resolver {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn Store>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn Store>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            settings,
        }
    }

    /// Fetch, extract, validate, and upsert. Returns the extracted entries
    /// in page order.
    async fn refresh(&self) -> Result<Vec<Entry>, ResolveError> {
        let url = &self.settings.source_url;
        let page = self.fetcher.fetch(url).await.map_err(ResolveError::Fetch)?;

        let raw = self
            .extractor
            .extract(&page)
            .map_err(ResolveError::Extract)?;
        let extracted = raw
            .into_iter()
            .map(Entry::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ResolveError::Extract(e.into()))?;

        self.store
            .upsert(&extracted)
            .await
            .map_err(ResolveError::Store)?;
        debug!(url = %url, entries = extracted.len(), "merged live entries into store");

        Ok(extracted)
    }

    async fn query_store(&self, limit: usize, area: Option<&str>) -> Result<Vec<Entry>, ResolveError> {
        self.store
            .query_recent(limit, area)
            .await
            .map_err(ResolveError::Store)
    }

    /// Apply the count policy and report where the entries came from.
    pub async fn resolve(&self, n: Option<usize>) -> Result<Resolution, ResolveError> {
        let mut extracted = self.refresh().await?;
        let available = extracted.len();

        match n {
            None => Ok(Resolution {
                entries: self.query_store(self.settings.default_limit, None).await?,
                origin: Origin::Store,
                shortfall: None,
            }),
            Some(n) if n <= available => {
                extracted.truncate(n);
                Ok(Resolution {
                    entries: extracted,
                    origin: Origin::Live,
                    shortfall: None,
                })
            }
            Some(n) => {
                warn!(
                    "Asking to display {} results, but only {} results found on the page. \
                     Looking for more results in the database.",
                    n, available
                );
                Ok(Resolution {
                    entries: self.query_store(n, None).await?,
                    origin: Origin::Store,
                    shortfall: Some(Shortfall {
                        requested: n,
                        available,
                    }),
                })
            }
        }
    }

    /// Entries for a count request; see the module docs for the policy.
    pub async fn get_entries(&self, n: Option<usize>) -> Result<Vec<Entry>, ResolveError> {
        Ok(self.resolve(n).await?.entries)
    }

    /// Unbounded shape for area queries: refresh, then read the newest
    /// `default_limit` stored rows in `area`. The window is applied after the
    /// area filter, so rows outside the area never crowd out matches.
    pub async fn get_entries_in_area(&self, area: &str) -> Result<Vec<Entry>, ResolveError> {
        self.refresh().await?;
        self.query_store(self.settings.default_limit, Some(area))
            .await
    }
}

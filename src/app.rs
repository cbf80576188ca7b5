//! Wiring from [`Config`] to a ready [`Resolver`].

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use notes_reporter_core::resolver::Resolver;
use notes_reporter_core::store::Store;

use crate::config::Config;
use crate::extract::PreviewsExtractor;
use crate::fetch::HttpFetcher;
use crate::sqlite_store::SqliteStore;

/// Open the store, apply cold-start mode if configured, and assemble the
/// resolver with the HTTP fetcher and previews extractor.
pub async fn build_resolver(config: &Config) -> Result<Resolver> {
    let store = SqliteStore::open(config).await?;

    if config.store.reset_on_start {
        warn!(
            "store.reset_on_start is enabled: discarding all stored entries in {}",
            config.db.path.display()
        );
        store.reset().await?;
    }

    Ok(Resolver::new(
        Arc::new(HttpFetcher::new(&config.source)?),
        Arc::new(PreviewsExtractor),
        Arc::new(store),
        config.resolver_settings(),
    ))
}

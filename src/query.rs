//! One-shot CLI commands: `notes query`, `notes status`, `notes reset`.

use anyhow::Result;

use notes_reporter_core::report::{self, ReportQuery};
use notes_reporter_core::store::Store;

use crate::app;
use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Run one fetch/merge cycle and print the rendered report to stdout.
pub async fn run_query(config: &Config, limit: Option<usize>, area: Option<String>) -> Result<()> {
    let resolver = app::build_resolver(config).await?;
    let query = ReportQuery { area, limit };
    let entries = report::select(&resolver, &query).await?;
    print!("{}", report::render(&entries));
    Ok(())
}

pub async fn run_status(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let count = store.count().await?;
    println!("database: {}", config.db.path.display());
    println!("stored entries: {}", count);
    println!("source: {}", config.source.url);
    Ok(())
}

pub async fn run_reset(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    store.reset().await?;
    println!("Stored entries discarded.");
    Ok(())
}

//! Storage abstraction for Notes Reporter.
//!
//! The [`Store`] trait is the durable side of the resolver: a table keyed by
//! identifier with last-write-wins upserts and a bounded recency query.
//! Implementations must be `Send + Sync` to be shared across request tasks.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Entry;

/// Durable keyed table of entries.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`reset`](Store::reset) | Drop and recreate the table |
/// | [`upsert`](Store::upsert) | Insert or replace a batch by identifier |
/// | [`query_recent`](Store::query_recent) | Newest rows first, optionally by area code |
/// | [`count`](Store::count) | Number of stored rows |
#[async_trait]
pub trait Store: Send + Sync {
    /// Discard all stored entries and recreate an empty table.
    async fn reset(&self) -> Result<()>;

    /// Insert or replace every entry by identifier, stamping each row with
    /// the time of the write.
    ///
    /// The batch is atomic: either every entry is written or none is. When
    /// the batch repeats an identifier, the later occurrence wins.
    async fn upsert(&self, entries: &[Entry]) -> Result<()>;

    /// Return up to `limit` entries ordered by `recorded_at` descending.
    ///
    /// Rows written by the same batch share a timestamp and come back in the
    /// order they were written. When `area` is given, only identifiers whose
    /// area code equals it are considered, and `limit` applies after that
    /// filter.
    async fn query_recent(&self, limit: usize, area: Option<&str>) -> Result<Vec<Entry>>;

    /// Number of stored entries.
    async fn count(&self) -> Result<u64>;
}

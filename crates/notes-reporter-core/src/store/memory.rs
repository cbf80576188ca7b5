//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Rows live in a `Vec` behind `std::sync::RwLock`. Each write gets a
//! monotonically increasing sequence number that plays the role of SQLite's
//! rowid when breaking timestamp ties.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::Entry;

use super::Store;

struct StoredRow {
    entry: Entry,
    seq: u64,
}

#[derive(Default)]
struct Table {
    rows: Vec<StoredRow>,
    next_seq: u64,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    table: RwLock<Table>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }

    /// Snapshot of a single row, for assertions.
    pub fn get(&self, identifier: &str) -> Option<Entry> {
        let table = self.table.read().ok()?;
        table
            .rows
            .iter()
            .find(|r| r.entry.identifier == identifier)
            .map(|r| r.entry.clone())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn reset(&self) -> Result<()> {
        let mut table = self.table.write().map_err(poisoned)?;
        *table = Table::default();
        Ok(())
    }

    async fn upsert(&self, entries: &[Entry]) -> Result<()> {
        let now = Utc::now();
        let mut table = self.table.write().map_err(poisoned)?;
        for entry in entries {
            table.rows.retain(|r| r.entry.identifier != entry.identifier);
            let seq = table.next_seq;
            table.next_seq += 1;
            let mut stored = entry.clone();
            stored.recorded_at = Some(now);
            table.rows.push(StoredRow { entry: stored, seq });
        }
        Ok(())
    }

    async fn query_recent(&self, limit: usize, area: Option<&str>) -> Result<Vec<Entry>> {
        let table = self.table.read().map_err(poisoned)?;
        let mut rows: Vec<&StoredRow> = table
            .rows
            .iter()
            .filter(|r| area.map_or(true, |a| r.entry.in_area(a)))
            .collect();
        rows.sort_by(|a, b| {
            b.entry
                .recorded_at
                .cmp(&a.entry.recorded_at)
                .then(a.seq.cmp(&b.seq))
        });
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|r| r.entry.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.len() as u64)
    }
}

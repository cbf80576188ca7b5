//! SQLite-backed [`Store`] implementation.
//!
//! One row per identifier in the `numbers` table. Upserts use
//! `INSERT OR REPLACE`, which deletes and reinserts a conflicting row, so a
//! rewritten row takes a fresh rowid. The recency query orders by
//! `recorded_at DESC, rowid ASC`: newest batch first, write order within a
//! batch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use notes_reporter_core::models::{Entry, AREA_CODE_LEN};
use notes_reporter_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::migrate;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the table exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

/// Fixed-width RFC 3339 with microseconds, so text order is time order.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("bad recorded_at timestamp: {}", s))?
        .with_timezone(&Utc))
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<Entry> {
    let identifier: String = row.try_get("identifier")?;
    let metric: i64 = row.try_get("metric")?;
    let recorded_at: String = row.try_get("recorded_at")?;
    Ok(Entry {
        metric: u64::try_from(metric)
            .with_context(|| format!("negative metric stored for {}", identifier))?,
        note: row.try_get("note")?,
        recorded_at: Some(parse_ts(&recorded_at)?),
        identifier,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn reset(&self) -> Result<()> {
        migrate::recreate_schema(&self.pool).await
    }

    async fn upsert(&self, entries: &[Entry]) -> Result<()> {
        let recorded_at = format_ts(Utc::now());
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            let metric = i64::try_from(entry.metric)
                .with_context(|| format!("report count out of range for {}", entry.identifier))?;
            sqlx::query(
                "INSERT OR REPLACE INTO numbers (identifier, metric, note, recorded_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&entry.identifier)
            .bind(metric)
            .bind(&entry.note)
            .bind(&recorded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query_recent(&self, limit: usize, area: Option<&str>) -> Result<Vec<Entry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        if area.is_some_and(|a| a.chars().count() != AREA_CODE_LEN) {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.acquire().await?;
        let rows = match area {
            Some(area) => {
                sqlx::query(
                    r#"
                    SELECT identifier, metric, note, recorded_at
                    FROM numbers
                    WHERE substr(identifier, 1, 3) = ?
                    ORDER BY recorded_at DESC, rowid ASC
                    LIMIT ?
                    "#,
                )
                .bind(area)
                .bind(limit)
                .fetch_all(&mut *conn)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT identifier, metric, note, recorded_at
                    FROM numbers
                    ORDER BY recorded_at DESC, rowid ASC
                    LIMIT ?
                    "#,
                )
                .bind(limit)
                .fetch_all(&mut *conn)
                .await?
            }
        };

        rows.iter().map(row_to_entry).collect()
    }

    async fn count(&self) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM numbers")
            .fetch_one(&mut *conn)
            .await?;
        Ok(n as u64)
    }
}

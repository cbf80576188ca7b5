use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const CREATE_NUMBERS: &str = r#"
    CREATE TABLE IF NOT EXISTS numbers (
        identifier TEXT PRIMARY KEY NOT NULL,
        metric INTEGER NOT NULL,
        note TEXT NOT NULL,
        recorded_at TEXT NOT NULL
    )
"#;

const CREATE_RECORDED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_numbers_recorded_at ON numbers(recorded_at DESC)";

/// Create the `numbers` table and its index if missing. Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query(CREATE_NUMBERS).execute(&mut *tx).await?;
    sqlx::query(CREATE_RECORDED_AT_INDEX)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Drop and recreate the `numbers` table, discarding every stored entry.
pub async fn recreate_schema(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DROP TABLE IF EXISTS numbers")
        .execute(&mut *tx)
        .await?;
    sqlx::query(CREATE_NUMBERS).execute(&mut *tx).await?;
    sqlx::query(CREATE_RECORDED_AT_INDEX)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

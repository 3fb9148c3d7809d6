//! SqliteHistoryStore
//! ------------------
//! SQLite-backed implementation of `HistoryStore`. It keeps the extremum
//! tracker's state durable so that:
//!
//!  - rolling windows survive restarts without a fresh warm-up
//!  - an extreme that was already announced is not announced again
//!
//! Every write runs inside a transaction; a crash mid-write leaves either the
//! old or the new row set, never a partial one.
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::HistoryStore;
use crate::types::Sample;

pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Wraps an existing pool. Call [`migrate`](Self::migrate) before use.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and ensures the
    /// schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                asset_a_price REAL NOT NULL,
                asset_b_price REAL NOT NULL,
                ratio REAL NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_price_history_ts ON price_history(timestamp);"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS last_alerted (
                period_kind_key TEXT PRIMARY KEY,
                value REAL NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn load_history(&self, since_ms: i64) -> anyhow::Result<Vec<Sample>> {
        let rows = sqlx::query(
            r#"
            SELECT timestamp, asset_a_price, asset_b_price, ratio
            FROM price_history
            WHERE timestamp >= ?
            ORDER BY timestamp ASC, id ASC
        "#,
        )
        .bind(since_ms)
        .fetch_all(&self.pool)
        .await?;

        let mut samples = Vec::with_capacity(rows.len());
        for row in rows {
            samples.push(Sample {
                ts_ms: row.try_get("timestamp")?,
                asset_a_price: row.try_get("asset_a_price")?,
                asset_b_price: row.try_get("asset_b_price")?,
                ratio: row.try_get("ratio")?,
            });
        }

        Ok(samples)
    }

    /// Insert + bounded delete of expired rows, as one unit.
    async fn append(&self, sample: &Sample, evict_before_ms: i64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO price_history (timestamp, asset_a_price, asset_b_price, ratio)
            VALUES (?, ?, ?, ?)
        "#,
        )
        .bind(sample.ts_ms)
        .bind(sample.asset_a_price)
        .bind(sample.asset_b_price)
        .bind(sample.ratio)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM price_history WHERE timestamp < ?")
            .bind(evict_before_ms)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load_last_alerted(&self) -> anyhow::Result<Vec<(String, f64)>> {
        let rows = sqlx::query("SELECT period_kind_key, value FROM last_alerted")
            .fetch_all(&self.pool)
            .await?;

        let mut out: Vec<(String, f64)> = Vec::with_capacity(rows.len());
        for row in rows {
            out.push((row.try_get("period_kind_key")?, row.try_get("value")?));
        }

        Ok(out)
    }

    async fn save_last_alerted(&self, key: &str, value: f64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO last_alerted (period_kind_key, value)
            VALUES (?, ?)
            ON CONFLICT(period_kind_key) DO UPDATE SET
                value = excluded.value;
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

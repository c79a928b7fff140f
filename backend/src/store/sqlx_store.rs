use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{AnyPool, Row};

use engine::{LogRow, TIMESTAMP_FORMAT};

use crate::db::Db;
use crate::store::LogStore;

/// SQLx-backed data log.
/// Responsible only for persistence and row mapping.
pub struct SqlxLogStore {
    pool: AnyPool,
}

impl SqlxLogStore {
    /// Connects and ensures the schema exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = Db::connect(database_url)
            .await
            .context("failed to connect to data log database")?;
        db.migrate().await.context("failed to migrate data log schema")?;

        Ok(Self { pool: db.pool })
    }

    /// Wraps an existing pool. The schema must already be migrated.
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogStore for SqlxLogStore {
    async fn last_row(&self) -> anyhow::Result<Option<LogRow>> {
        let row = sqlx::query(
            r#"
SELECT
  timestamp,
  total_add_to_cart, total_ordered_units,
  new_add_to_cart, new_ordered_units
FROM data_log
ORDER BY id DESC
LIMIT 1;
"#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_log_row(&r)?)),
            None => Ok(None),
        }
    }

    async fn append(&self, row: &LogRow) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO data_log (
  timestamp,
  total_add_to_cart, total_ordered_units,
  new_add_to_cart, new_ordered_units
) VALUES (?, ?, ?, ?, ?);
"#,
        )
        .bind(row.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .bind(u64_to_i64(row.total_add_to_cart)?)
        .bind(u64_to_i64(row.total_ordered_units)?)
        .bind(u64_to_i64(row.new_add_to_cart)?)
        .bind(u64_to_i64(row.new_ordered_units)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/* =========================
Row mapping + conversions
========================= */

fn row_to_log_row(r: &sqlx::any::AnyRow) -> anyhow::Result<LogRow> {
    let ts: String = r.try_get("timestamp")?;
    let timestamp = NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid timestamp {ts:?}"))?;

    Ok(LogRow {
        timestamp,
        total_add_to_cart: i64_to_u64(r.try_get("total_add_to_cart")?)?,
        total_ordered_units: i64_to_u64(r.try_get("total_ordered_units")?)?,
        new_add_to_cart: i64_to_u64(r.try_get("new_add_to_cart")?)?,
        new_ordered_units: i64_to_u64(r.try_get("new_ordered_units")?)?,
    })
}

fn u64_to_i64(v: u64) -> anyhow::Result<i64> {
    i64::try_from(v).map_err(|_| anyhow!("count overflows i64: {v}"))
}

fn i64_to_u64(v: i64) -> anyhow::Result<u64> {
    u64::try_from(v).map_err(|_| anyhow!("negative count in data log: {v}"))
}

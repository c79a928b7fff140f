pub mod csv_store;
pub mod sqlx_store;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use engine::LogRow;

use crate::config::AppConfig;

pub use csv_store::CsvLogStore;
pub use sqlx_store::SqlxLogStore;

/// Append-only data log. The only state carried between cycles.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Most recently appended row, if any.
    async fn last_row(&self) -> Result<Option<LogRow>>;

    async fn append(&self, row: &LogRow) -> Result<()>;
}

/// SQLite when `DATABASE_URL` is set, the CSV file otherwise.
pub async fn open_store(cfg: &AppConfig) -> Result<Arc<dyn LogStore>> {
    match &cfg.database_url {
        Some(url) => {
            info!("using sqlite data log");
            Ok(Arc::new(SqlxLogStore::connect(url).await?))
        }
        None => {
            info!(path = %cfg.data_log_path.display(), "using csv data log");
            Ok(Arc::new(CsvLogStore::open(&cfg.data_log_path)?))
        }
    }
}

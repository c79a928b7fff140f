pub mod client;
pub mod errors;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::OzonClient;
pub use errors::AnalyticsError;
pub use types::*;

/// Per-day cart-add and order totals with a per-SKU breakdown.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_day(&self, date: NaiveDate) -> Result<AnalyticsData, AnalyticsError>;
}

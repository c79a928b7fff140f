use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use engine::{EngineError, ItemMetric, MetricsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    #[serde(rename = "hits_tocart")]
    HitsToCart,
    #[serde(rename = "ordered_units")]
    OrderedUnits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    #[serde(rename = "sku")]
    Sku,
}

/// Body of `POST /v1/analytics/data`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsRequest {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Order here fixes the order of `totals` and of each row's `metrics`.
    pub metrics: Vec<Metric>,
    pub dimension: Vec<Dimension>,
    pub filters: Vec<serde_json::Value>,
    pub limit: u32,
}

impl AnalyticsRequest {
    /// Cart-adds and ordered units per SKU for a single day.
    pub fn for_day(date: NaiveDate, limit: u32) -> Self {
        Self {
            date_from: date,
            date_to: date,
            metrics: vec![Metric::HitsToCart, Metric::OrderedUnits],
            dimension: vec![Dimension::Sku],
            filters: Vec::new(),
            limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsEnvelope {
    pub result: AnalyticsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsData {
    pub data: Vec<AnalyticsRow>,
    pub totals: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsRow {
    pub dimensions: Vec<DimensionValue>,
    pub metrics: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DimensionValue {
    pub id: String,
    pub name: String,
}

impl AnalyticsData {
    /// Converts the raw report into engine inputs, failing on the first missing field.
    pub fn into_domain(
        self,
        timestamp: NaiveDateTime,
    ) -> Result<(MetricsSnapshot, Vec<ItemMetric>), EngineError> {
        let snapshot = MetricsSnapshot::from_totals(timestamp, &self.totals)?;

        let items = self
            .data
            .into_iter()
            .enumerate()
            .map(|(row, r)| {
                let dim = r
                    .dimensions
                    .into_iter()
                    .next()
                    .ok_or(EngineError::MissingDimension { row })?;
                ItemMetric::from_metrics(row, dim.id, dim.name, &r.metrics)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((snapshot, items))
    }
}

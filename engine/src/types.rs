use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Wall-clock format used in messages and in the data log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Totals from a single analytics poll.
///
/// Both counters are cumulative for the queried day, as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub timestamp: NaiveDateTime,
    pub total_add_to_cart: u64,
    pub total_ordered_units: u64,
}

impl MetricsSnapshot {
    /// Builds a snapshot from the upstream `totals` array,
    /// ordered as `[hits_tocart, ordered_units]`.
    pub fn from_totals(timestamp: NaiveDateTime, totals: &[f64]) -> Result<Self, EngineError> {
        let cart = totals
            .first()
            .copied()
            .ok_or(EngineError::MissingTotal { index: 0 })?;
        let ordered = totals
            .get(1)
            .copied()
            .ok_or(EngineError::MissingTotal { index: 1 })?;

        Ok(Self {
            timestamp,
            total_add_to_cart: parse_count("totals[0]", cart)?,
            total_ordered_units: parse_count("totals[1]", ordered)?,
        })
    }
}

/// Per-SKU activity for the queried day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMetric {
    pub sku_id: String,
    pub sku_name: String,
    pub hits_to_cart: u64,
    pub ordered_units: u64,
}

impl ItemMetric {
    /// Builds an item from one upstream row. `row` is only used for error context.
    pub fn from_metrics(
        row: usize,
        sku_id: String,
        sku_name: String,
        metrics: &[f64],
    ) -> Result<Self, EngineError> {
        let hits = metrics
            .first()
            .copied()
            .ok_or(EngineError::MissingMetric { row, index: 0 })?;
        let ordered = metrics
            .get(1)
            .copied()
            .ok_or(EngineError::MissingMetric { row, index: 1 })?;

        Ok(Self {
            sku_id,
            sku_name,
            hits_to_cart: parse_count(&format!("data[{row}].metrics[0]"), hits)?,
            ordered_units: parse_count(&format!("data[{row}].metrics[1]"), ordered)?,
        })
    }

    pub fn has_activity(&self) -> bool {
        self.hits_to_cart > 0 || self.ordered_units > 0
    }
}

/// Activity since the previous cycle. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaResult {
    pub new_add_to_cart: u64,
    pub new_ordered_units: u64,
}

/// One line of the append-only data log.
///
/// Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub total_add_to_cart: u64,
    pub total_ordered_units: u64,
    pub new_add_to_cart: u64,
    pub new_ordered_units: u64,
}

impl LogRow {
    pub fn new(snapshot: &MetricsSnapshot, delta: DeltaResult) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            total_add_to_cart: snapshot.total_add_to_cart,
            total_ordered_units: snapshot.total_ordered_units,
            new_add_to_cart: delta.new_add_to_cart,
            new_ordered_units: delta.new_ordered_units,
        }
    }
}

/// Accepts a JSON-style number as a count.
///
/// Upstream renders counts as numbers that may carry a fractional part
/// (`12.0`); anything negative, fractional or non-finite is rejected.
pub fn parse_count(field: &str, value: f64) -> Result<u64, EngineError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(EngineError::InvalidCount {
            field: field.to_string(),
            value,
        });
    }
    Ok(value as u64)
}

pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 11)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn snapshot_from_totals_accepts_float_rendered_integers() {
        let snap = MetricsSnapshot::from_totals(ts(), &[150.0, 20.0]).unwrap();
        assert_eq!(snap.total_add_to_cart, 150);
        assert_eq!(snap.total_ordered_units, 20);
    }

    #[test]
    fn snapshot_from_totals_fails_on_missing_ordered_units() {
        let err = MetricsSnapshot::from_totals(ts(), &[150.0]).unwrap_err();
        assert_eq!(err, EngineError::MissingTotal { index: 1 });
    }

    #[test]
    fn snapshot_from_totals_fails_on_empty_totals() {
        let err = MetricsSnapshot::from_totals(ts(), &[]).unwrap_err();
        assert_eq!(err, EngineError::MissingTotal { index: 0 });
    }

    #[test]
    fn parse_count_rejects_negative_fractional_and_nan() {
        assert!(parse_count("x", -1.0).is_err());
        assert!(parse_count("x", 2.5).is_err());
        assert!(parse_count("x", f64::NAN).is_err());
        assert!(parse_count("x", f64::INFINITY).is_err());
        assert_eq!(parse_count("x", 0.0).unwrap(), 0);
    }

    #[test]
    fn item_error_names_the_offending_row() {
        let err = ItemMetric::from_metrics(3, "1".into(), "a".into(), &[1.0, -4.0]).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidCount {
                field: "data[3].metrics[1]".into(),
                value: -4.0
            }
        );

        let err = ItemMetric::from_metrics(2, "1".into(), "a".into(), &[1.0]).unwrap_err();
        assert_eq!(err, EngineError::MissingMetric { row: 2, index: 1 });
    }

    #[test]
    fn has_activity_requires_a_nonzero_field() {
        let mut item = ItemMetric::from_metrics(0, "1".into(), "a".into(), &[0.0, 0.0]).unwrap();
        assert!(!item.has_activity());
        item.ordered_units = 1;
        assert!(item.has_activity());
        item.ordered_units = 0;
        item.hits_to_cart = 1;
        assert!(item.has_activity());
    }
}

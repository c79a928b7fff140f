use crate::conversion::{conversion_rate, meets_threshold};
use crate::delta::compute_delta;
use crate::report::{ItemReport, MessageParts, render_message};
use crate::types::{DeltaResult, ItemMetric, LogRow, MetricsSnapshot};

/// Everything one cycle hands to the engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    pub snapshot: &'a MetricsSnapshot,
    pub items: &'a [ItemMetric],
    /// Most recent persisted row; `None` on first run.
    pub previous: Option<&'a LogRow>,
    /// Minimum acceptable conversion rate, in percent.
    pub threshold_pct: u32,
}

/// Result of evaluating one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub delta: DeltaResult,
    pub hour_rate: f64,
    pub day_rate: f64,
    /// Day-level rate fell below the threshold.
    pub alert: bool,
    /// Items with activity, in source order.
    pub items: Vec<ItemReport>,
    pub message: String,
    pub log_row: LogRow,
}

pub fn evaluate(input: EngineInput<'_>) -> Evaluation {
    let snapshot = input.snapshot;
    let delta = compute_delta(input.previous, snapshot);

    let hour_rate = conversion_rate(delta.new_ordered_units, delta.new_add_to_cart);
    let day_rate = conversion_rate(snapshot.total_ordered_units, snapshot.total_add_to_cart);

    let alert = !meets_threshold(
        snapshot.total_ordered_units,
        snapshot.total_add_to_cart,
        input.threshold_pct,
    );

    let items: Vec<ItemReport> = input
        .items
        .iter()
        .filter_map(|item| ItemReport::from_item(item, input.threshold_pct))
        .collect();

    let message = render_message(&MessageParts {
        snapshot,
        delta,
        hour_rate,
        day_rate,
        alert,
        threshold_pct: input.threshold_pct,
        items: &items,
    });

    Evaluation {
        delta,
        hour_rate,
        day_rate,
        alert,
        items,
        message,
        log_row: LogRow::new(snapshot, delta),
    }
}

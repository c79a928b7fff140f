use crate::types::{DeltaResult, LogRow, MetricsSnapshot};

/// Activity since the immediately preceding cycle.
///
/// - No previous row (cold start) → zero delta.
/// - A counter that went down upstream is treated as no new activity.
pub fn compute_delta(previous: Option<&LogRow>, current: &MetricsSnapshot) -> DeltaResult {
    let Some(prev) = previous else {
        return DeltaResult::default();
    };

    DeltaResult {
        new_add_to_cart: current
            .total_add_to_cart
            .saturating_sub(prev.total_add_to_cart),
        new_ordered_units: current
            .total_ordered_units
            .saturating_sub(prev.total_ordered_units),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 11)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn mk_snapshot(cart: u64, ordered: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: ts(),
            total_add_to_cart: cart,
            total_ordered_units: ordered,
        }
    }

    fn mk_row(cart: u64, ordered: u64) -> LogRow {
        LogRow {
            timestamp: ts(),
            total_add_to_cart: cart,
            total_ordered_units: ordered,
            new_add_to_cart: 0,
            new_ordered_units: 0,
        }
    }

    #[test]
    fn cold_start_yields_zero_delta() {
        let delta = compute_delta(None, &mk_snapshot(1_000, 250));
        assert_eq!(delta, DeltaResult::default());
    }

    #[test]
    fn delta_is_difference_of_totals() {
        let delta = compute_delta(Some(&mk_row(100, 5)), &mk_snapshot(150, 20));
        assert_eq!(delta.new_add_to_cart, 50);
        assert_eq!(delta.new_ordered_units, 15);
    }

    #[test]
    fn counters_are_floored_independently() {
        // cart-adds corrected downward upstream, orders still growing
        let delta = compute_delta(Some(&mk_row(200, 5)), &mk_snapshot(150, 9));
        assert_eq!(delta.new_add_to_cart, 0);
        assert_eq!(delta.new_ordered_units, 4);
    }

    #[test]
    fn only_the_given_previous_row_is_used() {
        let older = mk_row(10, 1);
        let latest = mk_row(140, 18);
        let current = mk_snapshot(150, 20);

        assert_eq!(
            compute_delta(Some(&latest), &current),
            DeltaResult {
                new_add_to_cart: 10,
                new_ordered_units: 2
            }
        );
        assert_ne!(
            compute_delta(Some(&older), &current),
            compute_delta(Some(&latest), &current)
        );
    }
}

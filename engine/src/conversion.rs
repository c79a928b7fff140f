/// Ordered units per cart-add, in percent.
///
/// A zero denominator is a defined zero rate, not an error.
pub fn conversion_rate(ordered: u64, added: u64) -> f64 {
    if added == 0 {
        return 0.0;
    }
    (ordered as f64 / added as f64) * 100.0
}

/// `conversion_rate(ordered, added) >= threshold`, evaluated exactly.
///
/// Compared in integers so a rate sitting on the threshold is never pushed
/// below it by float rounding (57/100*100 = 56.99999999999999 in f64).
pub fn meets_threshold(ordered: u64, added: u64, threshold_pct: u32) -> bool {
    if added == 0 {
        return threshold_pct == 0;
    }
    u128::from(ordered) * 100 >= u128::from(threshold_pct) * u128::from(added)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdStatus {
    /// Rate is at or above the threshold.
    Meets,
    Below,
}

impl ThresholdStatus {
    pub fn classify(ordered: u64, added: u64, threshold_pct: u32) -> Self {
        if meets_threshold(ordered, added, threshold_pct) {
            Self::Meets
        } else {
            Self::Below
        }
    }
}

use thiserror::Error;

use engine::EngineError;

use crate::analytics::AnalyticsError;

/// Why a cycle stopped early. Delivery failures are not here: they are
/// reported per recipient and never abort a cycle.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("analytics request failed: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("malformed analytics payload: {0}")]
    Malformed(#[from] EngineError),

    #[error("failed to read data log: {0:#}")]
    StoreRead(anyhow::Error),

    #[error("failed to append to data log: {0:#}")]
    StoreWrite(anyhow::Error),
}

impl CycleError {
    /// Whether the cycle stopped before any notification went out.
    pub fn before_delivery(&self) -> bool {
        !matches!(self, CycleError::StoreWrite(_))
    }
}

use thiserror::Error;

/// Raised when analytics input does not carry the fields the engine needs.
///
/// The engine never substitutes defaults for these: a wrong report is worse
/// than a skipped one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("totals array has no value at index {index}")]
    MissingTotal { index: usize },

    #[error("row {row} has no dimension")]
    MissingDimension { row: usize },

    #[error("row {row} has no metric at index {index}")]
    MissingMetric { row: usize, index: usize },

    #[error("{field} is not a non-negative integer count: {value}")]
    InvalidCount { field: String, value: f64 },
}

//! Conversion engine.
//!
//! Pure computation over one analytics poll:
//! totals + last persisted row + threshold → delta, rates, message, next row.
//! Nothing in this crate performs I/O.

pub mod conversion;
pub mod delta;
pub mod error;
pub mod evaluate;
pub mod report;
pub mod types;

pub use conversion::{ThresholdStatus, conversion_rate, meets_threshold};
pub use delta::compute_delta;
pub use error::EngineError;
pub use evaluate::{EngineInput, Evaluation, evaluate};
pub use report::ItemReport;
pub use types::*;

pub mod poller;
pub mod runner;

pub use poller::run_poller;
pub use runner::{CycleOutcome, CycleRunner, run_cycle};

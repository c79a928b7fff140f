//! Fixed-delay poll loop.
//!
//! One cycle runs to completion, then the loop sleeps for the poll interval.
//! The shutdown signal only interrupts the sleep; a cycle in flight always
//! finishes first.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::broadcast;
use tracing::info;

use crate::cycle::runner::{CycleRunner, run_cycle};

/// Polls until `shutdown` fires. Returns the number of cycles started.
pub async fn run_poller(
    runner: Arc<CycleRunner>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> u64 {
    info!(every_secs = interval.as_secs(), "poller started");

    let mut cycles = 0u64;
    loop {
        cycles += 1;
        if let Some(outcome) = run_cycle(&runner, Local::now().naive_local()).await {
            info!(
                cycle = cycles,
                alert = outcome.alert,
                delivered = outcome.delivery.delivered(),
                "cycle finished"
            );
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.recv() => {
                info!(cycles, "shutdown requested; poller stopping");
                break;
            }
        }
    }

    cycles
}

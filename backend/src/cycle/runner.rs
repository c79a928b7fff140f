use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{Instrument, debug, error, info, warn};

use engine::{EngineInput, LogRow, evaluate};

use crate::analytics::AnalyticsSource;
use crate::error::CycleError;
use crate::logger::{TraceId, annotate_cycle, cycle_span, warn_if_slow};
use crate::notify::fanout::{DeliveryReport, deliver_all};
use crate::notify::{NotificationSink, RecipientId};
use crate::store::LogStore;

const SLOW_FETCH: Duration = Duration::from_secs(5);

/// What a completed cycle did.
#[derive(Debug)]
pub struct CycleOutcome {
    pub log_row: LogRow,
    pub alert: bool,
    pub delivery: DeliveryReport,
}

/// Everything one cycle needs; collaborators are injected so tests can
/// swap any of them.
pub struct CycleRunner {
    source: Arc<dyn AnalyticsSource>,
    sink: Arc<dyn NotificationSink>,
    store: Arc<dyn LogStore>,
    recipients: Vec<RecipientId>,
    threshold_pct: u32,
}

impl CycleRunner {
    pub fn new(
        source: Arc<dyn AnalyticsSource>,
        sink: Arc<dyn NotificationSink>,
        store: Arc<dyn LogStore>,
        recipients: Vec<RecipientId>,
        threshold_pct: u32,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            recipients,
            threshold_pct,
        }
    }

    /// Runs fetch, evaluate, deliver and append for the day containing `now`.
    ///
    /// Nothing is sent and nothing is written unless the fetch and the
    /// payload conversion both succeed. The row is appended once, after every
    /// delivery attempt has finished, whatever the delivery outcome.
    pub async fn run_once(&self, now: NaiveDateTime) -> Result<CycleOutcome, CycleError> {
        let date = now.date();
        annotate_cycle(&date);

        let data = warn_if_slow("analytics_fetch", SLOW_FETCH, self.source.fetch_day(date)).await?;
        let (snapshot, items) = data.into_domain(now)?;

        debug!(
            total_add_to_cart = snapshot.total_add_to_cart,
            total_ordered_units = snapshot.total_ordered_units,
            items = items.len(),
            "analytics fetched"
        );

        let previous = self.store.last_row().await.map_err(CycleError::StoreRead)?;

        let eval = evaluate(EngineInput {
            snapshot: &snapshot,
            items: &items,
            previous: previous.as_ref(),
            threshold_pct: self.threshold_pct,
        });

        if eval.alert {
            warn!(
                day_rate = eval.day_rate,
                threshold_pct = self.threshold_pct,
                "day conversion below threshold"
            );
        }

        let delivery = deliver_all(Arc::clone(&self.sink), &self.recipients, &eval.message).await;

        self.store
            .append(&eval.log_row)
            .await
            .map_err(CycleError::StoreWrite)?;

        info!(
            new_add_to_cart = eval.delta.new_add_to_cart,
            new_ordered_units = eval.delta.new_ordered_units,
            hour_rate = eval.hour_rate,
            day_rate = eval.day_rate,
            delivered = delivery.delivered(),
            failed = delivery.failed(),
            "cycle complete"
        );

        Ok(CycleOutcome {
            log_row: eval.log_row,
            alert: eval.alert,
            delivery,
        })
    }
}

/// Runs one cycle in its own task under a fresh trace span.
///
/// Errors and panics are logged here and turned into `None`; the caller
/// carries on with the next cycle either way.
pub async fn run_cycle(runner: &Arc<CycleRunner>, now: NaiveDateTime) -> Option<CycleOutcome> {
    let trace_id = TraceId::new();
    let span = cycle_span(&trace_id);

    let task = {
        let runner = Arc::clone(runner);
        tokio::spawn(async move { runner.run_once(now).await }.instrument(span.clone()))
    };

    match task.await {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(e)) => {
            let _enter = span.enter();
            if e.before_delivery() {
                error!(error = %e, "cycle aborted; nothing sent or written");
            } else {
                error!(error = %e, "cycle delivered but the data log was not updated");
            }
            None
        }
        Err(join) => {
            let _enter = span.enter();
            error!(
                severity = "critical",
                panicked = join.is_panic(),
                error = %join,
                "cycle task died unexpectedly"
            );
            None
        }
    }
}

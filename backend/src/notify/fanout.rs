//! Per-cycle notification fan-out.
//!
//! Every recipient gets its own task; one failing (or panicking) delivery
//! never blocks or aborts the rest. Results are collected into a report in
//! recipient order.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{Instrument, error, info};

use crate::notify::errors::NotifyError;
use crate::notify::{NotificationSink, RecipientId};

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub recipient: RecipientId,
    pub result: Result<(), NotifyError>,
}

#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

pub async fn deliver_all(
    sink: Arc<dyn NotificationSink>,
    recipients: &[RecipientId],
    text: &str,
) -> DeliveryReport {
    let text: Arc<str> = Arc::from(text);

    let handles: Vec<_> = recipients
        .iter()
        .map(|&recipient| {
            let sink = Arc::clone(&sink);
            let text = Arc::clone(&text);
            let span = tracing::info_span!("deliver", recipient);
            tokio::spawn(async move { sink.send(recipient, &text).await }.instrument(span))
        })
        .collect();

    let joined = join_all(handles).await;

    let outcomes = recipients
        .iter()
        .zip(joined)
        .map(|(&recipient, joined)| {
            let result = joined.unwrap_or_else(|e| Err(NotifyError::Task(e.to_string())));

            match &result {
                Ok(()) => info!(recipient, "notification delivered"),
                Err(e) => error!(recipient, error = %e, "notification delivery failed"),
            }

            DeliveryOutcome { recipient, result }
        })
        .collect();

    DeliveryReport { outcomes }
}

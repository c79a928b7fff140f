pub mod errors;
pub mod fanout;
pub mod telegram;

use async_trait::async_trait;

pub use errors::NotifyError;
pub use fanout::{DeliveryOutcome, DeliveryReport, deliver_all};
pub use telegram::TelegramSink;

/// Chat id of a notification recipient.
pub type RecipientId = i64;

#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn send(&self, recipient: RecipientId, text: &str) -> Result<(), NotifyError>;
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::notify::errors::NotifyError;
use crate::notify::{NotificationSink, RecipientId};

/// Bot API limit for a single text message, in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: RecipientId,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API `sendMessage` sink.
#[derive(Clone)]
pub struct TelegramSink {
    http: Client,
    send_url: String,
}

impl TelegramSink {
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            send_url: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
        })
    }

    async fn send_part(&self, chat_id: RecipientId, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(&self.send_url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api) if status.is_success() && api.ok => Ok(()),
            Ok(api) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: api.description.unwrap_or(body),
            }),
            Err(_) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: body,
            }),
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    #[instrument(skip(self, text), fields(units = text.encode_utf16().count()), level = "debug")]
    async fn send(&self, recipient: RecipientId, text: &str) -> Result<(), NotifyError> {
        let parts = split_message(text, MAX_MESSAGE_UNITS);
        let total = parts.len();

        for (i, part) in parts.iter().enumerate() {
            self.send_part(recipient, part).await?;
            debug!(part = i + 1, total, "message part sent");
        }

        Ok(())
    }
}

/// Splits `text` into parts of at most `max_units` UTF-16 code units, the
/// unit Telegram measures message length in.
///
/// Breaks after a newline when one falls inside the window; a single line
/// longer than the window is cut at the last character that still fits.
pub fn split_message(text: &str, max_units: usize) -> Vec<String> {
    // every char fits in two units
    let max_units = max_units.max(2);
    let mut parts = Vec::new();
    let mut rest = text;

    while rest.encode_utf16().count() > max_units {
        // byte offset just past the last char that fits in the window
        let mut units = 0;
        let mut window_end = rest.len();
        for (idx, c) in rest.char_indices() {
            units += c.len_utf16();
            if units > max_units {
                window_end = idx;
                break;
            }
        }

        let cut = match rest[..window_end].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => window_end,
        };

        parts.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest.to_string());
    }

    parts
}

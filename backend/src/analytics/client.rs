use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::analytics::AnalyticsSource;
use crate::analytics::errors::AnalyticsError;
use crate::analytics::types::{AnalyticsData, AnalyticsEnvelope, AnalyticsRequest};

/// Ozon Seller API analytics client.
#[derive(Clone)]
pub struct OzonClient {
    http: Client,
    url: String,
    client_id: String,
    api_key: String,
    limit: u32,
}

impl OzonClient {
    pub fn new(
        base_url: &str,
        client_id: String,
        api_key: String,
        limit: u32,
        timeout: Duration,
    ) -> Result<Self, AnalyticsError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}/v1/analytics/data", base_url.trim_end_matches('/')),
            client_id,
            api_key,
            limit,
        })
    }
}

#[async_trait]
impl AnalyticsSource for OzonClient {
    #[instrument(skip(self), fields(date = %date, limit = self.limit), level = "debug")]
    async fn fetch_day(&self, date: NaiveDate) -> Result<AnalyticsData, AnalyticsError> {
        let body = AnalyticsRequest::for_day(date, self.limit);

        let resp = self
            .http
            .post(&self.url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(AnalyticsError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: AnalyticsEnvelope = serde_json::from_str(&text)?;

        debug!(
            rows = envelope.result.data.len(),
            totals = ?envelope.result.totals,
            "analytics report fetched"
        );

        Ok(envelope.result)
    }
}

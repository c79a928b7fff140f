use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analytics api returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response from analytics api: {0}")]
    Decode(#[from] serde_json::Error),
}

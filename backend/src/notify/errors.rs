use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport failure. The request URL is stripped since it embeds the bot token.
    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("telegram rejected the message ({status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("delivery task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

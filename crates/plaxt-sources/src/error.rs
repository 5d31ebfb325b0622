use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraktError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("trakt response error {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("invalid trakt response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

impl TraktError {
    /// A 4xx answer: Trakt understood the request and refused it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TraktError::Status { status, .. } if (400..500).contains(status))
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("webhook payload is empty")]
    Empty,
    #[error("webhook payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

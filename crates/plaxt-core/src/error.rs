use plaxt_config::StoreError;
use plaxt_sources::{PayloadError, TraktError};
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum ScrobbleError {
    /// Credential missing, or the catalog has nothing matching the event.
    #[error("not found: {0}")]
    NotFound(String),
    /// Trakt refused the token exchange; the credential is gone.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("upstream error: {0}")]
    Upstream(#[from] TraktError),
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),
    /// Library section other than show or movie.
    #[error("unsupported media type '{0}'")]
    UnsupportedMedia(String),
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
    /// The background token refresh panicked or was aborted.
    #[error("token refresh task failed: {0}")]
    RefreshTask(#[from] JoinError),
}

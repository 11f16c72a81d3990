use thiserror::Error;

/// Errors surfaced by the client library. REST failures propagate to the
/// caller unchanged; user-facing messaging is the caller's job.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not authenticated")]
    NotAuthenticated,

    /// The access token expired and the one automatic refresh failed.
    /// The session has been cleared; the caller must log in again.
    #[error("session expired")]
    SessionExpired,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// True if the error means the stored credentials are unusable.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::SessionExpired
        )
    }
}

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or rejected credentials. Re-running `playtally <user> auth` fixes it.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// Transport failure, timeout or 5xx. Retryable.
    #[error("request failed: {0}")]
    Fetch(String),

    /// 4xx other than 401 and 429, e.g. a missing scope or an unknown id.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("rate limited by the Spotify API")]
    RateLimited(Option<Duration>),

    #[error("track payload is missing `{field}`")]
    MalformedTrack { field: &'static str },

    #[error("no playlist named \"{0}\"")]
    PlaylistNotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Fetch(_) | Error::RateLimited(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => {
                Error::Auth(err.to_string())
            }
            Some(status) if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                Error::RateLimited(None)
            }
            Some(status) if status.is_client_error() => Error::Rejected(err.to_string()),
            _ => Error::Fetch(err.to_string()),
        }
    }
}

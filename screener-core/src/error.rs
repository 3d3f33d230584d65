use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failure of a single upstream call. Every variant is terminal for that call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("upstream returned HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            ApiError::Decode(_) => None,
        }
    }
}

/// Failure of an upstream fetch.
///
/// Every variant carries a human-readable message. None of them are retried
/// automatically; the caller decides whether to rerun the whole request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Malformed(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value.to_string())
    }
}

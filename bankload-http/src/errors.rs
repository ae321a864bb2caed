//! HTTP error types

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for HttpError {
    fn from(err: url::ParseError) -> Self {
        HttpError::InvalidUrl(err.to_string())
    }
}

impl HttpError {
    /// Whether the request never produced an HTTP status (timeouts, refused connections)
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::NetworkError(e) if e.status().is_none())
    }
}

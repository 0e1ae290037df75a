use thiserror::Error;

/// Errors returned by the backend API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered 404.
    #[error("not found: {url}")]
    NotFound { url: String, message: Option<String> },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status} from {url}: {message}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        message: String,
    },

    /// The backend answered but reported the operation as failed.
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// `true` when the request was abandoned because its deadline passed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_timeout())
    }

    /// The backend's own error text when one was returned, else the
    /// display form of the error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound {
                message: Some(m), ..
            }
            | ApiError::UnexpectedStatus { message: m, .. }
            | ApiError::Rejected(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

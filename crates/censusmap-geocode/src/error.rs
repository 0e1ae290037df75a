use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoder answered with a status other than `OK`/`ZERO_RESULTS`
    /// (e.g. `REQUEST_DENIED`, `OVER_QUERY_LIMIT`).
    #[error("geocoder returned status {status}")]
    Status {
        status: String,
        detail: Option<String>,
    },

    #[error("geocoder returned HTTP {status}")]
    UnexpectedHttpStatus { status: u16 },

    #[error("failed to deserialize geocoder response for '{query}': {source}")]
    Deserialize {
        query: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid geocoder URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_names_status() {
        let err = GeocodeError::Status {
            status: "OVER_QUERY_LIMIT".into(),
            detail: None,
        };
        assert_eq!(err.to_string(), "geocoder returned status OVER_QUERY_LIMIT");
    }
}

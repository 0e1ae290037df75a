//! Google Geocoding API client.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::geocoder::Geocoder;
use crate::types::{GeocodeRequest, GeocodeResult, GoogleResponse};

pub struct GoogleGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl GoogleGeocoder {
    /// Creates a geocoder for the JSON endpoint at `endpoint`
    /// (normally `https://maps.googleapis.com/maps/api/geocode/json`).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidUrl`] if `endpoint` does not parse, or
    /// [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        let endpoint = Url::parse(endpoint).map_err(|e| GeocodeError::InvalidUrl {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_owned(),
        })
    }

    fn request_url(&self, request: &GeocodeRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("address", &request.address);
            if let Some(country) = &request.country {
                pairs.append_pair("components", &format!("country:{country}"));
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, request: &GeocodeRequest) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let url = self.request_url(request);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedHttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: GoogleResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                query: request.address.clone(),
                source: e,
            })?;

        match parsed.status.as_str() {
            "OK" => {
                tracing::debug!(
                    query = %request.address,
                    results = parsed.results.len(),
                    "geocoded"
                );
                Ok(parsed.results)
            }
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(GeocodeError::Status {
                status: parsed.status,
                detail: parsed.error_message,
            }),
        }
    }
}

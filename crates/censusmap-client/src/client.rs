//! HTTP client for the census explorer backend.
//!
//! Wraps `reqwest` with endpoint-specific status handling and typed response
//! deserialization. A 404 is surfaced as [`ApiError::NotFound`] so callers can
//! tell "nothing there yet" apart from other failures; the backend's
//! `{"error": ..}` / `{"message": ..}` text is carried in every status error.

use std::time::Duration;

use censusmap_core::{CensusFilters, CensusRecord, GeoPoint, ResolvedLocation};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{
    BackendGeocodeResponse, CensusListResponse, FetchSummary, ReportRequest, SchoolScores,
    SchoolZones,
};

/// Client for the backend REST API.
///
/// Every endpoint path is resolved against `base_url`, which is normalised to
/// end in exactly one slash (e.g. `http://localhost:5000/api/`).
#[derive(Debug, Clone)]
pub struct CensusApiClient {
    client: Client,
    base_url: Url,
}

impl CensusApiClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// `timeout_secs` is the default per-request timeout; individual calls
    /// such as [`CensusApiClient::zip_boundary`] may impose a shorter one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not
    /// parse or cannot carry path segments.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot carry path segments".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Lists census records matching `filters`, capped at `filters.limit`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::UnexpectedStatus`] / [`ApiError::NotFound`] on non-2xx,
    ///   carrying the backend's error text.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Deserialize`] if the body is not the expected envelope.
    pub async fn list_census_data(
        &self,
        filters: &CensusFilters,
    ) -> Result<Vec<CensusRecord>, ApiError> {
        let mut url = self.endpoint(&["census-data"]);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }

        let envelope: CensusListResponse = self
            .send_json(self.client.get(url), "census-data list")
            .await?;
        tracing::debug!(records = envelope.data.len(), "loaded census records");
        Ok(envelope.data)
    }

    /// Fetches the census record for one zip code. A 404 means the backend
    /// has no data for it and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Any failure other than 404, as for [`CensusApiClient::list_census_data`].
    pub async fn census_record(&self, zip: &str) -> Result<Option<CensusRecord>, ApiError> {
        let url = self.endpoint(&["census-data", "zip", zip]);
        match self
            .send_json::<CensusRecord>(self.client.get(url), &format!("census record {zip}"))
            .await
        {
            Ok(record) => Ok(Some(record)),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Asks the backend to pull fresh data from the Census Bureau.
    ///
    /// `zip_codes` restricts the pull; `None` refreshes everything the
    /// backend tracks.
    ///
    /// # Errors
    ///
    /// As for [`CensusApiClient::list_census_data`].
    pub async fn fetch_census_data(
        &self,
        zip_codes: Option<&[String]>,
    ) -> Result<FetchSummary, ApiError> {
        let url = self.endpoint(&["census-data", "fetch"]);
        let body = match zip_codes {
            Some(zips) => serde_json::json!({ "zip_codes": zips }),
            None => serde_json::json!({}),
        };
        self.send_json(self.client.post(url).json(&body), "census-data fetch")
            .await
    }

    /// Fetches the raw `GeoJSON` boundary for a zip code, abandoning the
    /// request after `timeout`.
    ///
    /// # Errors
    ///
    /// As for [`CensusApiClient::list_census_data`]; a timeout surfaces as
    /// [`ApiError::Http`] with [`ApiError::is_timeout`] set.
    pub async fn zip_boundary(
        &self,
        zip: &str,
        timeout: Duration,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["zip-boundary", zip]);
        self.send_json(
            self.client.get(url).timeout(timeout),
            &format!("zip boundary {zip}"),
        )
        .await
    }

    /// Lists the school districts intersecting a zip code.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the backend has not cached the zip's
    /// boundary yet; otherwise as for [`CensusApiClient::list_census_data`].
    pub async fn school_zones(&self, zip: &str) -> Result<SchoolZones, ApiError> {
        let url = self.endpoint(&["zips", zip, "school-zones"]);
        self.send_json(self.client.get(url), &format!("school zones {zip}"))
            .await
    }

    /// Geocodes a zip code through the backend's own geocoder.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] when the backend reports `success: false` or
    /// omits the location; [`ApiError::Http`] / [`ApiError::Deserialize`]
    /// when the response cannot be read.
    pub async fn geocode_zip(&self, zip: &str) -> Result<ResolvedLocation, ApiError> {
        let url = self.endpoint(&["geocode-zip", zip]);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: BackendGeocodeResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(status_error(status, url.as_str(), &body));
            }
            Err(e) => {
                return Err(ApiError::Deserialize {
                    context: format!("backend geocode {zip}"),
                    source: e,
                })
            }
        };

        match (parsed.success, parsed.location) {
            (true, Some(location)) => Ok(ResolvedLocation {
                location,
                bounds: parsed.bounds,
                viewport: parsed.viewport,
            }),
            _ => Err(ApiError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "Backend geocoding failed".to_owned()),
            )),
        }
    }

    /// Fetches school-quality scores for an address.
    ///
    /// The backend may answer non-2xx with an `error` field while still
    /// carrying partial ratings; such bodies are returned as data.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] for an error body without ratings,
    /// [`ApiError::UnexpectedStatus`] for any other non-2xx, plus the usual
    /// transport and decoding errors.
    pub async fn school_scores(
        &self,
        address: &str,
        location: GeoPoint,
    ) -> Result<SchoolScores, ApiError> {
        let mut url = self.endpoint(&["schools", "address"]);
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("lat", &location.lat.to_string())
            .append_pair("lng", &location.lng.to_string());

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let context = format!("school scores for {address}");

        if !status.is_success() {
            let value: serde_json::Value = serde_json::from_str(&body)
                .map_err(|_| status_error(status, url.as_str(), &body))?;
            let Some(error) = value.get("error").and_then(serde_json::Value::as_str) else {
                return Err(status_error(status, url.as_str(), &body));
            };
            let has_ratings = value.get("elementary_school_rating").is_some()
                || value.get("middle_school_rating").is_some();
            if !has_ratings {
                let message = value
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(error);
                return Err(ApiError::Rejected(message.to_owned()));
            }
            tracing::warn!(address, error, "school scores returned with backend error");
            return serde_json::from_value(value)
                .map_err(|e| ApiError::Deserialize { context, source: e });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize { context, source: e })
    }

    /// Builds the report download URL. The report is a binary document the
    /// caller may hand to a browser or fetch with
    /// [`CensusApiClient::download_report`].
    #[must_use]
    pub fn report_url(&self, request: &ReportRequest) -> Url {
        let mut url = self.endpoint(&["export", "report"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("address", &request.address);
            pairs.append_pair("lat", &request.location.lat.to_string());
            pairs.append_pair("lng", &request.location.lng.to_string());
            if let Some(zip) = &request.zip_code {
                pairs.append_pair("zip_code", zip);
            }
            pairs.append_pair("format", request.format.as_str());
        }
        url
    }

    /// Downloads the generated report document.
    ///
    /// # Errors
    ///
    /// Status errors carry the backend's error text; transport failures
    /// surface as [`ApiError::Http`].
    pub async fn download_report(&self, request: &ReportRequest) -> Result<Vec<u8>, ApiError> {
        let url = self.report_url(request);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, url.as_str(), &body));
        }
        let bytes = response.bytes().await?;
        tracing::info!(bytes = bytes.len(), format = request.format.as_str(), "downloaded report");
        Ok(bytes.to_vec())
    }

    /// Resolves `segments` against the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the request, maps non-2xx statuses to typed errors, and
    /// deserializes the body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &url, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Maps a non-2xx response to [`ApiError::NotFound`] or
/// [`ApiError::UnexpectedStatus`], pulling the backend's message out of the
/// body when present.
fn status_error(status: StatusCode, url: &str, body: &str) -> ApiError {
    let message = backend_message(body);
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound {
            url: url.to_owned(),
            message,
        };
    }
    ApiError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_owned(),
        message: message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_owned()
        }),
    }
}

/// Extracts `message`, then `error`, from a JSON error body.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

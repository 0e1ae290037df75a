//! Geocoder request/response types, shaped after the Google Geocoding JSON API.

use censusmap_core::{GeoBounds, GeoPoint, ResolvedLocation};
use serde::{Deserialize, Serialize};

/// A free-form query, optionally restricted to one country (ISO 3166-1
/// alpha-2, e.g. `US`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub address: String,
    pub country: Option<String>,
}

impl GeocodeRequest {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            country: None,
        }
    }

    #[must_use]
    pub fn in_country(address: impl Into<String>, country: &str) -> Self {
        Self {
            address: address.into(),
            country: Some(country.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    #[must_use]
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGeometry {
    pub location: GeoPoint,
    #[serde(default)]
    pub bounds: Option<GeoBounds>,
    #[serde(default)]
    pub viewport: Option<GeoBounds>,
}

/// One geocoder match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: ResultGeometry,
}

impl GeocodeResult {
    /// `true` when the match is (or contains) a postal code, i.e. the
    /// geocoder understood the query as a zip rather than some other place.
    #[must_use]
    pub fn has_postal_code(&self) -> bool {
        self.address_components
            .iter()
            .any(|c| c.has_type("postal_code"))
    }

    #[must_use]
    pub fn resolved(&self) -> ResolvedLocation {
        ResolvedLocation {
            location: self.geometry.location,
            bounds: self.geometry.bounds,
            viewport: self.geometry.viewport,
        }
    }
}

/// Raw Google response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_deserializes_google_shape() {
        let json = serde_json::json!({
            "address_components": [
                { "long_name": "29201", "short_name": "29201", "types": ["postal_code"] },
                { "long_name": "Columbia", "short_name": "Columbia", "types": ["locality", "political"] }
            ],
            "formatted_address": "Columbia, SC 29201, USA",
            "geometry": {
                "location": { "lat": 34.0, "lng": -81.03 },
                "location_type": "APPROXIMATE",
                "viewport": {
                    "northeast": { "lat": 34.05, "lng": -80.99 },
                    "southwest": { "lat": 33.95, "lng": -81.07 }
                }
            },
            "place_id": "abc"
        });
        let r: GeocodeResult = serde_json::from_value(json).unwrap();
        assert!(r.has_postal_code());
        let loc = r.resolved();
        assert_eq!(loc.location, GeoPoint::new(34.0, -81.03));
        assert!(loc.bounds.is_none());
        assert!(loc.viewport.is_some());
    }

    #[test]
    fn locality_only_result_has_no_postal_code() {
        let r = GeocodeResult {
            address_components: vec![AddressComponent {
                long_name: "Atlanta".into(),
                short_name: "Atlanta".into(),
                types: vec!["locality".into()],
            }],
            formatted_address: "Atlanta, GA, USA".into(),
            geometry: ResultGeometry {
                location: GeoPoint::new(33.75, -84.39),
                bounds: None,
                viewport: None,
            },
        };
        assert!(!r.has_postal_code());
    }
}

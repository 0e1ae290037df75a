//! Integration tests for `GoogleGeocoder` and the resolver against wiremock.

use censusmap_core::GeoPoint;
use censusmap_geocode::{
    extract_postal_code, CoordinateResolver, GeocodeError, GeocodeRequest, Geocoder,
    GoogleGeocoder,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geocoder(server: &MockServer) -> GoogleGeocoder {
    GoogleGeocoder::new(
        &format!("{}/maps/api/geocode/json", server.uri()),
        "test-key",
        5,
        "censusmap-test/0.1",
    )
    .expect("geocoder construction should not fail")
}

fn postal_result(zip: &str, lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "address_components": [
            { "long_name": zip, "short_name": zip, "types": ["postal_code"] }
        ],
        "formatted_address": format!("Atlanta, GA {zip}, USA"),
        "geometry": { "location": { "lat": lat, "lng": lng } }
    })
}

#[tokio::test]
async fn ok_status_returns_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "123 Main St, Columbia, SC 29201"))
        .and(query_param("components", "country:US"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "address_components": [
                    { "long_name": "123", "short_name": "123", "types": ["street_number"] },
                    { "long_name": "29201", "short_name": "29201", "types": ["postal_code"] }
                ],
                "formatted_address": "123 Main St, Columbia, SC 29201, USA",
                "geometry": { "location": { "lat": 34.0, "lng": -81.03 } }
            }]
        })))
        .mount(&server)
        .await;

    let results = geocoder(&server)
        .geocode(&GeocodeRequest::in_country(
            "123 Main St, Columbia, SC 29201",
            "US",
        ))
        .await
        .expect("should geocode");

    assert_eq!(results.len(), 1);
    assert_eq!(extract_postal_code(&results[0]).as_deref(), Some("29201"));
}

#[tokio::test]
async fn zero_results_is_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let results = geocoder(&server)
        .geocode(&GeocodeRequest::new("nowhere"))
        .await
        .expect("ZERO_RESULTS is not an error");
    assert!(results.is_empty());
}

#[tokio::test]
async fn denied_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .mount(&server)
        .await;

    let err = geocoder(&server)
        .geocode(&GeocodeRequest::new("29201"))
        .await
        .expect_err("REQUEST_DENIED should fail");
    match err {
        GeocodeError::Status { status, detail } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(detail.as_deref(), Some("The provided API key is invalid."));
        }
        other => panic!("expected Status, got: {other:?}"),
    }
}

#[tokio::test]
async fn resolver_walks_phrasings_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "30301"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "address_components": [
                    { "long_name": "Atlanta", "short_name": "Atlanta", "types": ["locality"] }
                ],
                "formatted_address": "Atlanta, GA, USA",
                "geometry": { "location": { "lat": 1.0, "lng": 1.0 } }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "30301 USA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [postal_result("30301", 33.75, -84.39)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "ZIP Code 30301"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut resolver = CoordinateResolver::new(geocoder(&server));
    let point = resolver.resolve_point("30301").await;
    assert_eq!(point, Some(GeoPoint::new(33.75, -84.39)));

    // Cached: the `.expect(1)` counts above would fail on a second request.
    assert_eq!(resolver.resolve_point("30301").await, point);
}

//! Integration tests for `CensusApiClient` using wiremock HTTP mocks.

use std::time::Duration;

use censusmap_client::{ApiError, CensusApiClient, ReportFormat, ReportRequest};
use censusmap_core::{CensusFilters, GeoPoint};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CensusApiClient {
    CensusApiClient::new(&format!("{base_url}/api"), 5, "censusmap-test/0.1")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn list_census_data_sends_filters_and_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/census-data"))
        .and(query_param("city", "Columbia"))
        .and(query_param("limit", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "zip_code": "29201", "population": 20000, "average_household_income": 45000.0, "median_age": 29.5 },
                { "zip_code": "29205", "population": null, "average_household_income": 61000.0, "median_age": null }
            ],
            "total": 2,
            "limit": 5000,
            "offset": 0
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .list_census_data(&CensusFilters::by_city("Columbia"))
        .await
        .expect("should parse census list");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].zip_code, "29201");
    assert_eq!(records[0].population, Some(20_000));
    assert!(records[1].population.is_none());
}

#[tokio::test]
async fn list_census_data_surfaces_backend_error_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/census-data"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Database connection failed: timeout",
            "data": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .list_census_data(&CensusFilters::default().with_limit(10))
        .await
        .expect_err("500 should be an error");

    assert!(matches!(err, ApiError::UnexpectedStatus { status: 500, .. }));
    assert_eq!(err.user_message(), "Database connection failed: timeout");
}

#[tokio::test]
async fn census_record_404_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/census-data/zip/99999"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "error": "Zip code not found in Census API" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let record = client.census_record("99999").await.expect("404 is not an error");
    assert!(record.is_none());
}

#[tokio::test]
async fn census_record_returns_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/census-data/zip/29201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "zip_code": "29201",
            "county": "Richland",
            "population": 20000,
            "median_age": 29.5,
            "average_household_income": 45000.0,
            "data_year": 2022
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let record = client
        .census_record("29201")
        .await
        .expect("should parse record")
        .expect("record should exist");
    assert_eq!(record.county.as_deref(), Some("Richland"));
    assert_eq!(record.data_year, Some(2022));
}

#[tokio::test]
async fn fetch_census_data_posts_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/census-data/fetch"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Census data fetched and stored",
            "added": 3,
            "updated": 7,
            "total_fetched": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let summary = client.fetch_census_data(None).await.expect("should parse summary");
    assert_eq!(summary.total_fetched, 10);
    assert_eq!(summary.added, 3);
    assert_eq!(summary.updated, 7);
}

#[tokio::test]
async fn zip_boundary_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/zip-boundary/29201"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "type": "FeatureCollection", "features": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .zip_boundary("29201", Duration::from_millis(50))
        .await
        .expect_err("slow boundary should time out");
    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
}

#[tokio::test]
async fn school_zones_404_is_not_found_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/zips/29201/school-zones"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Zip boundary not found",
            "message": "No boundary for zip 29201."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.school_zones("29201").await.expect_err("404 expected");
    match err {
        ApiError::NotFound { message, .. } => {
            assert_eq!(message.as_deref(), Some("No boundary for zip 29201."));
        }
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn school_zones_parses_districts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/zips/29201/school-zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zip_code": "29201",
            "district_count": 1,
            "districts": [{
                "district_id": "4503390",
                "district_name": "Richland 1",
                "color": "#4A90D9",
                "avg_rating": 6.5,
                "schools": [{ "name": "A C Moore Elementary", "level": "elementary", "rating": 7.0 }],
                "geometry": { "type": "polygon", "coordinates": [[[-81.0, 34.0], [-81.1, 34.0], [-81.1, 34.1], [-81.0, 34.0]]] }
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let zones = client.school_zones("29201").await.expect("should parse zones");
    assert_eq!(zones.districts.len(), 1);
    let d = &zones.districts[0];
    assert_eq!(d.district_name.as_deref(), Some("Richland 1"));
    assert_eq!(d.schools[0].level, "elementary");
    assert!(d.geometry.is_some());
}

#[tokio::test]
async fn geocode_zip_success_carries_bounds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/geocode-zip/30301"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "location": { "lat": 33.75, "lng": -84.39 },
            "bounds": null,
            "viewport": {
                "northeast": { "lat": 33.8, "lng": -84.3 },
                "southwest": { "lat": 33.7, "lng": -84.5 }
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let loc = client.geocode_zip("30301").await.expect("should geocode");
    assert_eq!(loc.location, GeoPoint::new(33.75, -84.39));
    assert!(loc.bounds.is_none());
    assert!(loc.viewport.is_some());
}

#[tokio::test]
async fn geocode_zip_failure_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/geocode-zip/00000"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "success": false, "error": "ZERO_RESULTS" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.geocode_zip("00000").await.expect_err("should fail");
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "ZERO_RESULTS"));
}

#[tokio::test]
async fn school_scores_sends_address_and_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schools/address"))
        .and(query_param("address", "123 Main St, Columbia, SC 29201"))
        .and(query_param("lat", "34"))
        .and(query_param("lng", "-81.03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zip_code": "29201",
            "elementary_school_name": "A C Moore Elementary",
            "elementary_school_rating": 7.0,
            "middle_school_name": null,
            "middle_school_rating": null,
            "high_school_name": "Dreher High",
            "high_school_rating": 8.25,
            "blended_school_score": 7.6,
            "school_source": "distance_fallback"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let scores = client
        .school_scores("123 Main St, Columbia, SC 29201", GeoPoint::new(34.0, -81.03))
        .await
        .expect("should parse scores");
    assert_eq!(scores.elementary_school_rating, Some(7.0));
    assert!(scores.middle_school_rating.is_none());
    assert_eq!(scores.blended_school_score, Some(7.6));
}

#[tokio::test]
async fn school_scores_error_with_partial_ratings_is_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schools/address"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "rating lookup failed",
            "elementary_school_rating": 5.0,
            "middle_school_rating": null
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let scores = client
        .school_scores("1 Elm St", GeoPoint::new(34.0, -81.0))
        .await
        .expect("partial data should be returned");
    assert_eq!(scores.elementary_school_rating, Some(5.0));
}

#[tokio::test]
async fn school_scores_error_without_ratings_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schools/address"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "boom",
            "message": "Error fetching school data"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .school_scores("1 Elm St", GeoPoint::new(34.0, -81.0))
        .await
        .expect_err("should fail");
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Error fetching school data"));
}

#[tokio::test]
async fn download_report_returns_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/export/report"))
        .and(query_param("format", "docx"))
        .and(query_param("zip_code", "29201"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04report".to_vec()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let bytes = client
        .download_report(&ReportRequest {
            address: "29201".to_owned(),
            location: GeoPoint::new(34.0, -81.03),
            zip_code: Some("29201".to_owned()),
            format: ReportFormat::Docx,
        })
        .await
        .expect("should download");
    assert!(bytes.starts_with(b"PK"));
}

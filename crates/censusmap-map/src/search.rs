//! Search controllers and the other user-triggered session actions.
//!
//! Each flow validates its own input, clears the search boxes that belong to
//! the other flows, and reports failures through [`MapView::alert`]. None of
//! them return an error: a failed lookup leaves the session usable.

use std::time::Duration;

use censusmap_client::{ReportFormat, ReportRequest};
use censusmap_core::{is_valid_zip, ActiveLayer, CensusFilters, CensusRecord, GeoPoint};
use censusmap_geocode::{extract_postal_code, GeocodeError, Geocoder, US};
use reqwest::Url;

use crate::legend::SchoolScorePanel;
use crate::render::{record_popup, Marker};
use crate::session::{SearchContext, Session};
use crate::shape::{BoundaryShape, ShapeId, ShapeStyle};
use crate::view::{InfoPopup, MapView, TemporaryShape};

pub const CITY_ZOOM: u8 = 11;
pub const ZIP_ZOOM: u8 = 13;
pub const ADDRESS_ZOOM: u8 = 15;
pub const CITY_FIT_PADDING: u32 = 80;

/// Radius of the marker circle drawn for a zip with no boundary.
pub const TEMPORARY_MARKER_RADIUS_M: f64 = 2000.0;
pub const TEMPORARY_MARKER_LIFETIME: Duration = Duration::from_secs(10);

/// A downloaded report document.
#[derive(Debug, Clone)]
pub struct Report {
    pub url: Url,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl<G: Geocoder, V: MapView> Session<G, V> {
    /// Loads every record for `city` and frames the city.
    ///
    /// Clears the zip and address context and turns zip boundaries on. The
    /// city search never selects a zip of its own.
    pub async fn search_by_city(&mut self, city: &str) {
        let city = city.trim().to_owned();
        self.inputs.city.clone_from(&city);
        if city.is_empty() {
            self.view.alert("Please enter a city name");
            return;
        }

        self.context = SearchContext::default();
        self.refresh_legend();
        self.inputs.zip.clear();
        self.inputs.address.clear();
        self.toggles.boundaries = true;

        let filters = CensusFilters::by_city(&city).with_limit(self.settings.data_limit);
        self.load_census_data(filters).await;

        match self
            .resolver
            .resolve_place(&format!("{city}, USA"), Some(US))
            .await
        {
            Ok(Some(place)) => {
                self.frame_location(&place.resolved(), CITY_ZOOM, Some(CITY_FIT_PADDING));
            }
            Ok(None) => tracing::info!(city, "city did not geocode"),
            Err(e) => tracing::warn!(city, error = %e, "city geocode failed"),
        }
    }

    /// Finds `zip`, draws and selects its boundary, and shows its figures.
    pub async fn search_by_zip(&mut self, zip: &str) {
        let zip = zip.trim().to_owned();
        self.inputs.zip.clone_from(&zip);
        if zip.is_empty() {
            self.view.alert("Please enter a zip code");
            return;
        }
        if !is_valid_zip(&zip) {
            self.view.alert("Please enter a valid 5-digit zip code");
            return;
        }
        self.inputs.city.clear();

        let Some(located) = self.resolver.resolve_zip_extended(&zip, &self.api).await else {
            self.view.alert(&format!(
                "Could not geocode zip code {zip}. Check that the zip code is correct and that the geocoding service is reachable."
            ));
            return;
        };

        self.context = SearchContext {
            zip: Some(zip.clone()),
            address: Some(zip.clone()),
            location: Some(located.location),
            record: None,
        };
        let filters = CensusFilters::by_zip(&zip).with_limit(self.settings.data_limit);
        self.load_census_data(filters).await;
        self.frame_location(&located, ZIP_ZOOM, None);

        let record = self.fetch_record(&zip).await;
        self.context.record.clone_from(&record);
        self.refresh_legend();

        let shape = self.find_or_create_shape(&zip, record.as_ref()).await;
        if let Some(id) = shape {
            self.highlight(id, record.as_ref());
        }
        if self.toggles.school_districts {
            self.load_school_districts(&zip).await;
        }
        if shape.is_none() {
            self.view.draw_temporary(&TemporaryShape {
                geometry: BoundaryShape::Circle {
                    center: located.location,
                    radius_m: TEMPORARY_MARKER_RADIUS_M,
                },
                style: ShapeStyle::temporary_marker(),
                remove_after: TEMPORARY_MARKER_LIFETIME,
            });
            let content = match &record {
                Some(r) => record_popup(Some(r)),
                None => format!("Zip Code: {zip}\nNo census data available in database."),
            };
            self.view.open_popup(
                &InfoPopup::new(located.location, content)
                    .closing_after(Some(TEMPORARY_MARKER_LIFETIME)),
            );
        }
    }

    /// Geocodes a street address, then behaves like a zip search for the
    /// address's postal code and loads the school-quality panel.
    pub async fn search_by_address(&mut self, address: &str) {
        let address = address.trim().to_owned();
        self.inputs.address.clone_from(&address);
        if address.is_empty() {
            self.view.alert("Please enter an address");
            return;
        }
        self.inputs.city.clear();

        let place = match self.resolver.resolve_place(&address, Some(US)).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                self.view
                    .alert("Error searching for address: Geocoding failed: ZERO_RESULTS");
                return;
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "address geocode failed");
                self.view.alert(&format!(
                    "Error searching for address: Geocoding failed: {}",
                    geocode_failure(&e)
                ));
                return;
            }
        };
        let located = place.resolved();

        let Some(zip) = extract_postal_code(&place) else {
            self.view
                .alert("Could not find zip code for this address. Showing location on map.");
            self.frame_location(&located, ADDRESS_ZOOM, None);
            self.view
                .add_marker(&Marker::pin(located.location, address.clone()));
            self.view.open_popup(&InfoPopup::new(
                located.location,
                format!("{address}\nNo zip code found for this address."),
            ));
            return;
        };
        tracing::info!(address, zip, "address resolved");

        self.inputs.zip.clone_from(&zip);
        self.context = SearchContext {
            zip: Some(zip.clone()),
            address: Some(address.clone()),
            location: Some(located.location),
            record: None,
        };
        let filters = CensusFilters::by_zip(&zip).with_limit(self.settings.data_limit);
        self.load_census_data(filters).await;
        self.frame_location(&located, ADDRESS_ZOOM, None);

        let record = self.fetch_record(&zip).await;
        self.context.record.clone_from(&record);
        self.refresh_legend();

        self.toggles.boundaries = true;
        match self.find_or_create_shape(&zip, record.as_ref()).await {
            Some(id) => self.highlight(id, record.as_ref()),
            None => {
                self.view.add_marker(&Marker::pin(
                    located.location,
                    format!("{address} (Zip: {zip})"),
                ));
                let content = match &record {
                    Some(r) => record_popup(Some(r)),
                    None => format!(
                        "Address: {address}\nZip Code: {zip}\nNo census data available in database."
                    ),
                };
                self.view
                    .open_popup(&InfoPopup::new(located.location, content));
            }
        }
        if self.toggles.school_districts {
            self.load_school_districts(&zip).await;
        }

        self.show_school_scores(&address, located.location).await;
    }

    /// Fills the school-quality panel for an address.
    pub async fn show_school_scores(&mut self, address: &str, location: GeoPoint) {
        self.view.set_school_scores(&SchoolScorePanel::loading());
        let panel = match self.api.school_scores(address, location).await {
            Ok(scores) => SchoolScorePanel::from_scores(&scores),
            Err(e) => {
                tracing::warn!(address, error = %e, "school scores unavailable");
                SchoolScorePanel::error()
            }
        };
        self.view.set_school_scores(&panel);
    }

    /// Has the backend pull fresh Census Bureau data, then reloads the map
    /// without filters.
    pub async fn refresh_census_from_source(&mut self) {
        match self.api.fetch_census_data(None).await {
            Ok(summary) => {
                self.view.alert(&format!(
                    "Fetched {} records. Added: {}, Updated: {}",
                    summary.total_fetched, summary.added, summary.updated
                ));
                self.refresh_map().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "census fetch failed");
                self.view
                    .alert("Error fetching census data. Please check the logs for details.");
            }
        }
    }

    /// Reloads every record without filters.
    pub async fn refresh_map(&mut self) {
        let filters = CensusFilters::default().with_limit(self.settings.data_limit);
        self.load_census_data(filters).await;
    }

    /// Downloads the report for the last searched address.
    ///
    /// Without a prior search the typed address, or failing that the typed
    /// zip, is geocoded first. Returns `None` after alerting when nothing
    /// can be located or the download fails.
    pub async fn export_report(&mut self, format: ReportFormat) -> Option<Report> {
        let (address, location) = match (self.context.address.clone(), self.context.location) {
            (Some(address), Some(location)) => (address, location),
            _ => self.locate_for_export().await?,
        };

        let request = ReportRequest {
            address,
            location,
            zip_code: self.context.zip.clone(),
            format,
        };
        let url = self.api.report_url(&request);
        match self.api.download_report(&request).await {
            Ok(bytes) => Some(Report {
                url,
                filename: report_filename(&request),
                bytes,
            }),
            Err(e) => {
                tracing::error!(error = %e, "report download failed");
                self.view.alert("Error generating report. Please try again.");
                None
            }
        }
    }

    async fn locate_for_export(&mut self) -> Option<(String, GeoPoint)> {
        let address = self.inputs.address.trim().to_owned();
        let zip = self.inputs.zip.trim().to_owned();
        if address.is_empty() && zip.is_empty() {
            self.view.alert(
                "Please search for an address first using the \"Search Address\" field, then click \"Go\" to load the data.",
            );
            return None;
        }

        let location = if address.is_empty() {
            let found = self.resolver.resolve_location(&zip).await;
            if found.is_some() {
                self.context.zip = Some(zip.clone());
            }
            found.map(|l| l.location)
        } else {
            match self.resolver.resolve_place(&address, Some(US)).await {
                Ok(place) => place.map(|p| p.geometry.location),
                Err(e) => {
                    tracing::warn!(address, error = %e, "export geocode failed");
                    None
                }
            }
        };
        let Some(location) = location else {
            self.view
                .alert("Could not geocode address. Please search for a full address first.");
            return None;
        };

        let address = if address.is_empty() { zip } else { address };
        self.context.address = Some(address.clone());
        self.context.location = Some(location);
        Some((address, location))
    }

    /// Census record for `zip`; a miss or a failed request both read as no
    /// record.
    async fn fetch_record(&self, zip: &str) -> Option<CensusRecord> {
        match self.api.census_record(zip).await {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(zip, error = %e, "census record unavailable");
                None
            }
        }
    }

    /// The drawn shape for `zip`, or a newly resolved one. A zip without a
    /// record is drawn with a placeholder record.
    async fn find_or_create_shape(
        &mut self,
        zip: &str,
        record: Option<&CensusRecord>,
    ) -> Option<ShapeId> {
        if let Some(id) = self.find_shape(zip) {
            return Some(id);
        }
        let (record, fill) = match record {
            Some(record) => (record.clone(), self.fill_color_for(record)),
            None => {
                let placeholder = CensusRecord::placeholder(zip);
                let fill = self.fill_color_on(&placeholder, ActiveLayer::Population);
                (placeholder, fill)
            }
        };
        self.create_zip_boundary(record, &fill).await
    }
}

fn geocode_failure(error: &GeocodeError) -> String {
    match error {
        GeocodeError::Status { status, .. } => status.clone(),
        other => other.to_string(),
    }
}

/// `census_report_{zip}.{ext}`, or `census_report.{ext}` without a zip.
#[must_use]
pub fn report_filename(request: &ReportRequest) -> String {
    match &request.zip_code {
        Some(zip) => format!("census_report_{zip}.{}", request.format.extension()),
        None => format!("census_report.{}", request.format.extension()),
    }
}

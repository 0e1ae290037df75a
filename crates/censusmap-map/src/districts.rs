//! School-district overlay for one zip code.

use std::time::Duration;

use censusmap_client::{ApiError, District};
use censusmap_core::{is_valid_zip, GeoPoint};
use censusmap_geocode::Geocoder;
use serde::Serialize;

use crate::geometry::{district_paths, paths_bounds, Path, MIN_RING_POINTS};
use crate::session::Session;
use crate::shape::ShapeStyle;
use crate::view::{InfoPopup, MapView};

pub const DEFAULT_DISTRICT_COLOR: &str = "#4A90D9";

/// Padding, in pixels, around the districts when the map is fitted to them.
pub const DISTRICT_FIT_PADDING: u32 = 60;

pub const STATUS_LOADING: &str = "Loading districts…";
pub const STATUS_LOADING_BOUNDARY: &str = "Loading zip boundary…";
pub const STATUS_BOUNDARY_NEEDED: &str = "Zip boundary needed (search by zip first)";
pub const STATUS_NONE: &str = "No districts for this zip (NC/SC only)";
pub const STATUS_NO_GEOMETRY: &str = "No geometry to draw";
pub const STATUS_FAILED: &str = "Failed to load districts";

/// One drawn ring of a district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictShape {
    pub district_name: Option<String>,
    pub path: Path,
    pub style: ShapeStyle,
    /// Opened at the ring's first vertex on click.
    pub popup: InfoPopup,
}

impl DistrictShape {
    /// `None` when `path` is too short to enclose an area.
    #[must_use]
    pub fn new(district: &District, path: Path, auto_close: Option<Duration>) -> Option<Self> {
        if path.len() < MIN_RING_POINTS {
            return None;
        }
        let color = district
            .color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_DISTRICT_COLOR);
        let anchor: GeoPoint = path[0];
        Some(Self {
            district_name: district.district_name.clone(),
            style: ShapeStyle {
                stroke_color: color.to_owned(),
                stroke_opacity: 0.9,
                stroke_weight: 2,
                fill_color: color.to_owned(),
                fill_opacity: 0.25,
                z_index: 3,
                dashed: false,
            },
            popup: InfoPopup::new(anchor, district_popup_text(district)).closing_after(auto_close),
            path,
        })
    }
}

/// Name, average rating, and the school list.
#[must_use]
pub fn district_popup_text(district: &District) -> String {
    let name = district.district_name.as_deref().unwrap_or("District");
    let rating = district
        .avg_rating
        .map_or_else(|| "No ratings".to_owned(), |r| format!("Avg rating: {r}/10"));
    let schools = if district.schools.is_empty() {
        "No schools".to_owned()
    } else {
        district
            .schools
            .iter()
            .map(|s| format!("• {} ({})", s.name, s.level))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("{name}\n{rating}\n\n{schools}")
}

/// Status line for a failed school-zones request.
#[must_use]
pub fn status_for_error(error: &ApiError) -> String {
    match error {
        ApiError::Http(_) | ApiError::Deserialize { .. } => STATUS_FAILED.to_owned(),
        ApiError::NotFound { message: None, .. } => "Not Found".to_owned(),
        other => {
            let message = other.user_message();
            if message.contains("boundary") {
                STATUS_BOUNDARY_NEEDED.to_owned()
            } else {
                message
            }
        }
    }
}

impl<G: Geocoder, V: MapView> Session<G, V> {
    /// Clears and redraws the district overlay for `zip`.
    ///
    /// A 404 means the backend has not cached the zip's boundary; one
    /// boundary fetch is made to prime it and the lookup is retried once.
    pub async fn load_school_districts(&mut self, zip: &str) {
        self.view.clear_districts();
        self.view.set_district_status("");
        if !is_valid_zip(zip) {
            return;
        }
        self.view.set_district_status(STATUS_LOADING);

        let mut result = self.api.school_zones(zip).await;
        if matches!(result, Err(ApiError::NotFound { .. })) {
            self.view.set_district_status(STATUS_LOADING_BOUNDARY);
            if let Err(e) = self
                .api
                .zip_boundary(zip, self.settings.boundary_timeout)
                .await
            {
                tracing::debug!(zip, error = %e, "boundary prefetch failed");
            }
            result = self.api.school_zones(zip).await;
        }

        let zones = match result {
            Ok(zones) => zones,
            Err(e) => {
                tracing::warn!(zip, error = %e, "school zones not available");
                self.view.set_district_status(&status_for_error(&e));
                return;
            }
        };
        if zones.districts.is_empty() {
            self.view.set_district_status(STATUS_NONE);
            return;
        }
        self.view
            .set_district_status(&format!("Showing {} district(s)", zones.districts.len()));

        let mut drawn: Vec<Path> = Vec::new();
        for district in &zones.districts {
            let Some(geometry) = &district.geometry else {
                continue;
            };
            let paths = match district_paths(geometry) {
                Ok(paths) => paths,
                Err(e) => {
                    tracing::warn!(
                        zip,
                        district = district.district_name.as_deref().unwrap_or(""),
                        error = %e,
                        "unreadable district geometry"
                    );
                    continue;
                }
            };
            for path in paths {
                let Some(shape) =
                    DistrictShape::new(district, path, self.settings.district_popup_auto_close)
                else {
                    continue;
                };
                self.view.draw_district(&shape);
                drawn.push(shape.path);
            }
        }

        match paths_bounds(&drawn) {
            Some(b) => self.view.fit_bounds(b, Some(DISTRICT_FIT_PADDING)),
            None => self.view.set_district_status(STATUS_NO_GEOMETRY),
        }
        tracing::info!(
            zip,
            drawn = drawn.len(),
            districts = zones.districts.len(),
            "drew school districts"
        );
    }
}

//! Explorer session state and the map refresh.
//!
//! A [`Session`] owns everything one user's map needs between actions: the
//! loaded records, the drawn zip shapes and which one is selected, the
//! layer toggles, and the current search context. Every operation takes
//! `&mut self` and awaits its requests one after another.

use std::time::Duration;

use censusmap_client::{ApiError, CensusApiClient};
use censusmap_core::{
    is_valid_zip, ActiveLayer, AppConfig, CensusFilters, CensusRecord, GeoBounds, GeoPoint,
    ResolvedLocation, DEFAULT_CENSUS_LIMIT,
};
use censusmap_geocode::{CoordinateResolver, Geocoder};

use crate::boundary::{BoundaryResolver, BoundarySettings};
use crate::legend::Legend;
use crate::render::{
    marker_color, normalize, record_count_text, record_popup, HeatPoint, Heatmap, LayerScale,
    Marker,
};
use crate::shape::{ShapeId, ZipShape};
use crate::view::{InfoPopup, MapView};

/// Zoom used when a highlighted shape has no box to fit.
pub const SHAPE_ZOOM: u8 = 13;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Records beyond this many are counted but not drawn.
    pub render_cap: usize,
    /// Written into the filters of every list request the searches make.
    pub data_limit: u32,
    pub boundary_timeout: Duration,
    pub district_popup_auto_close: Option<Duration>,
}

impl SessionSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            render_cap: config.render_cap,
            data_limit: config.data_limit,
            boundary_timeout: config.boundary_timeout(),
            district_popup_auto_close: config.district_popup_auto_close(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            render_cap: 300,
            data_limit: DEFAULT_CENSUS_LIMIT,
            boundary_timeout: Duration::from_secs(10),
            district_popup_auto_close: Some(Duration::from_secs(8)),
        }
    }
}

/// Layer checkboxes. Starts with only population on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerToggles {
    pub population: bool,
    pub income: bool,
    pub age: bool,
    pub boundaries: bool,
    pub school_districts: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            population: true,
            income: false,
            age: false,
            boundaries: false,
            school_districts: false,
        }
    }
}

impl LayerToggles {
    /// Layer driving colors and weights. Income wins over age, age over
    /// population; `None` when all three are off.
    #[must_use]
    pub fn active_layer(&self) -> Option<ActiveLayer> {
        if self.income {
            Some(ActiveLayer::Income)
        } else if self.age {
            Some(ActiveLayer::Age)
        } else if self.population {
            Some(ActiveLayer::Population)
        } else {
            None
        }
    }

    /// Switches on `layer` and off the other two attribute layers.
    pub fn show_only(&mut self, layer: ActiveLayer) {
        self.population = layer == ActiveLayer::Population;
        self.income = layer == ActiveLayer::Income;
        self.age = layer == ActiveLayer::Age;
    }
}

/// What the last search found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchContext {
    pub zip: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub record: Option<CensusRecord>,
}

/// Text currently typed into the three search boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInputs {
    pub city: String,
    pub zip: String,
    pub address: String,
}

pub struct Session<G, V> {
    pub(crate) api: CensusApiClient,
    pub(crate) resolver: CoordinateResolver<G>,
    pub(crate) boundaries: BoundaryResolver,
    pub(crate) view: V,
    pub(crate) settings: SessionSettings,
    pub(crate) records: Vec<CensusRecord>,
    pub(crate) filters: CensusFilters,
    pub(crate) toggles: LayerToggles,
    pub(crate) context: SearchContext,
    pub(crate) inputs: SearchInputs,
    shapes: Vec<ZipShape>,
    selected: Option<ShapeId>,
    next_id: u64,
}

impl<G: Geocoder, V: MapView> Session<G, V> {
    #[must_use]
    pub fn new(
        api: CensusApiClient,
        geocoder: G,
        boundaries: BoundaryResolver,
        view: V,
        settings: SessionSettings,
    ) -> Self {
        Self {
            api,
            resolver: CoordinateResolver::new(geocoder),
            boundaries,
            view,
            settings,
            records: Vec::new(),
            filters: CensusFilters::default(),
            toggles: LayerToggles::default(),
            context: SearchContext::default(),
            inputs: SearchInputs::default(),
            shapes: Vec::new(),
            selected: None,
            next_id: 1,
        }
    }

    /// Builds the backend client and boundary resolver from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the base URL is invalid or an HTTP client
    /// cannot be built.
    pub fn from_config(config: &AppConfig, geocoder: G, view: V) -> Result<Self, ApiError> {
        let api = CensusApiClient::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        let boundaries = BoundaryResolver::new(
            api.clone(),
            BoundarySettings::from_config(config),
            &config.user_agent,
        )?;
        Ok(Self::new(
            api,
            geocoder,
            boundaries,
            view,
            SessionSettings::from_config(config),
        ))
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn into_view(self) -> V {
        self.view
    }

    #[must_use]
    pub fn records(&self) -> &[CensusRecord] {
        &self.records
    }

    #[must_use]
    pub fn filters(&self) -> &CensusFilters {
        &self.filters
    }

    #[must_use]
    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    #[must_use]
    pub fn inputs(&self) -> &SearchInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut SearchInputs {
        &mut self.inputs
    }

    #[must_use]
    pub fn toggles(&self) -> &LayerToggles {
        &self.toggles
    }

    pub fn toggles_mut(&mut self) -> &mut LayerToggles {
        &mut self.toggles
    }

    #[must_use]
    pub fn shapes(&self) -> &[ZipShape] {
        &self.shapes
    }

    #[must_use]
    pub fn selected_shape(&self) -> Option<&ZipShape> {
        let id = self.selected?;
        self.shapes.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn resolver(&self) -> &CoordinateResolver<G> {
        &self.resolver
    }

    /// Replaces the record list with the backend's answer for `filters` and
    /// redraws. Failures leave the previous records in place and alert.
    pub async fn load_census_data(&mut self, filters: CensusFilters) {
        self.filters = filters;
        match self.api.list_census_data(&self.filters).await {
            Ok(records) => {
                tracing::info!(records = records.len(), "census data loaded");
                self.records = records;
                let text = record_count_text(self.records.len(), self.settings.render_cap);
                self.view.set_record_count(&text);
                self.update_map().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load census data");
                self.view
                    .alert(&format!("Error loading census data: {}", e.user_message()));
            }
        }
    }

    /// Redraws markers, heatmap, and (when toggled) boundaries for the first
    /// `render_cap` records.
    ///
    /// The color scale spans every loaded record, drawn or not. Records the
    /// geocoder cannot place, or with no value for the active layer, are
    /// skipped.
    pub async fn update_map(&mut self) {
        self.view.clear_markers();
        self.clear_shapes();

        let Some(layer) = self.toggles.active_layer() else {
            return;
        };
        if self.records.is_empty() {
            return;
        }

        let scale = LayerScale::from_records(&self.records, layer);
        let batch: Vec<CensusRecord> = self
            .records
            .iter()
            .take(self.settings.render_cap)
            .cloned()
            .collect();

        let mut heat = Vec::with_capacity(batch.len());
        let mut bounds: Option<GeoBounds> = None;
        for record in batch {
            let Some(position) = self.resolver.resolve_point(&record.zip_code).await else {
                continue;
            };
            let value = layer.value_of(&record);
            if value.is_none() {
                continue;
            }

            heat.push(HeatPoint {
                location: position,
                weight: normalize(value, scale.as_ref()),
            });
            match bounds.as_mut() {
                Some(b) => b.extend(position),
                None => bounds = Some(GeoBounds::new(position, position)),
            }
            self.view
                .add_marker(&Marker::for_record(position, &record, layer, scale.as_ref()));

            if self.toggles.boundaries {
                let fill = marker_color(value, scale.as_ref());
                self.create_zip_boundary(record, &fill).await;
            }
        }

        tracing::debug!(layer = %layer, drawn = heat.len(), total = self.records.len(), "map updated");
        if !heat.is_empty() {
            self.view.show_heatmap(&Heatmap::new(heat));
            let city_filtered = self.filters.city.as_deref().is_some_and(|c| !c.is_empty());
            if let Some(b) = bounds.filter(|_| self.records.len() > 1 && !city_filtered) {
                self.view.fit_bounds(b, None);
            }
        }
        self.refresh_legend();
    }

    /// Resolves and draws the boundary for `record`'s zip, returning the new
    /// shape's id, or `None` when no strategy could place it.
    pub async fn create_zip_boundary(
        &mut self,
        record: CensusRecord,
        fill_color: &str,
    ) -> Option<ShapeId> {
        let zip = record.zip_code.clone();
        let resolved = self.boundaries.resolve(&zip, &mut self.resolver).await?;

        let id = ShapeId(self.next_id);
        self.next_id += 1;
        let shape = ZipShape::new(id, record, resolved.source, resolved.geometry, fill_color);
        self.view.draw_shape(&shape);
        self.shapes.push(shape);
        Some(id)
    }

    #[must_use]
    pub fn find_shape(&self, zip: &str) -> Option<ShapeId> {
        self.shapes.iter().find(|s| s.zip_code == zip).map(|s| s.id)
    }

    /// Marker color of `record` on the active layer (population when none
    /// is on), scaled against every loaded record.
    pub(crate) fn fill_color_for(&self, record: &CensusRecord) -> String {
        self.fill_color_on(record, self.toggles.active_layer().unwrap_or_default())
    }

    pub(crate) fn fill_color_on(&self, record: &CensusRecord, layer: ActiveLayer) -> String {
        let scale = LayerScale::from_records(&self.records, layer);
        marker_color(layer.value_of(record), scale.as_ref())
    }

    /// Selects `id`: the previous selection is first restored to the
    /// default style, then the map frames the shape and opens a popup for
    /// `record`.
    pub fn highlight(&mut self, id: ShapeId, record: Option<&CensusRecord>) {
        if let Some(prev) = self.selected.take() {
            if let Some(shape) = self.shapes.iter_mut().find(|s| s.id == prev) {
                shape.deselect();
                self.view.restyle_shape(shape.id, &shape.style);
            }
        }

        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            return;
        };
        shape.select();
        self.view.restyle_shape(shape.id, &shape.style);
        self.selected = Some(id);

        if let Some(bounds) = shape.geometry.frame_bounds() {
            self.view.fit_bounds(bounds, None);
        } else if let Some(center) = shape.center {
            self.view.set_center(center, SHAPE_ZOOM);
        }
        if let Some(center) = shape.center {
            let content = match record {
                Some(r) => record_popup(Some(r)),
                None => "Location\nNo census data available for this location.".to_owned(),
            };
            self.view.open_popup(&InfoPopup::new(center, content));
        }
    }

    /// Removes every zip shape and the district overlay drawn over them.
    pub fn clear_shapes(&mut self) {
        self.view.clear_shapes();
        self.view.clear_districts();
        self.shapes.clear();
        self.selected = None;
    }

    pub fn refresh_legend(&mut self) {
        let legend = Legend::for_context(self.context.zip.as_deref(), self.context.record.as_ref());
        self.view.set_legend(&legend);
    }

    /// Fits the location's bounds, else its viewport, else centers on it.
    pub fn frame_location(&mut self, location: &ResolvedLocation, zoom: u8, padding: Option<u32>) {
        match location.best_box() {
            Some(b) => self.view.fit_bounds(b, padding),
            None => self.view.set_center(location.location, zoom),
        }
    }

    /// Turns the district overlay on or off. Turning it on needs a zip: the
    /// last searched one, a valid zip in the search box, or the only loaded
    /// record's. Without one the toggle stays off.
    pub async fn toggle_school_districts(&mut self, on: bool) {
        if !on {
            self.toggles.school_districts = false;
            self.view.clear_districts();
            self.view.set_district_status("");
            return;
        }
        let Some(zip) = self.zip_for_school_districts() else {
            self.toggles.school_districts = false;
            self.view.alert(
                "Search for a zip code first (Search Zip or Search Address), then enable School Districts.",
            );
            return;
        };
        self.toggles.school_districts = true;
        self.load_school_districts(&zip).await;
    }

    #[must_use]
    pub fn zip_for_school_districts(&self) -> Option<String> {
        if let Some(zip) = self.context.zip.as_deref().filter(|z| is_valid_zip(z)) {
            return Some(zip.to_owned());
        }
        let typed = self.inputs.zip.trim();
        if is_valid_zip(typed) {
            return Some(typed.to_owned());
        }
        match self.records.as_slice() {
            [only] if is_valid_zip(&only.zip_code) => Some(only.zip_code.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_outranks_age_outranks_population() {
        let mut t = LayerToggles {
            population: true,
            income: true,
            age: true,
            boundaries: false,
            school_districts: false,
        };
        assert_eq!(t.active_layer(), Some(ActiveLayer::Income));
        t.income = false;
        assert_eq!(t.active_layer(), Some(ActiveLayer::Age));
        t.age = false;
        assert_eq!(t.active_layer(), Some(ActiveLayer::Population));
        t.population = false;
        assert_eq!(t.active_layer(), None);
    }

    #[test]
    fn show_only_switches_other_layers_off() {
        let mut t = LayerToggles::default();
        t.show_only(ActiveLayer::Age);
        assert!(!t.population && !t.income && t.age);
        assert_eq!(t.active_layer(), Some(ActiveLayer::Age));
    }

    #[test]
    fn settings_default_match_config_defaults() {
        let s = SessionSettings::default();
        assert_eq!(s.render_cap, 300);
        assert_eq!(s.data_limit, 5000);
        assert_eq!(s.district_popup_auto_close, Some(Duration::from_secs(8)));
    }
}

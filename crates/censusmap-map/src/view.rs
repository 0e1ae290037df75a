//! The map widget boundary.
//!
//! [`MapView`] receives fully computed descriptors; how they turn into
//! pixels is up to the implementation. [`SceneRecorder`] keeps an ordered,
//! serializable log of every call instead of drawing anything.

use std::time::Duration;

use censusmap_core::{GeoBounds, GeoPoint};
use serde::{Serialize, Serializer};

use crate::districts::DistrictShape;
use crate::legend::{Legend, SchoolScorePanel};
use crate::render::{Heatmap, Marker};
use crate::shape::{BoundaryShape, ShapeId, ShapeStyle, ZipShape};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoPopup {
    pub position: GeoPoint,
    pub content: String,
    /// Closes itself after this long; `None` stays open.
    #[serde(
        rename = "auto_close_secs",
        serialize_with = "serialize_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_close: Option<Duration>,
}

impl InfoPopup {
    #[must_use]
    pub fn new(position: GeoPoint, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            auto_close: None,
        }
    }

    #[must_use]
    pub fn closing_after(mut self, delay: Option<Duration>) -> Self {
        self.auto_close = delay;
        self
    }
}

/// Short-lived outline drawn when a searched zip has no boundary at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporaryShape {
    pub geometry: BoundaryShape,
    pub style: ShapeStyle,
    #[serde(rename = "remove_after_secs", serialize_with = "serialize_duration")]
    pub remove_after: Duration,
}

#[allow(clippy::ref_option)]
fn serialize_secs<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => s.serialize_some(&d.as_secs()),
        None => s.serialize_none(),
    }
}

fn serialize_duration<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(value.as_secs())
}

pub trait MapView {
    /// Removes every census marker and the heatmap.
    fn clear_markers(&mut self);
    fn add_marker(&mut self, marker: &Marker);
    fn show_heatmap(&mut self, heatmap: &Heatmap);

    /// Removes every zip boundary.
    fn clear_shapes(&mut self);
    fn draw_shape(&mut self, shape: &ZipShape);
    /// Applies `style` to the shape's main part; secondary parts keep their
    /// z-index.
    fn restyle_shape(&mut self, id: ShapeId, style: &ShapeStyle);
    fn draw_temporary(&mut self, shape: &TemporaryShape);

    fn clear_districts(&mut self);
    fn draw_district(&mut self, district: &DistrictShape);

    /// `padding` is in pixels on every side.
    fn fit_bounds(&mut self, bounds: GeoBounds, padding: Option<u32>);
    fn set_center(&mut self, center: GeoPoint, zoom: u8);
    fn open_popup(&mut self, popup: &InfoPopup);

    fn set_legend(&mut self, legend: &Legend);
    fn set_record_count(&mut self, text: &str);
    fn set_district_status(&mut self, text: &str);
    fn set_school_scores(&mut self, panel: &SchoolScorePanel);
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SceneEvent {
    ClearMarkers,
    AddMarker(Marker),
    ShowHeatmap(Heatmap),
    ClearShapes,
    DrawShape(ZipShape),
    RestyleShape { id: ShapeId, style: ShapeStyle },
    DrawTemporary(TemporaryShape),
    ClearDistricts,
    DrawDistrict(DistrictShape),
    FitBounds {
        bounds: GeoBounds,
        #[serde(skip_serializing_if = "Option::is_none")]
        padding: Option<u32>,
    },
    SetCenter { center: GeoPoint, zoom: u8 },
    OpenPopup(InfoPopup),
    SetLegend(Legend),
    SetRecordCount { text: String },
    SetDistrictStatus { text: String },
    SetSchoolScores(SchoolScorePanel),
    Alert { message: String },
}

/// A [`MapView`] that records calls in order.
#[derive(Debug, Default)]
pub struct SceneRecorder {
    events: Vec<SceneEvent>,
}

impl SceneRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn alerts(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            SceneEvent::Alert { message } => Some(message.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn count(&self, pred: impl Fn(&SceneEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }

    #[must_use]
    pub fn last_district_status(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            SceneEvent::SetDistrictStatus { text } => Some(text.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_legend(&self) -> Option<&Legend> {
        self.events.iter().rev().find_map(|e| match e {
            SceneEvent::SetLegend(l) => Some(l),
            _ => None,
        })
    }

    /// The scene as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error; every recorded type is plain data so
    /// this only fails on non-finite floats.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }

    fn push(&mut self, event: SceneEvent) {
        self.events.push(event);
    }
}

impl MapView for SceneRecorder {
    fn clear_markers(&mut self) {
        self.push(SceneEvent::ClearMarkers);
    }

    fn add_marker(&mut self, marker: &Marker) {
        self.push(SceneEvent::AddMarker(marker.clone()));
    }

    fn show_heatmap(&mut self, heatmap: &Heatmap) {
        self.push(SceneEvent::ShowHeatmap(heatmap.clone()));
    }

    fn clear_shapes(&mut self) {
        self.push(SceneEvent::ClearShapes);
    }

    fn draw_shape(&mut self, shape: &ZipShape) {
        self.push(SceneEvent::DrawShape(shape.clone()));
    }

    fn restyle_shape(&mut self, id: ShapeId, style: &ShapeStyle) {
        self.push(SceneEvent::RestyleShape {
            id,
            style: style.clone(),
        });
    }

    fn draw_temporary(&mut self, shape: &TemporaryShape) {
        self.push(SceneEvent::DrawTemporary(shape.clone()));
    }

    fn clear_districts(&mut self) {
        self.push(SceneEvent::ClearDistricts);
    }

    fn draw_district(&mut self, district: &DistrictShape) {
        self.push(SceneEvent::DrawDistrict(district.clone()));
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, padding: Option<u32>) {
        self.push(SceneEvent::FitBounds { bounds, padding });
    }

    fn set_center(&mut self, center: GeoPoint, zoom: u8) {
        self.push(SceneEvent::SetCenter { center, zoom });
    }

    fn open_popup(&mut self, popup: &InfoPopup) {
        self.push(SceneEvent::OpenPopup(popup.clone()));
    }

    fn set_legend(&mut self, legend: &Legend) {
        self.push(SceneEvent::SetLegend(legend.clone()));
    }

    fn set_record_count(&mut self, text: &str) {
        self.push(SceneEvent::SetRecordCount {
            text: text.to_owned(),
        });
    }

    fn set_district_status(&mut self, text: &str) {
        self.push(SceneEvent::SetDistrictStatus {
            text: text.to_owned(),
        });
    }

    fn set_school_scores(&mut self, panel: &SchoolScorePanel) {
        self.push(SceneEvent::SetSchoolScores(panel.clone()));
    }

    fn alert(&mut self, message: &str) {
        tracing::info!(message, "alert");
        self.push(SceneEvent::Alert {
            message: message.to_owned(),
        });
    }
}

//! Boundary shape descriptors and their render styles.

use censusmap_core::{CensusRecord, GeoBounds, GeoPoint};
use serde::Serialize;

use crate::geometry::{path_centroid, Path};

/// Meters per degree of latitude, used to box a circle for framing.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// z-index of every part after the first in a multi-polygon. Only the main
/// part takes part in highlighting.
pub const SECONDARY_PART_Z_INDEX: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryShape {
    Polygon { path: Path },
    MultiPolygon { paths: Vec<Path> },
    Rectangle { bounds: GeoBounds },
    Circle { center: GeoPoint, radius_m: f64 },
}

impl BoundaryShape {
    /// Single-path input becomes a polygon, anything longer a multi-polygon.
    /// `None` for no paths.
    #[must_use]
    pub fn from_paths(mut paths: Vec<Path>) -> Option<Self> {
        match paths.len() {
            0 => None,
            1 => paths.pop().map(|path| BoundaryShape::Polygon { path }),
            _ => Some(BoundaryShape::MultiPolygon { paths }),
        }
    }

    /// Rectangle: bounds center. Circle: its center. Polygon: vertex mean of
    /// the main (first) path.
    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        match self {
            BoundaryShape::Polygon { path } => path_centroid(path),
            BoundaryShape::MultiPolygon { paths } => paths.first().and_then(|p| path_centroid(p)),
            BoundaryShape::Rectangle { bounds } => Some(bounds.center()),
            BoundaryShape::Circle { center, .. } => Some(*center),
        }
    }

    /// Number of drawable parts: paths for polygons, one for boxes and circles.
    #[must_use]
    pub fn part_count(&self) -> usize {
        match self {
            BoundaryShape::MultiPolygon { paths } => paths.len(),
            _ => 1,
        }
    }

    /// Box the map should fit when this shape is selected. Polygons have
    /// none and are centered instead.
    #[must_use]
    pub fn frame_bounds(&self) -> Option<GeoBounds> {
        match self {
            BoundaryShape::Rectangle { bounds } => Some(*bounds),
            BoundaryShape::Circle { center, radius_m } => Some(circle_bounds(*center, *radius_m)),
            BoundaryShape::Polygon { .. } | BoundaryShape::MultiPolygon { .. } => None,
        }
    }
}

fn circle_bounds(center: GeoPoint, radius_m: f64) -> GeoBounds {
    let dlat = radius_m / METERS_PER_DEGREE;
    let dlng = radius_m / (METERS_PER_DEGREE * center.lat.to_radians().cos().max(1e-6));
    GeoBounds::new(
        GeoPoint::new(center.lat - dlat, center.lng - dlng),
        GeoPoint::new(center.lat + dlat, center.lng + dlng),
    )
}

/// Where a boundary came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundarySource {
    Backend,
    Mirror { url: String },
    Approximate,
}

impl BoundarySource {
    #[must_use]
    pub fn is_accurate(&self) -> bool {
        !matches!(self, BoundarySource::Approximate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeStyle {
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub stroke_weight: u32,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub z_index: i32,
    pub dashed: bool,
}

impl ShapeStyle {
    /// Boundary from the backend or a mirror.
    #[must_use]
    pub fn accurate(fill_color: &str) -> Self {
        Self {
            stroke_color: "#FF0000".to_owned(),
            stroke_opacity: 0.9,
            stroke_weight: 3,
            fill_color: fill_color.to_owned(),
            fill_opacity: 0.25,
            z_index: 2,
            dashed: false,
        }
    }

    /// Rectangle or circle standing in for an unknown boundary.
    #[must_use]
    pub fn approximate(fill_color: &str) -> Self {
        Self {
            stroke_color: "#FFA500".to_owned(),
            stroke_opacity: 0.7,
            stroke_weight: 2,
            fill_color: fill_color.to_owned(),
            fill_opacity: 0.15,
            z_index: 1,
            dashed: true,
        }
    }

    #[must_use]
    pub fn for_source(source: &BoundarySource, fill_color: &str) -> Self {
        if source.is_accurate() {
            Self::accurate(fill_color)
        } else {
            Self::approximate(fill_color)
        }
    }

    /// Style a shape drops back to when it loses the selection. Fill color
    /// and dash pattern are kept.
    #[must_use]
    pub fn deselected(&self) -> Self {
        Self {
            stroke_color: "#4285F4".to_owned(),
            stroke_opacity: 0.8,
            stroke_weight: 2,
            fill_opacity: 0.15,
            z_index: 1,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn highlighted(&self) -> Self {
        Self {
            stroke_color: "#FF0000".to_owned(),
            stroke_opacity: 1.0,
            stroke_weight: 4,
            fill_opacity: 0.3,
            z_index: 10,
            ..self.clone()
        }
    }

    /// Red marker circle drawn when a searched zip has no shape at all.
    #[must_use]
    pub fn temporary_marker() -> Self {
        Self {
            stroke_color: "#FF0000".to_owned(),
            stroke_opacity: 1.0,
            stroke_weight: 4,
            fill_color: "#FF0000".to_owned(),
            fill_opacity: 0.2,
            z_index: 10,
            dashed: false,
        }
    }
}

/// A boundary drawn for one zip code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipShape {
    pub id: ShapeId,
    pub zip_code: String,
    pub record: CensusRecord,
    pub source: BoundarySource,
    pub geometry: BoundaryShape,
    pub center: Option<GeoPoint>,
    /// Style of the main part. Secondary parts share it except for z-index.
    pub style: ShapeStyle,
    /// z-index per part in drawing order; the first entry tracks `style`.
    pub part_z_indices: Vec<i32>,
    pub selected: bool,
}

impl ZipShape {
    #[must_use]
    pub fn new(
        id: ShapeId,
        record: CensusRecord,
        source: BoundarySource,
        geometry: BoundaryShape,
        fill_color: &str,
    ) -> Self {
        let style = ShapeStyle::for_source(&source, fill_color);
        let mut part_z_indices = vec![SECONDARY_PART_Z_INDEX; geometry.part_count()];
        if let Some(main) = part_z_indices.first_mut() {
            *main = style.z_index;
        }
        Self {
            id,
            zip_code: record.zip_code.clone(),
            center: geometry.center(),
            record,
            source,
            geometry,
            style,
            part_z_indices,
            selected: false,
        }
    }

    pub fn select(&mut self) {
        self.selected = true;
        self.set_main_style(self.style.highlighted());
    }

    pub fn deselect(&mut self) {
        self.selected = false;
        self.set_main_style(self.style.deselected());
    }

    fn set_main_style(&mut self, style: ShapeStyle) {
        if let Some(main) = self.part_z_indices.first_mut() {
            *main = style.z_index;
        }
        self.style = style;
    }
}

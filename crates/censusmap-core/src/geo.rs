//! Geographic primitives shared by the geocoder, backend client, and map.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate. Serialized as `{ "lat": .., "lng": .. }`, the shape
/// both the geocoder and the backend use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a point from a `GeoJSON` position (`[lng, lat, ...]`).
    #[must_use]
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }
}

/// An axis-aligned box given by its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub southwest: GeoPoint,
    pub northeast: GeoPoint,
}

impl GeoBounds {
    #[must_use]
    pub fn new(southwest: GeoPoint, northeast: GeoPoint) -> Self {
        Self {
            southwest,
            northeast,
        }
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.southwest.lat + self.northeast.lat) / 2.0,
            (self.southwest.lng + self.northeast.lng) / 2.0,
        )
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: GeoPoint) {
        self.southwest.lat = self.southwest.lat.min(p.lat);
        self.southwest.lng = self.southwest.lng.min(p.lng);
        self.northeast.lat = self.northeast.lat.max(p.lat);
        self.northeast.lng = self.northeast.lng.max(p.lng);
    }

    #[must_use]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.southwest.lat
            && p.lat <= self.northeast.lat
            && p.lng >= self.southwest.lng
            && p.lng <= self.northeast.lng
    }
}

/// A geocoded place: its representative point plus the optional exact
/// bounds and recommended viewport reported alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub location: GeoPoint,
    #[serde(default)]
    pub bounds: Option<GeoBounds>,
    #[serde(default)]
    pub viewport: Option<GeoBounds>,
}

impl ResolvedLocation {
    #[must_use]
    pub fn at(location: GeoPoint) -> Self {
        Self {
            location,
            bounds: None,
            viewport: None,
        }
    }

    /// Exact bounds when known, else the viewport.
    #[must_use]
    pub fn best_box(&self) -> Option<GeoBounds> {
        self.bounds.or(self.viewport)
    }
}

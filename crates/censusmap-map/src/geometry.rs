//! `GeoJSON` → map paths.
//!
//! Two readings of the same input format exist. Zip boundaries keep every
//! ring of a multi-polygon, holes included, since each ring is drawn as its
//! own outline. School-district geometry comes from a source that does not
//! guarantee canonical type casing, so it is normalized first and only outer
//! rings with at least three vertices are kept.

use censusmap_core::{GeoBounds, GeoPoint};
use geojson::{GeoJson, Geometry, Value};
use thiserror::Error;

/// An ordered ring of vertices.
pub type Path = Vec<GeoPoint>;

/// Rings with fewer vertices than this cannot enclose an area.
pub const MIN_RING_POINTS: usize = 3;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("GeoJSON must be an object")]
    NotAnObject,
}

/// Paths for a zip-code boundary document.
///
/// Accepts a `FeatureCollection`, a `Feature`, a bare geometry, or any
/// object carrying a `geometry` member. A `Polygon` contributes its outer
/// ring; a `MultiPolygon` contributes every ring of every member. Other
/// geometry types contribute nothing.
///
/// # Errors
///
/// Returns [`GeometryError`] if the document is not valid `GeoJSON`.
pub fn boundary_paths(document: &serde_json::Value) -> Result<Vec<Path>, GeometryError> {
    let object = document.as_object().ok_or(GeometryError::NotAnObject)?;

    let geojson = if object.contains_key("type") {
        GeoJson::from_json_value(document.clone())?
    } else if let Some(geometry) = object.get("geometry") {
        GeoJson::from_json_value(geometry.clone())?
    } else {
        return Ok(Vec::new());
    };

    let mut paths = Vec::new();
    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    push_boundary_rings(geometry, &mut paths);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                push_boundary_rings(geometry, &mut paths);
            }
        }
        GeoJson::Geometry(geometry) => push_boundary_rings(geometry, &mut paths),
    }
    Ok(paths)
}

fn push_boundary_rings(geometry: &Geometry, paths: &mut Vec<Path>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                paths.push(to_path(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    paths.push(to_path(ring));
                }
            }
        }
        _ => {}
    }
}

/// Outer-ring paths of a school-district geometry.
///
/// Type names are matched case-insensitively; `Polygon`, `MultiPolygon`,
/// and `GeometryCollection` are understood. Rings shorter than
/// [`MIN_RING_POINTS`] are dropped.
///
/// # Errors
///
/// Returns [`GeometryError`] if the normalized geometry is not valid
/// `GeoJSON`.
pub fn district_paths(geometry: &serde_json::Value) -> Result<Vec<Path>, GeometryError> {
    if geometry.is_null() {
        return Ok(Vec::new());
    }
    let mut normalized = geometry.clone();
    normalize_type_names(&mut normalized);

    let GeoJson::Geometry(parsed) = GeoJson::from_json_value(normalized)? else {
        return Ok(Vec::new());
    };
    let mut paths = Vec::new();
    push_outer_rings(&parsed, &mut paths);
    Ok(paths)
}

fn push_outer_rings(geometry: &Geometry, paths: &mut Vec<Path>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                push_closed_ring(exterior, paths);
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    push_closed_ring(exterior, paths);
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                push_outer_rings(g, paths);
            }
        }
        _ => {}
    }
}

fn push_closed_ring(ring: &[Vec<f64>], paths: &mut Vec<Path>) {
    if ring.len() >= MIN_RING_POINTS {
        paths.push(to_path(ring));
    }
}

/// Rewrites lower/odd-cased geometry `type` names to their canonical form,
/// recursing into `geometries`.
fn normalize_type_names(value: &mut serde_json::Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    if let Some(serde_json::Value::String(kind)) = object.get_mut("type") {
        let canonical = match kind.to_ascii_lowercase().as_str() {
            "point" => "Point",
            "multipoint" => "MultiPoint",
            "linestring" => "LineString",
            "multilinestring" => "MultiLineString",
            "polygon" => "Polygon",
            "multipolygon" => "MultiPolygon",
            "geometrycollection" => "GeometryCollection",
            _ => return,
        };
        *kind = canonical.to_owned();
    }
    if let Some(serde_json::Value::Array(children)) = object.get_mut("geometries") {
        for child in children {
            normalize_type_names(child);
        }
    }
}

fn to_path(ring: &[Vec<f64>]) -> Path {
    ring.iter()
        .filter_map(|c| GeoPoint::from_position(c))
        .collect()
}

/// Arithmetic mean of a path's vertices.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn path_centroid(path: &[GeoPoint]) -> Option<GeoPoint> {
    if path.is_empty() {
        return None;
    }
    let n = path.len() as f64;
    let (lat, lng) = path
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(GeoPoint::new(lat / n, lng / n))
}

/// Bounding box of every vertex in `paths`.
#[must_use]
pub fn paths_bounds(paths: &[Path]) -> Option<GeoBounds> {
    GeoBounds::from_points(paths.iter().flatten())
}

//! Layer rendering: value normalization, marker colors, and the heatmap.
//!
//! Zero, null, and missing values count as "no value". They are excluded
//! from the min/max scan, normalize to 0, and are drawn in [`NO_VALUE_COLOR`].

use censusmap_core::{ActiveLayer, CensusRecord, GeoPoint};
use serde::Serialize;

use crate::legend::{format_count, format_currency};

pub const NO_VALUE_COLOR: &str = "#999";

pub const HEATMAP_RADIUS: u32 = 20;
pub const HEATMAP_OPACITY: f64 = 0.6;

/// Cyan (transparent) through blue to red.
pub const HEATMAP_GRADIENT: [&str; 14] = [
    "rgba(0, 255, 255, 0)",
    "rgba(0, 255, 255, 1)",
    "rgba(0, 191, 255, 1)",
    "rgba(0, 127, 255, 1)",
    "rgba(0, 63, 255, 1)",
    "rgba(0, 0, 255, 1)",
    "rgba(0, 0, 223, 1)",
    "rgba(0, 0, 191, 1)",
    "rgba(0, 0, 159, 1)",
    "rgba(0, 0, 127, 1)",
    "rgba(63, 0, 91, 1)",
    "rgba(127, 0, 63, 1)",
    "rgba(191, 0, 31, 1)",
    "rgba(255, 0, 0, 1)",
];

/// Range of a layer's strictly positive values across the loaded records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerScale {
    pub min: f64,
    pub max: f64,
}

impl LayerScale {
    /// `None` when no record has a positive value for `layer`.
    #[must_use]
    pub fn from_records(records: &[CensusRecord], layer: ActiveLayer) -> Option<Self> {
        records
            .iter()
            .filter_map(|r| layer.value_of(r))
            .filter(|v| *v > 0.0)
            .fold(None, |acc: Option<Self>, v| {
                Some(match acc {
                    None => Self { min: v, max: v },
                    Some(s) => Self {
                        min: s.min.min(v),
                        max: s.max.max(v),
                    },
                })
            })
    }

    /// Position of `value` within the range: `(v - min) / (max - min)`, or
    /// 0.5 for a degenerate range.
    #[must_use]
    pub fn position(&self, value: f64) -> f64 {
        if (self.max - self.min).abs() < f64::EPSILON {
            return 0.5;
        }
        (value - self.min) / (self.max - self.min)
    }
}

/// Normalized weight in `[0, 1]` for a record value. Only positive values
/// count; zero, negative, and missing values weigh 0.
#[must_use]
pub fn normalize(value: Option<f64>, scale: Option<&LayerScale>) -> f64 {
    match (value, scale) {
        (Some(v), Some(s)) if v > 0.0 => s.position(v).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Blue (low) to red (high) marker fill for a record value.
#[must_use]
pub fn marker_color(value: Option<f64>, scale: Option<&LayerScale>) -> String {
    match value {
        Some(v) if v > 0.0 => {
            let hue = (1.0 - normalize(value, scale)) * 240.0;
            format!("hsl({hue}, 70%, 50%)")
        }
        _ => NO_VALUE_COLOR.to_owned(),
    }
}

/// `"{total}"`, or `"{total} (map: first {cap})"` when only part of the
/// data is drawn.
#[must_use]
pub fn record_count_text(total: usize, cap: usize) -> String {
    if total > cap {
        format!("{total} (map: first {cap})")
    } else {
        total.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleIcon {
    pub scale: u32,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: GeoPoint,
    pub title: String,
    /// `None` draws the map's default pin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<CircleIcon>,
    /// Shown when the marker is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
}

impl Marker {
    /// Colored circle for one census record.
    #[must_use]
    pub fn for_record(
        position: GeoPoint,
        record: &CensusRecord,
        layer: ActiveLayer,
        scale: Option<&LayerScale>,
    ) -> Self {
        Self {
            position,
            title: format!("Zip Code: {}", record.zip_code),
            icon: Some(CircleIcon {
                scale: 8,
                fill_color: marker_color(layer.value_of(record), scale),
                fill_opacity: 0.7,
                stroke_color: "#fff".to_owned(),
                stroke_weight: 2,
            }),
            popup: Some(record_popup(Some(record))),
        }
    }

    #[must_use]
    pub fn pin(position: GeoPoint, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            icon: None,
            popup: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub location: GeoPoint,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub points: Vec<HeatPoint>,
    pub gradient: Vec<String>,
    pub radius: u32,
    pub opacity: f64,
}

impl Heatmap {
    #[must_use]
    pub fn new(points: Vec<HeatPoint>) -> Self {
        Self {
            points,
            gradient: HEATMAP_GRADIENT.iter().map(|s| (*s).to_owned()).collect(),
            radius: HEATMAP_RADIUS,
            opacity: HEATMAP_OPACITY,
        }
    }
}

/// Popup body for a census record, or the "no data" card.
#[must_use]
pub fn record_popup(record: Option<&CensusRecord>) -> String {
    let Some(r) = record else {
        return "No Data Available\nNo census data found for this location.".to_owned();
    };
    let age = r
        .median_age
        .filter(|a| *a != 0.0)
        .map_or_else(|| "N/A".to_owned(), |a| format!("{a:.1}"));
    format!(
        "Zip Code: {}\nPopulation: {}\nMedian Age: {}\nMedian Household Income (MHI): {}",
        if r.zip_code.is_empty() { "N/A" } else { &r.zip_code },
        format_count(r.population),
        age,
        format_currency(r.average_household_income),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(zip: &str, population: Option<i64>) -> CensusRecord {
        CensusRecord {
            zip_code: zip.to_owned(),
            population,
            average_household_income: None,
            median_age: None,
            county: None,
            data_year: None,
        }
    }

    #[test]
    fn min_positive_maps_to_zero_and_max_to_one() {
        let records = vec![
            rec("1", Some(100)),
            rec("2", Some(300)),
            rec("3", Some(200)),
            rec("4", Some(0)),
            rec("5", None),
        ];
        let scale = LayerScale::from_records(&records, ActiveLayer::Population).unwrap();
        assert!((scale.min - 100.0).abs() < f64::EPSILON);
        assert!((scale.max - 300.0).abs() < f64::EPSILON);

        assert!(normalize(Some(100.0), Some(&scale)).abs() < f64::EPSILON);
        assert!((normalize(Some(300.0), Some(&scale)) - 1.0).abs() < f64::EPSILON);
        assert!((normalize(Some(200.0), Some(&scale)) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn equal_positive_values_normalize_to_half() {
        let records = vec![rec("1", Some(50)), rec("2", Some(50))];
        let scale = LayerScale::from_records(&records, ActiveLayer::Population);
        assert!((normalize(Some(50.0), scale.as_ref()) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_and_null_normalize_to_zero() {
        let records = vec![rec("1", Some(10)), rec("2", Some(20))];
        let scale = LayerScale::from_records(&records, ActiveLayer::Population);
        assert!(normalize(Some(0.0), scale.as_ref()).abs() < f64::EPSILON);
        assert!(normalize(None, scale.as_ref()).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_values_stay_within_unit_interval() {
        let scale = LayerScale {
            min: 10.0,
            max: 20.0,
        };
        assert!(normalize(Some(-5.0), Some(&scale)).abs() < f64::EPSILON);
        assert!(normalize(Some(5.0), Some(&scale)).abs() < f64::EPSILON);
        assert!((normalize(Some(40.0), Some(&scale)) - 1.0).abs() < f64::EPSILON);
        assert_eq!(marker_color(Some(-5.0), Some(&scale)), NO_VALUE_COLOR);
    }

    #[test]
    fn no_positive_values_has_no_scale() {
        let records = vec![rec("1", Some(0)), rec("2", None)];
        assert!(LayerScale::from_records(&records, ActiveLayer::Population).is_none());
        assert!(normalize(Some(5.0), None).abs() < f64::EPSILON);
    }

    #[test]
    fn marker_color_runs_blue_to_red() {
        let scale = LayerScale {
            min: 10.0,
            max: 20.0,
        };
        assert_eq!(marker_color(Some(10.0), Some(&scale)), "hsl(240, 70%, 50%)");
        assert_eq!(marker_color(Some(20.0), Some(&scale)), "hsl(0, 70%, 50%)");
        assert_eq!(marker_color(Some(15.0), Some(&scale)), "hsl(120, 70%, 50%)");
        assert_eq!(marker_color(Some(0.0), Some(&scale)), NO_VALUE_COLOR);
        assert_eq!(marker_color(None, Some(&scale)), NO_VALUE_COLOR);
    }

    #[test]
    fn count_text_annotates_cap() {
        assert_eq!(record_count_text(42, 300), "42");
        assert_eq!(record_count_text(300, 300), "300");
        assert_eq!(record_count_text(412, 300), "412 (map: first 300)");
    }

    #[test]
    fn heatmap_carries_fixed_gradient() {
        let heatmap = Heatmap::new(vec![]);
        assert_eq!(heatmap.gradient.len(), 14);
        assert_eq!(heatmap.gradient[0], "rgba(0, 255, 255, 0)");
        assert_eq!(heatmap.gradient[13], "rgba(255, 0, 0, 1)");
        assert_eq!(heatmap.radius, 20);
    }

    #[test]
    fn record_marker_shape() {
        let r = rec("29201", Some(12_000));
        let m = Marker::for_record(GeoPoint::new(34.0, -81.0), &r, ActiveLayer::Population, None);
        assert_eq!(m.title, "Zip Code: 29201");
        let icon = m.icon.unwrap();
        assert_eq!(icon.scale, 8);
        assert_eq!(icon.stroke_color, "#fff");
        assert!(m.popup.unwrap().contains("Population: 12,000"));
    }

    #[test]
    fn popup_shows_na_for_missing_values() {
        let r = rec("29201", Some(0));
        let text = record_popup(Some(&r));
        assert!(text.contains("Population: N/A"));
        assert!(text.contains("Median Age: N/A"));
        assert!(record_popup(None).starts_with("No Data Available"));
    }
}

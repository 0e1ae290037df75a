//! Backend response and request types.

use censusmap_core::{CensusRecord, GeoBounds, GeoPoint};
use serde::{Deserialize, Serialize};

/// `GET /census-data` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct CensusListResponse {
    #[serde(default)]
    pub data: Vec<CensusRecord>,
}

/// `POST /census-data/fetch` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    pub total_fetched: u64,
    pub added: u64,
    pub updated: u64,
}

/// `GET /zips/{zip}/school-zones` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolZones {
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub districts: Vec<District>,
    /// Informational note the backend attaches when no districts matched.
    #[serde(default)]
    pub message: Option<String>,
}

/// One school district's slice of a zip code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    #[serde(default)]
    pub district_id: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    /// Raw `GeoJSON` geometry; type names are not guaranteed to be
    /// canonically cased.
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub schools: Vec<DistrictSchool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictSchool {
    pub name: String,
    pub level: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// `GET /geocode-zip/{zip}` body. `success == false` carries `error`.
#[derive(Debug, Deserialize)]
pub(crate) struct BackendGeocodeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub bounds: Option<GeoBounds>,
    #[serde(default)]
    pub viewport: Option<GeoBounds>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /schools/address` body. Names are only present when a rating is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolScores {
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub elementary_school_name: Option<String>,
    #[serde(default)]
    pub elementary_school_rating: Option<f64>,
    #[serde(default)]
    pub middle_school_name: Option<String>,
    #[serde(default)]
    pub middle_school_rating: Option<f64>,
    #[serde(default)]
    pub high_school_name: Option<String>,
    #[serde(default)]
    pub high_school_rating: Option<f64>,
    #[serde(default)]
    pub blended_school_score: Option<f64>,
    #[serde(default)]
    pub school_source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Docx,
    Pdf,
}

impl ReportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Docx => "docx",
            ReportFormat::Pdf => "pdf",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(ReportFormat::Docx),
            "pdf" => Ok(ReportFormat::Pdf),
            other => Err(format!("unknown report format '{other}' (expected docx or pdf)")),
        }
    }
}

/// Parameters for `GET /export/report`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub address: String,
    pub location: GeoPoint,
    pub zip_code: Option<String>,
    pub format: ReportFormat,
}

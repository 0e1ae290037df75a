//! Census demographic records and the attributes the map can visualize.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One zip code's demographic snapshot as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusRecord {
    pub zip_code: String,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub average_household_income: Option<f64>,
    #[serde(default)]
    pub median_age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_year: Option<i32>,
}

impl CensusRecord {
    /// A record with no demographic values, used to draw a boundary for a
    /// zip the backend has no data for.
    #[must_use]
    pub fn placeholder(zip_code: &str) -> Self {
        Self {
            zip_code: zip_code.to_string(),
            population: Some(0),
            average_household_income: Some(0.0),
            median_age: Some(0.0),
            county: None,
            data_year: None,
        }
    }
}

/// The attribute currently driving marker color and heatmap weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLayer {
    #[default]
    Population,
    Income,
    Age,
}

impl ActiveLayer {
    /// Returns the record's value for this layer, if the backend supplied one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value_of(self, record: &CensusRecord) -> Option<f64> {
        match self {
            ActiveLayer::Population => record.population.map(|p| p as f64),
            ActiveLayer::Income => record.average_household_income,
            ActiveLayer::Age => record.median_age,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveLayer::Population => "population",
            ActiveLayer::Income => "income",
            ActiveLayer::Age => "age",
        }
    }
}

impl std::fmt::Display for ActiveLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown layer '{0}' (expected population, income, or age)")]
pub struct ParseLayerError(String);

impl std::str::FromStr for ActiveLayer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "population" => Ok(ActiveLayer::Population),
            "income" => Ok(ActiveLayer::Income),
            "age" => Ok(ActiveLayer::Age),
            other => Err(ParseLayerError(other.to_string())),
        }
    }
}

/// Row cap sent with a list request when nothing else is configured.
pub const DEFAULT_CENSUS_LIMIT: u32 = 5000;

/// Query filters for the census list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CensusFilters {
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub min_income: Option<f64>,
    pub max_income: Option<f64>,
    pub min_population: Option<i64>,
    pub max_population: Option<i64>,
    pub limit: u32,
}

impl Default for CensusFilters {
    fn default() -> Self {
        Self {
            zip_code: None,
            city: None,
            min_income: None,
            max_income: None,
            min_population: None,
            max_population: None,
            limit: DEFAULT_CENSUS_LIMIT,
        }
    }
}

impl CensusFilters {
    #[must_use]
    pub fn by_zip(zip_code: &str) -> Self {
        Self {
            zip_code: Some(zip_code.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_city(city: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limit(self, limit: u32) -> Self {
        Self { limit, ..self }
    }

    /// Query pairs for the filters that are set, then `limit`. Empty strings
    /// and zero bounds are omitted, matching how the backend treats them as
    /// unset.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(zip) = self.zip_code.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("zip_code", zip.to_string()));
        }
        if let Some(city) = self.city.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("city", city.to_string()));
        }
        if let Some(v) = self.min_income.filter(|v| *v != 0.0) {
            pairs.push(("min_income", v.to_string()));
        }
        if let Some(v) = self.max_income.filter(|v| *v != 0.0) {
            pairs.push(("max_income", v.to_string()));
        }
        if let Some(v) = self.min_population.filter(|v| *v != 0) {
            pairs.push(("min_population", v.to_string()));
        }
        if let Some(v) = self.max_population.filter(|v| *v != 0) {
            pairs.push(("max_population", v.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// `true` when `s` is exactly five ASCII digits.
#[must_use]
pub fn is_valid_zip(s: &str) -> bool {
    s.len() == 5 && s.bytes().all(|b| b.is_ascii_digit())
}

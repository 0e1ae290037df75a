mod app_config;
pub mod census;
mod config;
pub mod geo;

pub use app_config::{AppConfig, Environment, DEFAULT_BOUNDARY_MIRRORS};
pub use census::{
    is_valid_zip, ActiveLayer, CensusFilters, CensusRecord, ParseLayerError, DEFAULT_CENSUS_LIMIT,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{GeoBounds, GeoPoint, ResolvedLocation};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

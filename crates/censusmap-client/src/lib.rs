//! Typed client for the census explorer backend REST API.

pub mod client;
pub mod error;
pub mod types;

pub use client::CensusApiClient;
pub use error::ApiError;
pub use types::{
    District, DistrictSchool, FetchSummary, ReportFormat, ReportRequest, SchoolScores, SchoolZones,
};

pub mod error;
pub mod geocoder;
pub mod google;
pub mod postal;
pub mod resolver;
pub mod types;

pub use error::GeocodeError;
pub use geocoder::Geocoder;
pub use google::GoogleGeocoder;
pub use postal::{extract_postal_code, postal_code_in_text};
pub use resolver::{candidate_queries, CoordinateResolver, US};
pub use types::{AddressComponent, GeocodeRequest, GeocodeResult, ResultGeometry};

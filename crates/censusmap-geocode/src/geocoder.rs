use std::future::Future;

use crate::error::GeocodeError;
use crate::types::{GeocodeRequest, GeocodeResult};

/// A forward geocoding service.
///
/// Implementations return matches best-first. An empty list means the
/// service understood the query but found nothing; `Err` means the query
/// could not be answered at all.
pub trait Geocoder {
    fn geocode(
        &self,
        request: &GeocodeRequest,
    ) -> impl Future<Output = Result<Vec<GeocodeResult>, GeocodeError>> + Send;
}

//! Zip code → coordinate resolution with phrasing fallbacks and memoization.
//!
//! Geocoders frequently read a bare five-digit string as something other
//! than a postal code (a street number, a place id). The resolver therefore
//! walks a fixed list of phrasings and accepts the first answer the geocoder
//! itself tags as a postal code. When none is tagged, the final phrasing's
//! answer is accepted as the best available guess.

use std::collections::HashMap;

use censusmap_client::CensusApiClient;
use censusmap_core::{GeoPoint, ResolvedLocation};

use crate::error::GeocodeError;
use crate::geocoder::Geocoder;
use crate::types::{GeocodeRequest, GeocodeResult};

/// Country restriction used for every US-only lookup.
pub const US: &str = "US";

/// Phrasings tried for a zip, in priority order.
#[must_use]
pub fn candidate_queries(zip: &str) -> [String; 3] {
    [
        zip.to_owned(),
        format!("{zip} USA"),
        format!("ZIP Code {zip}"),
    ]
}

pub struct CoordinateResolver<G> {
    geocoder: G,
    cache: HashMap<String, ResolvedLocation>,
}

impl<G: Geocoder> CoordinateResolver<G> {
    #[must_use]
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            cache: HashMap::new(),
        }
    }

    #[must_use]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[must_use]
    pub fn cached(&self, zip: &str) -> Option<ResolvedLocation> {
        self.cache.get(zip.trim()).copied()
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Best-effort point for `zip`; `None` when every phrasing fails.
    pub async fn resolve_point(&mut self, zip: &str) -> Option<GeoPoint> {
        self.resolve_location(zip).await.map(|loc| loc.location)
    }

    /// Like [`CoordinateResolver::resolve_point`] but keeps the bounds and
    /// viewport the geocoder reported. Results are cached per trimmed zip
    /// for the resolver's lifetime; failures are not cached.
    pub async fn resolve_location(&mut self, zip: &str) -> Option<ResolvedLocation> {
        let key = zip.trim();
        if key.is_empty() {
            return None;
        }
        if let Some(hit) = self.cache.get(key) {
            return Some(*hit);
        }

        let queries = candidate_queries(key);
        let last = queries.len() - 1;
        for (attempt, query) in queries.iter().enumerate() {
            let results = match self.geocoder.geocode(&GeocodeRequest::new(query.as_str())).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(zip = key, query = %query, error = %e, "geocode attempt failed");
                    continue;
                }
            };
            let Some(first) = results.into_iter().next() else {
                tracing::debug!(zip = key, query = %query, "no geocode results");
                continue;
            };
            if first.has_postal_code() || attempt == last {
                let resolved = first.resolved();
                self.cache.insert(key.to_owned(), resolved);
                return Some(resolved);
            }
            tracing::debug!(zip = key, query = %query, "result is not a postal code, trying next phrasing");
        }

        tracing::warn!(zip = key, "could not geocode zip");
        None
    }

    /// Standard chain, then the harder fallbacks used when a user searches
    /// for one specific zip: a US-restricted bare lookup, the Census
    /// `ZCTA5` phrasing, and finally the backend's own geocoder.
    ///
    /// A success from any stage is cached like a standard-chain hit.
    pub async fn resolve_zip_extended(
        &mut self,
        zip: &str,
        backend: &CensusApiClient,
    ) -> Option<ResolvedLocation> {
        if let Some(found) = self.resolve_location(zip).await {
            return Some(found);
        }
        let key = zip.trim();
        if key.is_empty() {
            return None;
        }

        let fallbacks = [
            GeocodeRequest::in_country(key, US),
            GeocodeRequest::new(format!("ZCTA5 {key}")),
        ];
        for request in &fallbacks {
            match self.first_result(request).await {
                Ok(Some(result)) => {
                    let resolved = result.resolved();
                    self.cache.insert(key.to_owned(), resolved);
                    return Some(resolved);
                }
                Ok(None) => {
                    tracing::debug!(zip = key, query = %request.address, "no geocode results");
                }
                Err(e) => {
                    tracing::warn!(zip = key, query = %request.address, error = %e, "geocode attempt failed");
                }
            }
        }

        match backend.geocode_zip(key).await {
            Ok(resolved) => {
                self.cache.insert(key.to_owned(), resolved);
                Some(resolved)
            }
            Err(e) => {
                tracing::warn!(zip = key, error = %e, "backend geocoding failed");
                None
            }
        }
    }

    /// First raw match for a free-form query (city or street address).
    /// Not cached.
    ///
    /// # Errors
    ///
    /// Propagates the geocoder's error so callers can report it.
    pub async fn resolve_place(
        &self,
        query: &str,
        country: Option<&str>,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let request = match country {
            Some(c) => GeocodeRequest::in_country(query, c),
            None => GeocodeRequest::new(query),
        };
        self.first_result(&request).await
    }

    async fn first_result(
        &self,
        request: &GeocodeRequest,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        Ok(self.geocoder.geocode(request).await?.into_iter().next())
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

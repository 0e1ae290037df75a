//! Zip boundary resolution.
//!
//! Strategies run in order and the first that yields at least one path wins:
//! the backend boundary endpoint, each static `GeoJSON` mirror, and finally
//! an approximate rectangle or circle built from the geocoder's answer. A
//! timeout at any stage only moves resolution on to the next one.

use std::time::Duration;

use censusmap_client::CensusApiClient;
use censusmap_core::AppConfig;
use censusmap_geocode::{CoordinateResolver, Geocoder};
use reqwest::Client;

use crate::geometry::boundary_paths;
use crate::shape::{BoundaryShape, BoundarySource};

/// A boundary plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBoundary {
    pub geometry: BoundaryShape,
    pub source: BoundarySource,
}

#[derive(Debug, Clone)]
pub struct BoundarySettings {
    pub backend_timeout: Duration,
    pub mirror_timeout: Duration,
    /// URL templates with `{zip}` / `{zip_prefix}` placeholders.
    pub mirrors: Vec<String>,
    pub fallback_radius_m: f64,
}

impl BoundarySettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            backend_timeout: config.boundary_timeout(),
            mirror_timeout: config.mirror_timeout(),
            mirrors: config.boundary_mirrors.clone(),
            fallback_radius_m: config.fallback_radius_m,
        }
    }
}

pub struct BoundaryResolver {
    api: CensusApiClient,
    http: Client,
    settings: BoundarySettings,
}

impl BoundaryResolver {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the mirror HTTP client cannot be built.
    pub fn new(
        api: CensusApiClient,
        settings: BoundarySettings,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            api,
            http,
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &BoundarySettings {
        &self.settings
    }

    /// Best available boundary for `zip`, or `None` when even the geocoder
    /// cannot place it.
    pub async fn resolve<G: Geocoder>(
        &self,
        zip: &str,
        coordinates: &mut CoordinateResolver<G>,
    ) -> Option<ResolvedBoundary> {
        if let Some(geometry) = self.from_backend(zip).await {
            tracing::debug!(zip, "boundary from backend");
            return Some(ResolvedBoundary {
                geometry,
                source: BoundarySource::Backend,
            });
        }

        for template in &self.settings.mirrors {
            let url = expand_mirror(template, zip);
            if let Some(geometry) = self.from_mirror(&url).await {
                tracing::debug!(zip, url = %url, "boundary from mirror");
                return Some(ResolvedBoundary {
                    geometry,
                    source: BoundarySource::Mirror { url },
                });
            }
        }

        tracing::info!(zip, "no exact boundary, using approximate shape");
        let located = coordinates.resolve_location(zip).await?;
        let geometry = match located.best_box() {
            Some(bounds) => BoundaryShape::Rectangle { bounds },
            None => BoundaryShape::Circle {
                center: located.location,
                radius_m: self.settings.fallback_radius_m,
            },
        };
        Some(ResolvedBoundary {
            geometry,
            source: BoundarySource::Approximate,
        })
    }

    async fn from_backend(&self, zip: &str) -> Option<BoundaryShape> {
        let document = match self.api.zip_boundary(zip, self.settings.backend_timeout).await {
            Ok(document) => document,
            Err(e) if e.is_timeout() => {
                tracing::debug!(zip, "backend boundary timed out");
                return None;
            }
            Err(e) => {
                tracing::debug!(zip, error = %e, "backend boundary unavailable");
                return None;
            }
        };
        shape_from_document(&document, zip)
    }

    async fn from_mirror(&self, url: &str) -> Option<BoundaryShape> {
        let response = match self
            .http
            .get(url)
            .timeout(self.settings.mirror_timeout)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(url, status = r.status().as_u16(), "mirror miss");
                return None;
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "mirror request failed");
                return None;
            }
        };
        let document: serde_json::Value = match response.json().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(url, error = %e, "mirror body is not JSON");
                return None;
            }
        };
        shape_from_document(&document, url)
    }
}

fn shape_from_document(document: &serde_json::Value, origin: &str) -> Option<BoundaryShape> {
    match boundary_paths(document) {
        Ok(paths) => BoundaryShape::from_paths(paths),
        Err(e) => {
            tracing::debug!(origin, error = %e, "unreadable boundary GeoJSON");
            None
        }
    }
}

/// Substitutes `{zip}` and `{zip_prefix}` (the zip's first character).
#[must_use]
pub fn expand_mirror(template: &str, zip: &str) -> String {
    let prefix: String = zip.chars().take(1).collect();
    template
        .replace("{zip_prefix}", &prefix)
        .replace("{zip}", zip)
}

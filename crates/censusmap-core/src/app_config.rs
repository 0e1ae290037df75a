use std::time::Duration;

/// Static `GeoJSON` mirrors tried after the backend boundary endpoint.
///
/// `{zip}` is replaced with the five-digit code and `{zip_prefix}` with its
/// first digit.
pub const DEFAULT_BOUNDARY_MIRRORS: &[&str] = &[
    "https://raw.githubusercontent.com/OpenDataDE/State-zip-code-GeoJSON/master/zcta5/{zip}_polygon.geojson",
    "https://raw.githubusercontent.com/OpenDataDE/State-zip-code-GeoJSON/master/{zip_prefix}/{zip}_polygon.geojson",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub google_maps_api_key: String,
    pub api_base_url: String,
    pub geocoder_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub boundary_timeout_secs: u64,
    pub mirror_timeout_secs: u64,
    pub boundary_mirrors: Vec<String>,
    pub render_cap: usize,
    pub data_limit: u32,
    pub fallback_radius_m: f64,
    /// Seconds before a school-district popup closes itself; `0` keeps it open.
    pub district_popup_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn boundary_timeout(&self) -> Duration {
        Duration::from_secs(self.boundary_timeout_secs)
    }

    #[must_use]
    pub fn mirror_timeout(&self) -> Duration {
        Duration::from_secs(self.mirror_timeout_secs)
    }

    #[must_use]
    pub fn district_popup_auto_close(&self) -> Option<Duration> {
        (self.district_popup_secs > 0).then(|| Duration::from_secs(self.district_popup_secs))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("google_maps_api_key", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("geocoder_url", &self.geocoder_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("boundary_timeout_secs", &self.boundary_timeout_secs)
            .field("mirror_timeout_secs", &self.mirror_timeout_secs)
            .field("boundary_mirrors", &self.boundary_mirrors)
            .field("render_cap", &self.render_cap)
            .field("data_limit", &self.data_limit)
            .field("fallback_radius_m", &self.fallback_radius_m)
            .field("district_popup_secs", &self.district_popup_secs)
            .finish()
    }
}

use crate::app_config::{AppConfig, Environment, DEFAULT_BOUNDARY_MIRRORS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so the
/// logic can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let google_maps_api_key = require("GOOGLE_MAPS_API_KEY")?;

    let env = parse_environment(&or_default("CENSUSMAP_ENV", "development"))?;
    let log_level = or_default("CENSUSMAP_LOG_LEVEL", "info");
    let api_base_url = or_default("CENSUSMAP_API_BASE_URL", "http://localhost:5000/api");
    let geocoder_url = or_default(
        "CENSUSMAP_GEOCODER_URL",
        "https://maps.googleapis.com/maps/api/geocode/json",
    );

    let request_timeout_secs = parse_u64("CENSUSMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CENSUSMAP_USER_AGENT", "censusmap/0.1 (census-explorer)");
    let boundary_timeout_secs = parse_u64("CENSUSMAP_BOUNDARY_TIMEOUT_SECS", "10")?;
    let mirror_timeout_secs = parse_u64("CENSUSMAP_MIRROR_TIMEOUT_SECS", "8")?;
    let boundary_mirrors = match lookup("CENSUSMAP_BOUNDARY_MIRRORS") {
        Ok(raw) => parse_mirror_list(&raw),
        Err(_) => DEFAULT_BOUNDARY_MIRRORS
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
    };

    let render_cap = parse_usize("CENSUSMAP_RENDER_CAP", "300")?;
    if render_cap == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CENSUSMAP_RENDER_CAP".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let data_limit = parse_u32("CENSUSMAP_DATA_LIMIT", "5000")?;

    let fallback_radius_raw = or_default("CENSUSMAP_FALLBACK_RADIUS_M", "2000");
    let fallback_radius_m = fallback_radius_raw
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0)
        .ok_or_else(|| ConfigError::InvalidEnvVar {
            var: "CENSUSMAP_FALLBACK_RADIUS_M".to_string(),
            reason: format!("expected a positive number of meters, got '{fallback_radius_raw}'"),
        })?;

    let district_popup_secs = parse_u64("CENSUSMAP_DISTRICT_POPUP_SECS", "8")?;

    Ok(AppConfig {
        env,
        log_level,
        google_maps_api_key,
        api_base_url,
        geocoder_url,
        request_timeout_secs,
        user_agent,
        boundary_timeout_secs,
        mirror_timeout_secs,
        boundary_mirrors,
        render_cap,
        data_limit,
        fallback_radius_m,
        district_popup_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CENSUSMAP_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

/// Split a comma-separated mirror list, dropping blank entries.
fn parse_mirror_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Command handlers for the CLI.
//!
//! Every command drives one [`Session`] against the live backend and
//! geocoder with a [`SceneRecorder`] as the map, then prints the recorded
//! scene to stdout as JSON. User-facing alerts are part of that scene; only
//! setup failures and file writes surface as errors.

use censusmap_core::AppConfig;
use censusmap_geocode::GoogleGeocoder;
use censusmap_map::{SceneRecorder, Session};

use crate::{Commands, ExportTarget, LayerArgs};

type CliSession = Session<GoogleGeocoder, SceneRecorder>;

fn build_session(config: &AppConfig, layers: &LayerArgs) -> anyhow::Result<CliSession> {
    let geocoder = GoogleGeocoder::new(
        &config.geocoder_url,
        &config.google_maps_api_key,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build geocoder: {e}"))?;
    let mut session = Session::from_config(config, geocoder, SceneRecorder::new())
        .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))?;

    let toggles = session.toggles_mut();
    toggles.show_only(layers.layer);
    toggles.boundaries = layers.boundaries;
    toggles.school_districts = layers.districts;
    Ok(session)
}

/// Runs `command` and prints the resulting scene.
///
/// # Errors
///
/// Returns an error if the session cannot be built, the report file cannot
/// be written, or the scene cannot be serialized.
pub(crate) async fn run(
    config: &AppConfig,
    layers: &LayerArgs,
    command: Commands,
) -> anyhow::Result<()> {
    let mut session = build_session(config, layers)?;
    tracing::debug!(layer = %layers.layer, boundaries = layers.boundaries, districts = layers.districts, "session ready");

    match command {
        Commands::City { name } => session.search_by_city(&name).await,
        Commands::Zip { zip } => session.search_by_zip(&zip).await,
        Commands::Address { address } => session.search_by_address(&address).await,
        Commands::Refresh => session.refresh_census_from_source().await,
        Commands::Export {
            format,
            out,
            target,
        } => {
            match target {
                ExportTarget {
                    address: Some(address),
                    ..
                } => session.search_by_address(&address).await,
                ExportTarget { zip: Some(zip), .. } => session.search_by_zip(&zip).await,
                ExportTarget { .. } => {}
            }
            if let Some(report) = session.export_report(format).await {
                tokio::fs::write(&out, &report.bytes).await.map_err(|e| {
                    anyhow::anyhow!("failed to write report to {}: {e}", out.display())
                })?;
                eprintln!(
                    "wrote {} ({} bytes) to {}",
                    report.filename,
                    report.bytes.len(),
                    out.display()
                );
            }
        }
    }

    let scene = session
        .view()
        .to_json()
        .map_err(|e| anyhow::anyhow!("failed to serialize scene: {e}"))?;
    println!("{scene}");
    Ok(())
}

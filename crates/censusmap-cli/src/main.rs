mod run;

use std::path::PathBuf;

use censusmap_client::ReportFormat;
use censusmap_core::ActiveLayer;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "censusmap")]
#[command(about = "Census demographics and school-district map explorer")]
struct Cli {
    #[command(flatten)]
    layers: LayerArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Map layer switches shared by every command.
#[derive(Debug, Args)]
struct LayerArgs {
    /// Attribute driving marker color and heatmap weight
    #[arg(long, global = true, default_value = "population")]
    layer: ActiveLayer,

    /// Draw zip-code boundaries for loaded records
    #[arg(long, global = true)]
    boundaries: bool,

    /// Overlay school districts for the searched zip
    #[arg(long, global = true)]
    districts: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load every zip in a city and frame it
    City {
        /// City name (e.g. Columbia)
        name: String,
    },
    /// Find one zip code and select its boundary
    Zip {
        /// Five-digit zip code
        zip: String,
    },
    /// Geocode a street address and show its zip and school scores
    Address {
        /// Full street address
        address: String,
    },
    /// Pull fresh data from the Census Bureau, then reload the map
    Refresh,
    /// Download the demographic report for a zip or address
    Export {
        /// Report format (docx or pdf)
        #[arg(long, default_value = "docx")]
        format: ReportFormat,

        /// File to write the report to
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        target: ExportTarget,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ExportTarget {
    /// Zip code to report on
    #[arg(long)]
    zip: Option<String>,

    /// Street address to report on
    #[arg(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = censusmap_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run::run(&config, &cli.layers, cli.command).await
}

#[cfg(test)]
mod tests;

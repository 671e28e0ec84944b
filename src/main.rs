//! Flood Discharge Calculator - command line entry point
//!
//! Runs a localized flood-discharge analysis over a table of gauging
//! stations, previews a station table, or serves the analysis over HTTP.
//!
//! Usage:
//!   cargo run --release -- analyze --data data/example_stations.csv
//!   cargo run --release -- analyze --data stations.json --radius 80 --format text
//!   cargo run --release -- preview --data data/example_stations.csv
//!   cargo run --release -- serve --port 8080
//!
//! Environment:
//!   FLOCALC_CONFIG - path to the TOML config (default: flocalc.toml)
//!   RUST_LOG       - log filter (default: info)

use clap::{Args, Parser, Subcommand, ValueEnum};
use flocalc_service::config::{self, ParameterDefaults};
use flocalc_service::dataset::Dataset;
use flocalc_service::endpoint::{self, EndpointState};
use flocalc_service::summary::render_report;
use flocalc_service::compute_analysis;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flocalc_service",
    version,
    about = "Localized flood-discharge estimates from gauging-station statistics"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an analysis on a station table and print the result
    Analyze {
        /// Station table (.csv or .json records); defaults to the configured example data
        #[arg(short, long)]
        data: Option<PathBuf>,

        #[command(flatten)]
        parameters: ParameterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Show the size, columns, and first rows of a station table
    Preview {
        /// Station table (.csv or .json records); defaults to the configured example data
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Serve the analysis over HTTP
    Serve {
        /// Port to listen on (overrides [endpoint] port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Analysis parameters given on the command line; each overrides the
/// config file's [parameters] value.
#[derive(Args)]
struct ParameterArgs {
    /// Latitude of the point of interest (decimal degrees)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the point of interest (decimal degrees)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Search radius (km)
    #[arg(long)]
    radius: Option<f64>,

    /// Catchment area (km²)
    #[arg(long)]
    catchment_area: Option<f64>,

    /// Climate adjustment factor
    #[arg(long)]
    climate_factor: Option<f64>,

    /// Safety factor
    #[arg(long)]
    safety_factor: Option<f64>,

    /// Locality weight scaling factor
    #[arg(long, allow_negative_numbers = true)]
    locality_scaling: Option<f64>,

    /// Distance decay length for locality weights (km)
    #[arg(long, allow_negative_numbers = true)]
    distance_scaling: Option<f64>,
}

impl From<&ParameterArgs> for ParameterDefaults {
    fn from(args: &ParameterArgs) -> Self {
        ParameterDefaults {
            latitude: args.lat,
            longitude: args.lon,
            radius_km: args.radius,
            catchment_area_km2: args.catchment_area,
            climate_factor: args.climate_factor,
            safety_factor: args.safety_factor,
            locality_scaling_factor: args.locality_scaling,
            distance_scaling_factor: args.distance_scaling,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = config::config_path(cli.config.as_deref());
    let service_config = config::load_config_or_default(&config_path)?;

    match cli.command {
        Command::Analyze {
            data,
            parameters,
            format,
        } => {
            let path = data.unwrap_or_else(|| service_config.dataset.example_path.clone());
            let params = service_config
                .parameters
                .overlay(&ParameterDefaults::from(&parameters))
                .resolve()?;
            let dataset = Dataset::from_path(&path)?;
            let result = compute_analysis(&dataset, &params)?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Text => print!("{}", render_report(&result)),
            }
        }
        Command::Preview { data } => {
            let path = data.unwrap_or_else(|| service_config.dataset.example_path.clone());
            let dataset = Dataset::from_path(&path)?;
            println!("{}", serde_json::to_string_pretty(&dataset.preview())?);
        }
        Command::Serve { port } => {
            println!("🌊 Flood Discharge Calculator");
            println!("=============================\n");

            let port = port.unwrap_or(service_config.endpoint.port);
            println!("📊 Config: {}", config_path.display());
            println!("   Example data: {}", service_config.dataset.example_path.display());
            println!("🚀 Starting HTTP endpoint server...");

            let state = EndpointState {
                config: service_config,
            };
            endpoint::start_endpoint_server(port, state)?;
        }
    }

    Ok(())
}

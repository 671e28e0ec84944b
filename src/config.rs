/// Service configuration loader - parses flocalc.toml
///
/// Keeps default analysis parameters, the example station table, and the
/// endpoint settings out of code, so a deployment can change its defaults
/// without recompiling. Every section is optional.
///
/// ```toml
/// [parameters]
/// latitude = 60.0
/// longitude = 10.5
/// radius_km = 150.0
/// catchment_area_km2 = 250.0
/// climate_factor = 1.2
/// safety_factor = 1.1
/// locality_scaling_factor = 1.0
/// distance_scaling_factor = 50.0
///
/// [dataset]
/// example_path = "data/example_stations.csv"
///
/// [endpoint]
/// port = 8080
/// ```

use log::info;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::AnalysisParameters;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "flocalc.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "FLOCALC_CONFIG";

const DEFAULT_EXAMPLE_PATH: &str = "data/example_stations.csv";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing analysis parameter(s): {} (set them in [parameters] or pass them explicitly)", .0.join(", "))]
    MissingParameters(Vec<String>),
}

// ---------------------------------------------------------------------------
// TOML structures
// ---------------------------------------------------------------------------

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub parameters: ParameterDefaults,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Analysis parameters, each optional, so defaults from the file can be
/// layered under values supplied per request or on the command line.
///
/// Accepts the same field names and aliases as `AnalysisParameters`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ParameterDefaults {
    #[serde(alias = "user_latitude")]
    pub latitude: Option<f64>,
    #[serde(alias = "user_longitude")]
    pub longitude: Option<f64>,
    #[serde(alias = "radius")]
    pub radius_km: Option<f64>,
    #[serde(alias = "catchmentArea")]
    pub catchment_area_km2: Option<f64>,
    #[serde(alias = "climateFactor")]
    pub climate_factor: Option<f64>,
    #[serde(alias = "safetyFactor")]
    pub safety_factor: Option<f64>,
    #[serde(alias = "localityScalingFactor")]
    pub locality_scaling_factor: Option<f64>,
    #[serde(alias = "distanceScalingFactor")]
    pub distance_scaling_factor: Option<f64>,
}

/// Example station table settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_example_path")]
    pub example_path: PathBuf,
}

/// HTTP endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_example_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXAMPLE_PATH)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            example_path: default_example_path(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter layering
// ---------------------------------------------------------------------------

impl ParameterDefaults {
    /// Returns a copy where every value set in `overrides` replaces ours.
    pub fn overlay(&self, overrides: &ParameterDefaults) -> ParameterDefaults {
        ParameterDefaults {
            latitude: overrides.latitude.or(self.latitude),
            longitude: overrides.longitude.or(self.longitude),
            radius_km: overrides.radius_km.or(self.radius_km),
            catchment_area_km2: overrides.catchment_area_km2.or(self.catchment_area_km2),
            climate_factor: overrides.climate_factor.or(self.climate_factor),
            safety_factor: overrides.safety_factor.or(self.safety_factor),
            locality_scaling_factor: overrides.locality_scaling_factor.or(self.locality_scaling_factor),
            distance_scaling_factor: overrides.distance_scaling_factor.or(self.distance_scaling_factor),
        }
    }

    /// Builds complete `AnalysisParameters`, listing every value still
    /// unset.
    pub fn resolve(&self) -> Result<AnalysisParameters, ConfigError> {
        let fields = [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("radius_km", self.radius_km),
            ("catchment_area_km2", self.catchment_area_km2),
            ("climate_factor", self.climate_factor),
            ("safety_factor", self.safety_factor),
            ("locality_scaling_factor", self.locality_scaling_factor),
            ("distance_scaling_factor", self.distance_scaling_factor),
        ];

        match fields.map(|(_, value)| value) {
            [
                Some(user_latitude),
                Some(user_longitude),
                Some(radius_km),
                Some(catchment_area_km2),
                Some(climate_factor),
                Some(safety_factor),
                Some(locality_scaling_factor),
                Some(distance_scaling_factor),
            ] => Ok(AnalysisParameters {
                user_latitude,
                user_longitude,
                radius_km,
                catchment_area_km2,
                climate_factor,
                safety_factor,
                locality_scaling_factor,
                distance_scaling_factor,
            }),
            _ => Err(ConfigError::MissingParameters(
                fields
                    .iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect(),
            )),
        }
    }
}

impl From<&AnalysisParameters> for ParameterDefaults {
    fn from(params: &AnalysisParameters) -> Self {
        ParameterDefaults {
            latitude: Some(params.user_latitude),
            longitude: Some(params.user_longitude),
            radius_km: Some(params.radius_km),
            catchment_area_km2: Some(params.catchment_area_km2),
            climate_factor: Some(params.climate_factor),
            safety_factor: Some(params.safety_factor),
            locality_scaling_factor: Some(params.locality_scaling_factor),
            distance_scaling_factor: Some(params.distance_scaling_factor),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration text.
pub fn parse_config(contents: &str) -> Result<ServiceConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Loads configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Like `load_config`, but a missing file yields the built-in defaults.
/// A file that exists but does not parse is still an error.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {}; using built-in defaults", path.display());
        return Ok(ServiceConfig::default());
    }
    load_config(path)
}

/// Config path to use: the explicit one if given, else `$FLOCALC_CONFIG`
/// (a `.env` file is honoured), else `flocalc.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    dotenv::dotenv().ok();
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// flocalc_service: localized flood-discharge estimates from gauging-station
/// statistics.
///
/// # Module structure
///
/// ```text
/// flocalc_service
/// ├── model       — shared data types (StationRecord, AnalysisParameters, AnalysisError, …)
/// ├── geo         — great-circle distance
/// ├── dataset     — raw station tables (CSV / JSON records), preview, strict conversion
/// ├── config      — service configuration loader (flocalc.toml)
/// ├── analysis
/// │   ├── stats         — mean, sample standard deviation, weighted mean
/// │   ├── weighting     — radius filter and locality weights
/// │   ├── discharge     — specific-discharge summary
/// │   ├── flood_metrics — per-ratio-column flood estimates
/// │   └── report        — result assembly and the compute_analysis entry point
/// ├── summary     — plain-text report rendering
/// └── endpoint    — JSON HTTP API over compute_analysis
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod endpoint;
pub mod geo;
pub mod model;
pub mod summary;

pub use analysis::report::compute_analysis;

/// Flood-discharge analysis for a user location and catchment.
///
/// Submodules, in pipeline order:
/// - `weighting`     — distance to user, radius filter, locality weights.
/// - `discharge`     — weighted/plain specific-discharge statistics.
/// - `flood_metrics` — per-ratio-column flood estimates.
/// - `report`        — result assembly and the `compute_analysis` entry point.
/// - `stats`         — mean / sample standard deviation helpers.

pub mod discharge;
pub mod flood_metrics;
pub mod report;
pub mod stats;
pub mod weighting;

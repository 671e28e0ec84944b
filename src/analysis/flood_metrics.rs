/// Flood-discharge estimates for each Qx/Qn ratio column.
///
/// For every ratio column the station table carries, the column's mean and
/// sample standard deviation over the stations in radius turn the
/// catchment-scaled mean discharge into four flood estimates:
///
/// ```text
/// result_ratio                         = (average_value + std_dev) / average_value
/// flood_discharge                      = average_discharge_catchment × average_value
/// deviated_flood_discharge             = flood_discharge × result_ratio
/// dimensioned_flood_discharge          = flood_discharge × climate × safety
/// dimensioned_deviated_flood_discharge = deviated_flood_discharge × climate × safety
/// ```
///
/// Columns absent from the input are skipped with a warning and leave no
/// entry in the resulting map.

use log::warn;

use crate::analysis::stats::{mean, sample_std_dev};
use crate::model::{
    AnalysisError, AnalysisParameters, DischargeSummary, FilteredStation, FloodMetric,
    RatioColumn, RatioMap,
};

/// Computes a `FloodMetric` for each column in `present`, visiting columns
/// in fixed `RatioColumn::ALL` order.
///
/// A present column with no values among the filtered stations is treated
/// like an absent one. A column whose mean is zero aborts the analysis.
pub fn compute_flood_metrics(
    stations: &[FilteredStation],
    present: &[RatioColumn],
    summary: &DischargeSummary,
    params: &AnalysisParameters,
) -> Result<RatioMap<FloodMetric>, AnalysisError> {
    let mut metrics = RatioMap::new();

    for column in RatioColumn::ALL {
        if !present.contains(&column) {
            warn!(
                "Column '{}' not found in the input data. Skipping calculations for this metric.",
                column
            );
            continue;
        }

        let values: Vec<f64> = stations
            .iter()
            .filter_map(|s| s.record.ratios.get(column).copied())
            .collect();

        let (Some(average_value), Some(std_dev)) = (mean(&values), sample_std_dev(&values)) else {
            warn!(
                "Column '{}' has no values among the {} stations in radius. Skipping calculations for this metric.",
                column,
                stations.len()
            );
            continue;
        };

        let metric = derive_flood_metric(
            column,
            average_value,
            std_dev,
            summary.average_discharge_catchment,
            params,
        )?;
        metrics.insert(column, metric);
    }

    Ok(metrics)
}

/// Derives the six dependent quantities of one ratio column.
pub fn derive_flood_metric(
    column: RatioColumn,
    average_value: f64,
    std_dev: f64,
    average_discharge_catchment: f64,
    params: &AnalysisParameters,
) -> Result<FloodMetric, AnalysisError> {
    if average_value == 0.0 {
        return Err(AnalysisError::ZeroMeanRatio { column });
    }

    let result_ratio = (average_value + std_dev) / average_value;
    let flood_discharge = average_discharge_catchment * average_value;
    let deviated_flood_discharge = flood_discharge * result_ratio;
    let design_factor = params.climate_factor * params.safety_factor;

    Ok(FloodMetric {
        average_value,
        std_dev,
        result_ratio,
        flood_discharge,
        deviated_flood_discharge,
        dimensioned_flood_discharge: flood_discharge * design_factor,
        dimensioned_deviated_flood_discharge: deviated_flood_discharge * design_factor,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

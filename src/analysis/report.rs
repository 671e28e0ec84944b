/// Assembles the analysis result and exposes the single entry point,
/// `compute_analysis`.
///
/// Pipeline: strict table conversion → parameter checks → radius filter
/// and weighting → discharge summary → flood metrics → chart projection.
/// Any error aborts the whole analysis.

use log::debug;

use crate::analysis::discharge::summarize_discharge;
use crate::analysis::flood_metrics::compute_flood_metrics;
use crate::analysis::weighting::filter_and_weight;
use crate::dataset::{Dataset, StationTable};
use crate::model::{
    AnalysisError, AnalysisParameters, AnalysisResult, ChartData, DischargeSummary,
    FilteredStation, FloodMetric, FloodMetricChart, RatioMap, StationChart,
};

/// Runs a full analysis over a raw station table.
///
/// Structural problems (missing columns, empty table, unreadable cells)
/// are reported before any numeric work.
pub fn compute_analysis(
    dataset: &Dataset,
    params: &AnalysisParameters,
) -> Result<AnalysisResult, AnalysisError> {
    let table = StationTable::from_dataset(dataset)?;
    analyze_stations(&table, params)
}

/// Runs the numeric stages over an already-converted table.
pub fn analyze_stations(
    table: &StationTable,
    params: &AnalysisParameters,
) -> Result<AnalysisResult, AnalysisError> {
    params.validate()?;

    let filtered = filter_and_weight(table.stations(), params)?;
    let summary = summarize_discharge(&filtered, params)?;
    let flood_metrics = compute_flood_metrics(&filtered, table.ratio_columns(), &summary, params)?;

    debug!(
        "Analysis complete: {} stations in radius, {} flood metrics",
        filtered.len(),
        flood_metrics.len()
    );

    Ok(assemble_result(filtered, *params, summary, flood_metrics))
}

/// Packages computed values and their chart projections. No arithmetic.
pub fn assemble_result(
    filtered_stations: Vec<FilteredStation>,
    user_inputs: AnalysisParameters,
    discharge_summary: DischargeSummary,
    flood_metrics: RatioMap<FloodMetric>,
) -> AnalysisResult {
    let chart_data = ChartData {
        stations: station_chart(&filtered_stations),
        flood_metrics: flood_metric_chart(&flood_metrics),
    };

    AnalysisResult {
        filtered_stations,
        user_inputs,
        discharge_summary,
        flood_metrics,
        chart_data,
    }
}

fn station_chart(stations: &[FilteredStation]) -> StationChart {
    StationChart {
        labels: stations.iter().map(|s| s.record.label()).collect(),
        distances: stations.iter().map(|s| s.distance_to_user).collect(),
        weights: stations.iter().map(|s| s.locality_weight_normalized).collect(),
        specific_discharge: stations.iter().map(|s| s.record.specific_discharge).collect(),
    }
}

fn flood_metric_chart(metrics: &RatioMap<FloodMetric>) -> FloodMetricChart {
    FloodMetricChart {
        labels: metrics.columns().map(|c| c.as_str().to_string()).collect(),
        flood_discharge: metrics.values().map(|m| m.flood_discharge).collect(),
        dimensioned_flood_discharge: metrics.values().map(|m| m.dimensioned_flood_discharge).collect(),
        deviated_flood_discharge: metrics.values().map(|m| m.deviated_flood_discharge).collect(),
        dimensioned_deviated_flood_discharge: metrics
            .values()
            .map(|m| m.dimensioned_deviated_flood_discharge)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

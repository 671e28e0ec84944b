/// Plain-text rendering of an analysis for terminal output.

use std::fmt::Write;

use crate::model::AnalysisResult;

/// Formats the inputs, discharge summary, station table, and flood-metric
/// table of one analysis.
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    write_report(&mut out, result).ok();
    out
}

fn write_report(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    let inputs = &result.user_inputs;
    writeln!(out, "🌊 Flood Discharge Analysis")?;
    writeln!(out, "===========================\n")?;

    writeln!(out, "Inputs")?;
    writeln!(out, "   Location:           {:.4}, {:.4}", inputs.user_latitude, inputs.user_longitude)?;
    writeln!(out, "   Search radius:      {} km", inputs.radius_km)?;
    writeln!(out, "   Catchment area:     {} km²", inputs.catchment_area_km2)?;
    writeln!(out, "   Climate factor:     {}", inputs.climate_factor)?;
    writeln!(out, "   Safety factor:      {}", inputs.safety_factor)?;
    writeln!(out, "   Locality scaling:   {}", inputs.locality_scaling_factor)?;
    writeln!(out, "   Distance scaling:   {} km\n", inputs.distance_scaling_factor)?;

    let summary = &result.discharge_summary;
    writeln!(out, "Specific discharge (l/s/km²)")?;
    writeln!(out, "   Weighted average:   {:.3}", summary.weighted_avg_specific_discharge)?;
    writeln!(out, "   Average:            {:.3}", summary.average_discharge)?;
    writeln!(out, "   Std deviation:      {:.3}", summary.std_discharge)?;
    writeln!(out, "   Catchment average:  {:.3} m³/s\n", summary.average_discharge_catchment)?;

    writeln!(out, "Stations within {} km ({})", inputs.radius_km, result.filtered_stations.len())?;
    let label_width = result
        .filtered_stations
        .iter()
        .map(|s| s.record.label().chars().count())
        .max()
        .unwrap_or(0)
        .max("Station".len());
    writeln!(
        out,
        "   {:<label_width$}  {:>10}  {:>8}  {:>10}",
        "Station", "Dist (km)", "Weight", "q (l/s/km²)"
    )?;
    for station in &result.filtered_stations {
        writeln!(
            out,
            "   {:<label_width$}  {:>10.2}  {:>8.4}  {:>10.2}",
            station.record.label(),
            station.distance_to_user,
            station.locality_weight_normalized,
            station.record.specific_discharge
        )?;
    }
    writeln!(out)?;

    if result.flood_metrics.is_empty() {
        writeln!(out, "No flood ratio columns available.")?;
        return Ok(());
    }

    writeln!(out, "Flood metrics (m³/s)")?;
    writeln!(
        out,
        "   {:<8}  {:>7}  {:>7}  {:>7}  {:>10}  {:>10}  {:>10}  {:>10}",
        "Ratio", "Mean", "Std", "Ratio*", "Flood", "Deviated", "Dim.", "Dim. dev."
    )?;
    for (column, metric) in result.flood_metrics.iter() {
        writeln!(
            out,
            "   {:<8}  {:>7.3}  {:>7.3}  {:>7.3}  {:>10.3}  {:>10.3}  {:>10.3}  {:>10.3}",
            column.as_str(),
            metric.average_value,
            metric.std_dev,
            metric.result_ratio,
            metric.flood_discharge,
            metric.deviated_flood_discharge,
            metric.dimensioned_flood_discharge,
            metric.dimensioned_deviated_flood_discharge
        )?;
    }

    Ok(())
}

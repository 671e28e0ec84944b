/// Specific-discharge statistics over the stations within the radius.

use crate::analysis::stats::{mean, sample_std_dev, weighted_mean};
use crate::model::{AnalysisError, AnalysisParameters, DischargeSummary, FilteredStation};

/// Converts specific discharge (l/s/km²) times area (km²) into m³/s.
pub const LITRES_PER_CUBIC_METRE: f64 = 1000.0;

/// Weighted and plain statistics of `specificDischarge`, with the plain
/// mean scaled to the catchment area.
pub fn summarize_discharge(
    stations: &[FilteredStation],
    params: &AnalysisParameters,
) -> Result<DischargeSummary, AnalysisError> {
    let discharges: Vec<f64> = stations.iter().map(|s| s.record.specific_discharge).collect();
    let weights: Vec<f64> = stations.iter().map(|s| s.locality_weight_normalized).collect();

    let (Some(weighted_avg_specific_discharge), Some(average_discharge), Some(std_discharge)) = (
        weighted_mean(&discharges, &weights),
        mean(&discharges),
        sample_std_dev(&discharges),
    ) else {
        return Err(AnalysisError::NoStationsInRadius(params.radius_km));
    };

    Ok(DischargeSummary {
        weighted_avg_specific_discharge,
        average_discharge,
        std_discharge,
        average_discharge_catchment: average_discharge * params.catchment_area_km2
            / LITRES_PER_CUBIC_METRE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RatioMap, StationRecord};

    fn filtered(discharge: f64, weight: f64) -> FilteredStation {
        FilteredStation {
            record: StationRecord {
                station_number: "1".to_string(),
                station_name: "Station 1".to_string(),
                latitude: 60.0,
                longitude: 10.0,
                specific_discharge: discharge,
                ratios: RatioMap::new(),
            },
            distance_to_user: 0.0,
            locality_weight: weight,
            locality_weight_scaled: weight,
            locality_weight_normalized: weight,
        }
    }

    fn params() -> AnalysisParameters {
        AnalysisParameters {
            user_latitude: 60.0,
            user_longitude: 10.0,
            radius_km: 100.0,
            catchment_area_km2: 250.0,
            climate_factor: 1.2,
            safety_factor: 1.1,
            locality_scaling_factor: 1.0,
            distance_scaling_factor: 50.0,
        }
    }

    #[test]
    fn test_summary_statistics() {
        let stations = vec![filtered(10.0, 0.5), filtered(20.0, 0.3), filtered(30.0, 0.2)];
        let summary = summarize_discharge(&stations, &params()).expect("non-empty set");

        assert!((summary.weighted_avg_specific_discharge - 17.0).abs() < 1e-12);
        assert!((summary.average_discharge - 20.0).abs() < 1e-12);
        assert!((summary.std_discharge - 10.0).abs() < 1e-12);
        // 20 l/s/km² × 250 km² / 1000 = 5 m³/s
        assert!((summary.average_discharge_catchment - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_average_lies_between_extremes() {
        let stations = vec![filtered(12.5, 0.7), filtered(31.0, 0.1), filtered(18.0, 0.2)];
        let summary = summarize_discharge(&stations, &params()).expect("non-empty set");
        assert!(summary.weighted_avg_specific_discharge >= 12.5);
        assert!(summary.weighted_avg_specific_discharge <= 31.0);
    }

    #[test]
    fn test_single_station_has_zero_std() {
        let summary = summarize_discharge(&[filtered(22.0, 1.0)], &params()).expect("one station");
        assert_eq!(summary.std_discharge, 0.0);
        assert_eq!(summary.weighted_avg_specific_discharge, 22.0);
    }

    #[test]
    fn test_empty_set_is_an_error() {
        assert_eq!(
            summarize_discharge(&[], &params()),
            Err(AnalysisError::NoStationsInRadius(100.0))
        );
    }
}

/// Radius filtering and locality weighting of gauging stations.
///
/// Every station gets its great-circle distance to the user's site; those
/// within `radius_km` survive, in their original order. Survivors are
/// weighted by `exp(-distance / distance_scaling_factor)`, scaled by
/// `locality_scaling_factor`, and normalized so the scaled weights sum
/// to 1.

use log::debug;

use crate::geo::haversine;
use crate::model::{
    zero_distance_scaling_factor, AnalysisError, AnalysisParameters, FilteredStation,
    StationRecord,
};

/// Distance from the user's site to each station, km, in input order.
pub fn distances_to_user(stations: &[StationRecord], params: &AnalysisParameters) -> Vec<f64> {
    stations
        .iter()
        .map(|s| haversine(params.user_latitude, params.user_longitude, s.latitude, s.longitude))
        .collect()
}

/// Keeps stations with `distance_to_user <= radius_km` and computes their
/// locality weights.
///
/// Fails with `NoStationsInRadius` when nothing survives, and with
/// `InvalidParameter` when the weights cannot be normalized (zero
/// distance scaling factor, or scaled weights summing to zero).
pub fn filter_and_weight(
    stations: &[StationRecord],
    params: &AnalysisParameters,
) -> Result<Vec<FilteredStation>, AnalysisError> {
    if params.distance_scaling_factor == 0.0 {
        return Err(zero_distance_scaling_factor());
    }

    let within: Vec<(&StationRecord, f64)> = stations
        .iter()
        .zip(distances_to_user(stations, params))
        .filter(|(_, distance)| *distance <= params.radius_km)
        .collect();

    debug!(
        "{} of {} stations within {} km of ({}, {})",
        within.len(),
        stations.len(),
        params.radius_km,
        params.user_latitude,
        params.user_longitude
    );

    if within.is_empty() {
        return Err(AnalysisError::NoStationsInRadius(params.radius_km));
    }

    let weights: Vec<(f64, f64)> = within
        .iter()
        .map(|(_, distance)| {
            let weight = (-distance / params.distance_scaling_factor).exp();
            (weight, weight * params.locality_scaling_factor)
        })
        .collect();

    let scaled_total: f64 = weights.iter().map(|(_, scaled)| scaled).sum();
    if scaled_total == 0.0 || !scaled_total.is_finite() {
        return Err(AnalysisError::InvalidParameter {
            name: "locality_scaling_factor".to_string(),
            reason: format!(
                "scaled locality weights sum to {}; cannot normalize (check locality and distance scaling factors)",
                scaled_total
            ),
        });
    }

    Ok(within
        .into_iter()
        .zip(weights)
        .map(|((record, distance), (weight, scaled))| FilteredStation {
            record: record.clone(),
            distance_to_user: distance,
            locality_weight: weight,
            locality_weight_scaled: scaled,
            locality_weight_normalized: scaled / scaled_total,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

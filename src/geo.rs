/// Great-circle distances between gauging stations and the user's site.

/// Mean Earth radius used for all distances, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in km between two points given in
/// decimal degrees.
///
/// Uses the `atan2` form, which stays well-conditioned for coincident
/// and antipodal points.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] near antipodes.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

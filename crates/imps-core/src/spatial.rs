//! Distance helpers.

use crate::models::GeoPoint;

/// Flat-earth scale used for threat clearance.
pub const KM_PER_DEG: f64 = 111.0;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Planar distance in kilometers using a fixed 111 km/deg scale.
///
/// The longitude term is scaled by `cos` of the *query* point's latitude, so the
/// result is not symmetric in its arguments.
pub fn flat_earth_distance_km(query: GeoPoint, other: GeoPoint) -> f64 {
    let dy = (query.lat - other.lat) * KM_PER_DEG;
    let dx = (query.lon - other.lon) * KM_PER_DEG * query.lat.to_radians().cos();
    (dy * dy + dx * dx).sqrt()
}

/// Convert a distance in km to degrees on the flat-earth latitude scale.
pub fn km_to_deg(km: f64) -> f64 {
    km / KM_PER_DEG
}

/// Great-circle distance between two points in kilometers (Haversine formula).
pub fn haversine_distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Sum of great-circle leg lengths along a route.
pub fn path_length_km(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_distance_km(pair[0], pair[1]))
        .sum()
}

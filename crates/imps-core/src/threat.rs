//! Occupancy tests against exclusion zones.

use crate::models::{GeoPoint, Threat};
use crate::spatial::{flat_earth_distance_km, km_to_deg};

impl Threat {
    /// Whether `point` falls inside this zone inflated by `margin_km`.
    ///
    /// Circular zones use the flat-earth distance. Rectangular zones are grown by
    /// `margin_km / 111` degrees on every side regardless of latitude, and the
    /// containment test is inclusive.
    pub fn blocks(&self, point: GeoPoint, margin_km: f64) -> bool {
        match *self {
            Threat::Circular {
                lat,
                lon,
                radius_km,
            } => flat_earth_distance_km(point, GeoPoint::new(lat, lon)) < radius_km + margin_km,
            Threat::Rectangular {
                lat_min,
                lat_max,
                lon_min,
                lon_max,
            } => {
                let pad = km_to_deg(margin_km);
                (lat_min - pad..=lat_max + pad).contains(&point.lat)
                    && (lon_min - pad..=lon_max + pad).contains(&point.lon)
            }
        }
    }
}

/// True when any threat occupies `point` at the given margin.
pub fn is_blocked(point: GeoPoint, threats: &[Threat], margin_km: f64) -> bool {
    threats.iter().any(|threat| threat.blocks(point, margin_km))
}

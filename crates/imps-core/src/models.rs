//! Core data models for the mission planner.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

/// Ordered route from the requested start to the requested end.
/// Empty when no route could be planned.
pub type GeoPath = Vec<GeoPoint>;

/// A discrete search cell. `x` follows longitude, `y` follows latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: usize,
    pub y: usize,
}

impl GridCell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Neighbour reached by a signed step, if it stays inside a `grid_size` square.
    pub fn offset(self, dx: i64, dy: i64, grid_size: usize) -> Option<GridCell> {
        let x = self.x as i64 + dx;
        let y = self.y as i64 + dy;
        let limit = grid_size as i64;
        if x < 0 || y < 0 || x >= limit || y >= limit {
            return None;
        }
        Some(GridCell::new(x as usize, y as usize))
    }
}

/// Rectangular planning area. Fixed for the lifetime of a planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapBounds {
    /// Inclusive containment test.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        Self {
            min_lat: 33.0,
            max_lat: 43.0,
            min_lon: 124.0,
            max_lon: 132.0,
        }
    }
}

/// Exclusion zone the route must keep clear of.
///
/// Serialized with a `type` tag so each kind carries only its own fields:
/// `{"type": "SAM", "lat": .., "lon": .., "radius_km": ..}` or
/// `{"type": "NFZ", "lat_min": .., "lat_max": .., "lon_min": .., "lon_max": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Threat {
    /// Point-centred zone (surface-to-air site).
    #[serde(rename = "SAM")]
    Circular { lat: f64, lon: f64, radius_km: f64 },
    /// Axis-aligned lat/lon box (no-fly zone).
    #[serde(rename = "NFZ")]
    Rectangular {
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    },
}

impl Threat {
    pub fn circular(center: GeoPoint, radius_km: f64) -> Self {
        Threat::Circular {
            lat: center.lat,
            lon: center.lon,
            radius_km,
        }
    }

    pub fn rectangular(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Threat::Rectangular {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Short kind label used in listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Threat::Circular { .. } => "SAM",
            Threat::Rectangular { .. } => "NFZ",
        }
    }
}

/// A threat as tracked by the operator, identified by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedThreat {
    pub name: String,
    #[serde(flatten)]
    pub threat: Threat,
}

impl NamedThreat {
    pub fn new(name: impl Into<String>, threat: Threat) -> Self {
        Self {
            name: name.into(),
            threat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_threat_serializes_flat_with_kind_tag() {
        let sam = NamedThreat::new("Default SAM", Threat::circular(GeoPoint::new(37.2, 127.8), 20.0));
        let value = serde_json::to_value(&sam).unwrap();
        assert_eq!(value["name"], "Default SAM");
        assert_eq!(value["type"], "SAM");
        assert_eq!(value["radius_km"], 20.0);
        assert!(value.get("lat_min").is_none());

        let nfz: NamedThreat = serde_json::from_value(serde_json::json!({
            "name": "Box",
            "type": "NFZ",
            "lat_min": 37.5,
            "lat_max": 37.8,
            "lon_min": 127.5,
            "lon_max": 127.8
        }))
        .unwrap();
        assert_eq!(nfz.threat.kind(), "NFZ");
    }

    #[test]
    fn cell_offset_rejects_cells_outside_grid() {
        let corner = GridCell::new(0, 0);
        assert_eq!(corner.offset(-1, 0, 10), None);
        assert_eq!(corner.offset(1, 1, 10), Some(GridCell::new(1, 1)));
        assert_eq!(GridCell::new(9, 9).offset(1, 0, 10), None);
    }

    #[test]
    fn bounds_contain_edges() {
        let bounds = MapBounds::default();
        assert!(bounds.contains(33.0, 132.0));
        assert!(!bounds.contains(50.0, 128.0));
        assert!(!bounds.contains(38.0, 123.9));
    }
}

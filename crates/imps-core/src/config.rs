//! Planner configuration and reference data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{GeoPoint, MapBounds};

pub const DEFAULT_GRID_SIZE: usize = 120;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.0002;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid size must be at least 2 cells, got {0}")]
    GridTooSmall(usize),
    #[error("map bounds are empty or inverted: lat [{min_lat}, {max_lat}], lon [{min_lon}, {max_lon}]")]
    InvalidBounds {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
    #[error("smoothing factor must be finite and non-negative, got {0}")]
    InvalidSmoothingFactor(f64),
    #[error("expansion budget must be positive")]
    ZeroExpansionBudget,
}

/// Everything fixed at planner construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Cells per side of the square search grid.
    pub grid_size: usize,
    pub bounds: MapBounds,
    /// Upper bound on the summed squared residual (deg²) of the route spline.
    pub smoothing_factor: f64,
    /// Node expansions allowed per search before it is abandoned.
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::with_grid_size(DEFAULT_GRID_SIZE)
    }
}

impl PlannerConfig {
    /// Defaults for a `grid_size` x `grid_size` grid, with a budget covering every cell.
    pub fn with_grid_size(grid_size: usize) -> Self {
        Self {
            grid_size,
            bounds: MapBounds::default(),
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            max_expansions: grid_size.saturating_mul(grid_size),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        let b = &self.bounds;
        let finite = [b.min_lat, b.max_lat, b.min_lon, b.max_lon]
            .iter()
            .all(|v| v.is_finite());
        if !finite || b.min_lat >= b.max_lat || b.min_lon >= b.max_lon {
            return Err(ConfigError::InvalidBounds {
                min_lat: b.min_lat,
                max_lat: b.max_lat,
                min_lon: b.min_lon,
                max_lon: b.max_lon,
            });
        }
        if !self.smoothing_factor.is_finite() || self.smoothing_factor < 0.0 {
            return Err(ConfigError::InvalidSmoothingFactor(self.smoothing_factor));
        }
        if self.max_expansions == 0 {
            return Err(ConfigError::ZeroExpansionBudget);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub name: String,
    pub position: GeoPoint,
}

/// Named departure bases and waypoints, kept in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportCatalog {
    airports: Vec<Airport>,
}

impl AirportCatalog {
    pub fn new(airports: Vec<Airport>) -> Self {
        Self { airports }
    }

    pub fn get(&self, name: &str) -> Option<GeoPoint> {
        self.airports
            .iter()
            .find(|airport| airport.name == name)
            .map(|airport| airport.position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

impl Default for AirportCatalog {
    fn default() -> Self {
        let table: [(&str, f64, f64); 12] = [
            ("서산(Seosan)", 36.776, 126.493),
            ("오산(Osan)", 37.090, 127.030),
            ("원주(Wonju)", 37.342, 127.920),
            ("강릉(Gangneung)", 37.751, 128.876),
            ("충주(Chungju)", 36.991, 127.926),
            ("청주(Cheongju)", 36.642, 127.489),
            ("대구(Daegu)", 35.871, 128.601),
            ("광주(Gwangju)", 35.159, 126.852),
            ("부산(Busan)", 35.179, 129.075),
            ("수원(Suwon)", 37.240, 127.000),
            ("사천(Sacheon)", 35.088, 128.070),
            ("서울(Seoul)", 37.463, 126.924),
        ];
        Self::new(
            table
                .iter()
                .map(|(name, lat, lon)| Airport {
                    name: (*name).to_string(),
                    position: GeoPoint::new(*lat, *lon),
                })
                .collect(),
        )
    }
}

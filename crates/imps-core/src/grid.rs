//! Lat/lon to grid-cell discretization.

use crate::models::{GeoPoint, GridCell, MapBounds};

/// Affine mapping between the map bounds and a square grid.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    bounds: MapBounds,
    grid_size: usize,
}

impl CoordinateMapper {
    /// Callers validate `grid_size` first (see `PlannerConfig::validate`).
    pub(crate) fn new(bounds: MapBounds, grid_size: usize) -> Self {
        Self { bounds, grid_size }
    }

    pub fn bounds(&self) -> &MapBounds {
        &self.bounds
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Degrees of latitude covered by one cell.
    pub fn cell_lat(&self) -> f64 {
        self.bounds.lat_span() / self.grid_size as f64
    }

    /// Degrees of longitude covered by one cell.
    pub fn cell_lon(&self) -> f64 {
        self.bounds.lon_span() / self.grid_size as f64
    }

    /// Cell containing the point, or `None` when the point lies outside the bounds.
    ///
    /// Indices are clamped to the grid so a point on the upper edge lands in the
    /// last row/column.
    pub fn to_grid(&self, lat: f64, lon: f64) -> Option<GridCell> {
        if !self.bounds.contains(lat, lon) {
            return None;
        }
        let max_index = self.grid_size.saturating_sub(1) as f64;
        let y = ((lat - self.bounds.min_lat) / self.cell_lat()).trunc();
        let x = ((lon - self.bounds.min_lon) / self.cell_lon()).trunc();
        Some(GridCell::new(
            x.clamp(0.0, max_index) as usize,
            y.clamp(0.0, max_index) as usize,
        ))
    }

    /// Lower-left corner of a cell (not its centre).
    pub fn to_latlon(&self, cell: GridCell) -> GeoPoint {
        GeoPoint::new(
            self.bounds.min_lat + cell.y as f64 * self.cell_lat(),
            self.bounds.min_lon + cell.x as f64 * self.cell_lon(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(MapBounds::default(), 120)
    }

    #[test]
    fn round_trip_stays_within_one_cell() {
        let mapper = mapper();
        let samples = [
            (33.0, 124.0),
            (35.179, 129.075),
            (37.2, 127.8),
            (39.0, 125.7),
            (42.999, 131.999),
            (43.0, 132.0),
        ];
        for (lat, lon) in samples {
            let cell = mapper.to_grid(lat, lon).expect("in bounds");
            let back = mapper.to_latlon(cell);
            assert!((back.lat - lat).abs() <= mapper.cell_lat() + 1e-9, "lat {lat}");
            assert!((back.lon - lon).abs() <= mapper.cell_lon() + 1e-9, "lon {lon}");
            assert!(back.lat <= lat + 1e-9 && back.lon <= lon + 1e-9);
        }
    }

    #[test]
    fn upper_edge_is_clamped_into_last_cell() {
        let mapper = mapper();
        assert_eq!(mapper.to_grid(43.0, 132.0), Some(GridCell::new(119, 119)));
        assert_eq!(mapper.to_grid(33.0, 124.0), Some(GridCell::new(0, 0)));
    }

    #[test]
    fn empty_grid_does_not_underflow() {
        let mapper = CoordinateMapper::new(MapBounds::default(), 0);
        assert_eq!(mapper.to_grid(38.0, 128.0), Some(GridCell::new(0, 0)));
    }

    #[test]
    fn outside_bounds_has_no_cell() {
        let mapper = mapper();
        assert_eq!(mapper.to_grid(50.0, 128.0), None);
        assert_eq!(mapper.to_grid(38.0, 132.01), None);
        assert_eq!(mapper.to_grid(32.99, 128.0), None);
    }

    #[test]
    fn to_latlon_returns_lower_left_corner() {
        let mapper = mapper();
        let corner = mapper.to_latlon(GridCell::new(60, 30));
        assert!((corner.lat - 35.5).abs() < 1e-9);
        assert!((corner.lon - 128.0).abs() < 1e-9);
    }
}

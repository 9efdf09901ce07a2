//! Grid A* route engine.
//!
//! Searches an 8-connected grid laid over the map bounds, treating every cell whose
//! lower-left corner is occupied by a threat (at the requested margin) as blocked.
//! Each call owns its open set and score maps; the planner itself is immutable and
//! can be shared across threads.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, PlannerConfig};
use crate::grid::CoordinateMapper;
use crate::models::{GeoPath, GeoPoint, GridCell, Threat};
use crate::smoothing::PathSmoother;
use crate::threat::is_blocked;

/// Axis moves first, then diagonals.
const DIRECTIONS: [(i64, i64); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Why a search produced no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailure {
    /// Start or end lies outside the map bounds.
    OutOfBounds,
    /// The frontier was exhausted, or the goal cell itself is occupied.
    Unreachable,
    /// The expansion budget ran out before the goal was reached.
    BudgetExceeded,
}

impl std::fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SearchFailure::OutOfBounds => "endpoint outside map bounds",
            SearchFailure::Unreachable => "no feasible route",
            SearchFailure::BudgetExceeded => "search budget exceeded",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Route points; empty on failure.
    pub path: GeoPath,
    /// Cells visited by the route, start to goal.
    pub cells: Vec<GridCell>,
    /// Accumulated move cost in cell units.
    pub cost: f64,
    pub nodes_expanded: usize,
    pub failure: Option<SearchFailure>,
}

impl SearchOutcome {
    fn failed(reason: SearchFailure, nodes_expanded: usize) -> Self {
        Self {
            path: Vec::new(),
            cells: Vec::new(),
            cost: f64::INFINITY,
            nodes_expanded,
            failure: Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cell: GridCell,
    g_score: FloatOrd,
    f_score: FloatOrd,
}

// Ascending order = pop order under `Reverse`: lowest f, then highest g, then (x, y).
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| other.g_score.cmp(&self.g_score))
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Threat-avoiding route planner over a fixed grid.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    config: PlannerConfig,
    mapper: CoordinateMapper,
    smoother: PathSmoother,
}

impl RoutePlanner {
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mapper: CoordinateMapper::new(config.bounds, config.grid_size),
            smoother: PathSmoother::new(config.smoothing_factor),
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Route from `start` to `end`, or an empty path when none was found.
    pub fn find_path(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        threats: &[Threat],
        margin_km: f64,
    ) -> GeoPath {
        self.search(start, end, threats, margin_km).path
    }

    /// Spline-smoothed copy of `path`; falls back to the input on failure.
    pub fn smooth_path(&self, path: &[GeoPoint]) -> GeoPath {
        self.smoother.smooth(path)
    }

    /// Full search result, keeping the failure reason and search statistics.
    pub fn search(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        threats: &[Threat],
        margin_km: f64,
    ) -> SearchOutcome {
        let (Some(start_cell), Some(goal_cell)) = (
            self.mapper.to_grid(start.lat, start.lon),
            self.mapper.to_grid(end.lat, end.lon),
        ) else {
            debug!(
                "route endpoint outside bounds: start=({:.4},{:.4}) end=({:.4},{:.4})",
                start.lat, start.lon, end.lat, end.lon
            );
            return SearchOutcome::failed(SearchFailure::OutOfBounds, 0);
        };

        // The goal can only be entered through a neighbour expansion, which never
        // admits a blocked cell.
        if is_blocked(self.mapper.to_latlon(goal_cell), threats, margin_km) {
            debug!(
                "goal cell ({},{}) occupied at margin {:.1} km",
                goal_cell.x, goal_cell.y, margin_km
            );
            return SearchOutcome::failed(SearchFailure::Unreachable, 0);
        }

        let grid_size = self.mapper.grid_size();
        let heuristic = |cell: GridCell| {
            let dx = cell.x as f64 - goal_cell.x as f64;
            let dy = cell.y as f64 - goal_cell.y as f64;
            (dx * dx + dy * dy).sqrt()
        };

        let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
        let mut closed_set: HashSet<GridCell> = HashSet::new();
        let mut g_score: HashMap<GridCell, f64> = HashMap::new();
        let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();

        g_score.insert(start_cell, 0.0);
        open_set.push(Reverse(OpenNode {
            cell: start_cell,
            g_score: FloatOrd(0.0),
            f_score: FloatOrd(heuristic(start_cell)),
        }));

        let mut nodes_expanded = 0usize;

        while let Some(Reverse(current)) = open_set.pop() {
            if closed_set.contains(&current.cell) {
                continue;
            }
            let best_g = g_score
                .get(&current.cell)
                .copied()
                .unwrap_or(f64::INFINITY);
            if current.g_score.0 > best_g + 1e-9 {
                continue;
            }

            nodes_expanded += 1;
            if current.cell == goal_cell {
                let (path, cells) = self.reconstruct(&came_from, start, goal_cell);
                debug!(
                    "route found: {} cells, cost {:.2}, {} nodes expanded",
                    cells.len(),
                    best_g,
                    nodes_expanded
                );
                return SearchOutcome {
                    path,
                    cells,
                    cost: best_g,
                    nodes_expanded,
                    failure: None,
                };
            }

            if nodes_expanded > self.config.max_expansions {
                debug!(
                    "route search abandoned after {} expansions",
                    self.config.max_expansions
                );
                return SearchOutcome::failed(SearchFailure::BudgetExceeded, nodes_expanded);
            }

            closed_set.insert(current.cell);

            for (dx, dy) in DIRECTIONS {
                let Some(neighbor) = current.cell.offset(dx, dy, grid_size) else {
                    continue;
                };
                if closed_set.contains(&neighbor) {
                    continue;
                }
                if is_blocked(self.mapper.to_latlon(neighbor), threats, margin_km) {
                    continue;
                }

                let move_cost = if dx != 0 && dy != 0 {
                    std::f64::consts::SQRT_2
                } else {
                    1.0
                };
                let tentative_g = best_g + move_cost;
                if tentative_g < g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                    came_from.insert(neighbor, current.cell);
                    g_score.insert(neighbor, tentative_g);
                    open_set.push(Reverse(OpenNode {
                        cell: neighbor,
                        g_score: FloatOrd(tentative_g),
                        f_score: FloatOrd(tentative_g + heuristic(neighbor)),
                    }));
                }
            }
        }

        debug!("route search failed: {} nodes explored", nodes_expanded);
        SearchOutcome::failed(SearchFailure::Unreachable, nodes_expanded)
    }

    /// Walk predecessor links back from the goal. The first point is the caller's
    /// exact start rather than its cell corner.
    fn reconstruct(
        &self,
        came_from: &HashMap<GridCell, GridCell>,
        start: GeoPoint,
        goal: GridCell,
    ) -> (GeoPath, Vec<GridCell>) {
        let mut cells = vec![goal];
        let mut current = goal;
        while let Some(&prev) = came_from.get(&current) {
            cells.push(prev);
            current = prev;
        }
        cells.reverse();

        let mut path: GeoPath = Vec::with_capacity(cells.len());
        path.push(start);
        path.extend(cells.iter().skip(1).map(|cell| self.mapper.to_latlon(*cell)));
        (path, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapBounds;

    fn planner(grid_size: usize) -> RoutePlanner {
        RoutePlanner::new(PlannerConfig::with_grid_size(grid_size)).unwrap()
    }

    fn octile(a: GridCell, b: GridCell) -> f64 {
        let dx = (a.x as f64 - b.x as f64).abs();
        let dy = (a.y as f64 - b.y as f64).abs();
        dx.max(dy) - dx.min(dy) + std::f64::consts::SQRT_2 * dx.min(dy)
    }

    #[test]
    fn open_nodes_pop_lowest_f_then_deepest_then_lexicographic() {
        let mut heap = BinaryHeap::new();
        let node = |x, y, g: f64, f: f64| {
            Reverse(OpenNode {
                cell: GridCell::new(x, y),
                g_score: FloatOrd(g),
                f_score: FloatOrd(f),
            })
        };
        heap.push(node(5, 5, 1.0, 10.0));
        heap.push(node(2, 2, 3.0, 10.0));
        heap.push(node(1, 9, 3.0, 10.0));
        heap.push(node(0, 0, 0.0, 12.0));

        let order: Vec<GridCell> = std::iter::from_fn(|| heap.pop().map(|Reverse(n)| n.cell)).collect();
        assert_eq!(
            order,
            vec![
                GridCell::new(1, 9),
                GridCell::new(2, 2),
                GridCell::new(5, 5),
                GridCell::new(0, 0)
            ]
        );
    }

    #[test]
    fn threat_free_cost_matches_octile_distance() {
        let planner = planner(40);
        let cases = [
            (GeoPoint::new(33.5, 124.5), GeoPoint::new(42.0, 131.0)),
            (GeoPoint::new(35.179, 129.075), GeoPoint::new(39.0, 125.7)),
            (GeoPoint::new(38.0, 124.1), GeoPoint::new(38.0, 131.9)),
        ];
        for (start, end) in cases {
            let outcome = planner.search(start, end, &[], 0.0);
            assert!(outcome.is_success());
            let a = planner.mapper().to_grid(start.lat, start.lon).unwrap();
            let b = planner.mapper().to_grid(end.lat, end.lon).unwrap();
            assert!((outcome.cost - octile(a, b)).abs() < 1e-9);
            assert_eq!(outcome.path.len(), outcome.cells.len());
        }
    }

    #[test]
    fn path_starts_at_exact_start_and_ends_at_goal_corner() {
        let planner = planner(120);
        let start = GeoPoint::new(35.179, 129.075);
        let end = GeoPoint::new(39.0, 125.7);
        let path = planner.find_path(start, end, &[], 5.0);
        assert_eq!(path.first(), Some(&start));
        let goal = planner.mapper().to_grid(end.lat, end.lon).unwrap();
        assert_eq!(path.last(), Some(&planner.mapper().to_latlon(goal)));
    }

    #[test]
    fn same_cell_start_and_end_yields_single_point() {
        let planner = planner(120);
        let start = GeoPoint::new(36.01, 126.01);
        let outcome = planner.search(start, GeoPoint::new(36.02, 126.02), &[], 0.0);
        assert_eq!(outcome.path, vec![start]);
        assert_eq!(outcome.cost, 0.0);
    }

    #[test]
    fn route_avoids_inflated_threats() {
        let planner = planner(120);
        let threats = [
            Threat::circular(GeoPoint::new(37.2, 127.8), 20.0),
            Threat::rectangular(37.5, 37.8, 126.5, 127.2),
        ];
        let outcome = planner.search(
            GeoPoint::new(35.179, 129.075),
            GeoPoint::new(39.0, 125.7),
            &threats,
            5.0,
        );
        assert!(outcome.is_success());
        for point in outcome.path.iter().skip(1) {
            assert!(!is_blocked(*point, &threats, 5.0));
        }
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let planner = planner(60);
        // Ring of boxes around the goal leaves no gap at a 0 km margin.
        let threats = [
            Threat::rectangular(37.0, 37.3, 127.0, 128.0),
            Threat::rectangular(38.7, 39.0, 127.0, 128.0),
            Threat::rectangular(37.0, 39.0, 127.0, 127.3),
            Threat::rectangular(37.0, 39.0, 127.7, 128.0),
        ];
        let outcome = planner.search(
            GeoPoint::new(34.0, 125.0),
            GeoPoint::new(38.0, 127.5),
            &threats,
            0.0,
        );
        assert_eq!(outcome.failure, Some(SearchFailure::Unreachable));
        assert!(outcome.path.is_empty());
        assert!(outcome.nodes_expanded > 0);
    }

    #[test]
    fn budget_exhaustion_is_reported_separately() {
        let planner = RoutePlanner::new(PlannerConfig {
            max_expansions: 10,
            ..PlannerConfig::default()
        })
        .unwrap();
        let outcome = planner.search(
            GeoPoint::new(33.5, 124.5),
            GeoPoint::new(42.5, 131.5),
            &[],
            0.0,
        );
        assert_eq!(outcome.failure, Some(SearchFailure::BudgetExceeded));
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn goal_reached_on_last_allowed_expansion_is_a_success() {
        let start = GeoPoint::new(35.179, 129.075);
        let end = GeoPoint::new(39.0, 125.7);
        let unlimited = planner(120).search(start, end, &[], 0.0);
        assert!(unlimited.is_success());

        let tight = RoutePlanner::new(PlannerConfig {
            max_expansions: unlimited.nodes_expanded - 1,
            ..PlannerConfig::default()
        })
        .unwrap()
        .search(start, end, &[], 0.0);
        assert_eq!(tight.failure, None);
        assert_eq!(tight.nodes_expanded, unlimited.nodes_expanded);
        assert_eq!(tight.path, unlimited.path);
    }

    #[test]
    fn fine_grid_budget_covers_every_cell() {
        let planner = planner(400);
        let threats = [
            Threat::circular(GeoPoint::new(37.2, 127.8), 60.0),
            Threat::rectangular(36.0, 40.5, 126.2, 126.6),
        ];
        let outcome = planner.search(
            GeoPoint::new(35.179, 129.075),
            GeoPoint::new(39.0, 125.7),
            &threats,
            5.0,
        );
        assert_eq!(outcome.failure, None);
        assert!(outcome.nodes_expanded > 120 * 120);
        assert!(!outcome.path.is_empty());
    }

    #[test]
    fn larger_margin_never_shortens_route() {
        let planner = planner(80);
        let threats = [Threat::circular(GeoPoint::new(37.2, 127.8), 20.0)];
        let start = GeoPoint::new(35.179, 129.075);
        let end = GeoPoint::new(39.0, 125.7);
        let mut previous = 0.0;
        for margin in [0.0, 5.0, 15.0, 30.0] {
            let outcome = planner.search(start, end, &threats, margin);
            if !outcome.is_success() {
                break;
            }
            assert!(outcome.cost + 1e-9 >= previous, "margin {margin}");
            previous = outcome.cost;
        }
    }

    #[test]
    fn repeated_searches_are_identical() {
        let planner = planner(120);
        let threats = [Threat::circular(GeoPoint::new(37.2, 127.8), 20.0)];
        let a = planner.find_path(GeoPoint::new(35.179, 129.075), GeoPoint::new(39.0, 125.7), &threats, 5.0);
        let b = planner.find_path(GeoPoint::new(35.179, 129.075), GeoPoint::new(39.0, 125.7), &threats, 5.0);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PlannerConfig {
            bounds: MapBounds {
                min_lat: 10.0,
                max_lat: 5.0,
                min_lon: 0.0,
                max_lon: 1.0,
            },
            ..PlannerConfig::default()
        };
        assert!(RoutePlanner::new(config).is_err());
    }
}

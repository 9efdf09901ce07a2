//! IMPS core - threat-avoiding route planning over a lat/lon grid.

pub mod commands;
pub mod config;
pub mod grid;
pub mod mission;
pub mod models;
pub mod route_engine;
pub mod scenario;
pub mod smoothing;
pub mod spatial;
pub mod steer;
pub mod threat;

pub use commands::{describe_state, CommandAction, CommandError, TacticalCommand, UpdateParams};
pub use config::{Airport, AirportCatalog, ConfigError, PlannerConfig};
pub use grid::CoordinateMapper;
pub use mission::{ChatMessage, MissionError, MissionParams, MissionPlan, MissionState, RouteLeg};
pub use models::{GeoPath, GeoPoint, GridCell, MapBounds, NamedThreat, Threat};
pub use route_engine::{RoutePlanner, SearchFailure, SearchOutcome};
pub use scenario::{Scenario, ScenarioError};
pub use smoothing::PathSmoother;
pub use spatial::{flat_earth_distance_km, haversine_distance_km, path_length_km};
pub use steer::{extract_steer_points, mission_steer_points, to_csv, LegKind, SteerPoint};
pub use threat::is_blocked;

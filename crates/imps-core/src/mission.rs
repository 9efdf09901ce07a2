//! Mission state and leg composition.
//!
//! A mission is an ingress route from the departure base to the target (optionally
//! through a named waypoint) and, when RTB is set, an egress route back. Each leg
//! is an independent search followed by smoothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AirportCatalog;
use crate::models::{GeoPath, GeoPoint, NamedThreat, Threat};
use crate::route_engine::{RoutePlanner, SearchFailure, SearchOutcome};
use crate::spatial::path_length_km;
use crate::steer::{mission_steer_points, SteerPoint};

pub const DEFAULT_SAFETY_MARGIN_KM: f64 = 5.0;
pub const DEFAULT_STPT_GAP: usize = 10;
pub const MIN_MARGIN_KM: f64 = 0.0;
pub const MAX_MARGIN_KM: f64 = 50.0;
pub const MIN_STPT_GAP: usize = 1;
pub const MAX_STPT_GAP: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum MissionError {
    #[error("unknown departure base '{0}'")]
    UnknownAirport(String),
}

/// Operator-editable mission parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionParams {
    /// Departure base, a key of the airport catalog.
    pub start: String,
    pub target_lat: f64,
    pub target_lon: f64,
    pub target_name: String,
    /// Plan an egress leg back to the departure base.
    pub rtb: bool,
    /// Threat clearance in km.
    pub margin: f64,
    /// Optional intermediate airport for the ingress leg.
    #[serde(default)]
    pub waypoint: Option<String>,
    /// Stride used when extracting steer points.
    pub stpt_gap: usize,
}

impl Default for MissionParams {
    fn default() -> Self {
        Self {
            start: "부산(Busan)".to_string(),
            target_lat: 39.0,
            target_lon: 125.7,
            target_name: "PY-Core".to_string(),
            rtb: true,
            margin: DEFAULT_SAFETY_MARGIN_KM,
            waypoint: None,
            stpt_gap: DEFAULT_STPT_GAP,
        }
    }
}

impl MissionParams {
    pub fn target(&self) -> GeoPoint {
        GeoPoint::new(self.target_lat, self.target_lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionState {
    pub params: MissionParams,
    pub threats: Vec<NamedThreat>,
    pub chat_history: Vec<ChatMessage>,
}

impl Default for MissionState {
    fn default() -> Self {
        Self {
            params: MissionParams::default(),
            threats: vec![NamedThreat::new(
                "Default SAM",
                Threat::circular(GeoPoint::new(37.2, 127.8), 20.0),
            )],
            chat_history: vec![ChatMessage {
                role: "assistant".to_string(),
                content: "Standing by for orders.".to_string(),
            }],
        }
    }
}

/// One planned leg: the raw grid route and its smoothed rendition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub raw: GeoPath,
    pub smoothed: GeoPath,
    pub length_km: f64,
    pub nodes_expanded: usize,
    pub failure: Option<SearchFailure>,
}

impl RouteLeg {
    fn from_search(planner: &RoutePlanner, outcome: SearchOutcome) -> Self {
        let smoothed = if outcome.path.is_empty() {
            Vec::new()
        } else {
            planner.smooth_path(&outcome.path)
        };
        Self {
            length_km: path_length_km(&smoothed),
            raw: outcome.path,
            smoothed,
            nodes_expanded: outcome.nodes_expanded,
            failure: outcome.failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && !self.raw.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionPlan {
    pub ingress: RouteLeg,
    pub egress: Option<RouteLeg>,
    pub steer_points: Vec<SteerPoint>,
}

impl MissionPlan {
    pub fn has_route(&self) -> bool {
        self.ingress.is_success()
    }
}

impl MissionState {
    pub fn add_threat(&mut self, threat: NamedThreat) {
        info!("threat '{}' ({}) added", threat.name, threat.threat.kind());
        self.threats.push(threat);
    }

    /// Remove every threat with this name. Returns whether anything was removed.
    pub fn remove_threat(&mut self, name: &str) -> bool {
        let before = self.threats.len();
        self.threats.retain(|t| t.name != name);
        let removed = self.threats.len() != before;
        if removed {
            info!("threat '{}' removed", name);
        }
        removed
    }

    pub fn add_chat_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.chat_history.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
    }

    pub fn threat_zones(&self) -> Vec<Threat> {
        self.threats.iter().map(|t| t.threat.clone()).collect()
    }

    /// Plan ingress (and egress when RTB is set) for the current parameters.
    pub fn plan(
        &self,
        planner: &RoutePlanner,
        airports: &AirportCatalog,
    ) -> Result<MissionPlan, MissionError> {
        let params = &self.params;
        let start = airports
            .get(&params.start)
            .ok_or_else(|| MissionError::UnknownAirport(params.start.clone()))?;
        let target = params.target();
        let threats = self.threat_zones();

        let via = params.waypoint.as_deref().and_then(|name| {
            let point = airports.get(name);
            if point.is_none() {
                warn!("ignoring unknown waypoint '{}'", name);
            }
            point
        });

        let ingress_search = match via {
            Some(waypoint) => {
                let first = planner.search(start, waypoint, &threats, params.margin);
                let second = planner.search(waypoint, target, &threats, params.margin);
                join_legs(first, second)
            }
            None => planner.search(start, target, &threats, params.margin),
        };
        let ingress = RouteLeg::from_search(planner, ingress_search);
        if let Some(reason) = ingress.failure {
            warn!("ingress to '{}' failed: {}", params.target_name, reason);
        }

        let egress = params.rtb.then(|| {
            let leg = RouteLeg::from_search(
                planner,
                planner.search(target, start, &threats, params.margin),
            );
            if let Some(reason) = leg.failure {
                warn!("egress to '{}' failed: {}", params.start, reason);
            }
            leg
        });

        let egress_path = egress.as_ref().map(|leg| leg.smoothed.as_slice()).unwrap_or(&[]);
        let steer_points = mission_steer_points(&ingress.smoothed, egress_path, params.stpt_gap);

        Ok(MissionPlan {
            ingress,
            egress,
            steer_points,
        })
    }
}

/// Concatenate two searches, dropping the duplicated junction point.
/// Fails with the first failure if either leg failed.
fn join_legs(first: SearchOutcome, second: SearchOutcome) -> SearchOutcome {
    let nodes_expanded = first.nodes_expanded + second.nodes_expanded;
    let failure = first.failure.or(second.failure);
    if failure.is_some() || first.path.is_empty() || second.path.is_empty() {
        return SearchOutcome {
            path: Vec::new(),
            cells: Vec::new(),
            cost: f64::INFINITY,
            nodes_expanded,
            failure: Some(failure.unwrap_or(SearchFailure::Unreachable)),
        };
    }

    let mut path = first.path;
    path.extend(second.path.into_iter().skip(1));
    let mut cells = first.cells;
    cells.extend(second.cells.into_iter().skip(1));
    SearchOutcome {
        path,
        cells,
        cost: first.cost + second.cost,
        nodes_expanded,
        failure: None,
    }
}

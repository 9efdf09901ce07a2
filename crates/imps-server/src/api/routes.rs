//! REST API routes.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::{mission, scenarios, threats};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        // Mission parameters and planning
        .route("/v1/mission", get(mission::get_mission))
        .route("/v1/mission/params", put(mission::update_params))
        .route("/v1/airports", get(mission::list_airports))
        .route("/v1/plan", post(mission::plan_mission))
        .route("/v1/steer-points.csv", get(mission::steer_points_csv))
        .route("/v1/commands", post(mission::apply_command))
        // Threat zones
        .route("/v1/threats", get(threats::list_threats))
        .route("/v1/threats", post(threats::create_threat))
        .route("/v1/threats/:name", delete(threats::delete_threat))
        // Scenario snapshots
        .route("/v1/scenarios/:name", post(scenarios::save_scenario))
        .route("/v1/scenarios/:name", get(scenarios::load_scenario))
}

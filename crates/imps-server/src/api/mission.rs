//! Mission parameter, planning and command endpoints.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::ApiError;
use crate::state::AppState;
use imps_core::commands::{describe_state, TacticalCommand};
use imps_core::mission::{MAX_MARGIN_KM, MAX_STPT_GAP, MIN_MARGIN_KM, MIN_STPT_GAP};
use imps_core::{steer, AirportCatalog, MissionParams, MissionPlan, MissionState};

#[derive(Debug, Serialize)]
pub struct MissionView {
    #[serde(flatten)]
    pub mission: MissionState,
    /// Context line for the command parser prompt.
    pub state_summary: String,
}

pub async fn get_mission(State(state): State<Arc<AppState>>) -> Json<MissionView> {
    let mission = state.mission_snapshot();
    Json(MissionView {
        state_summary: describe_state(&mission.params),
        mission,
    })
}

pub async fn list_airports(State(state): State<Arc<AppState>>) -> Json<AirportCatalog> {
    Json(state.airports().as_ref().clone())
}

/// Replace the mission parameters wholesale.
pub async fn update_params(
    State(state): State<Arc<AppState>>,
    Json(params): Json<MissionParams>,
) -> Result<Json<MissionParams>, ApiError> {
    validate_params(&params, &state.airports())?;
    state.update_mission(|mission| mission.params = params.clone());
    tracing::info!(
        "Mission params replaced: start={} target={} margin={} rtb={}",
        params.start,
        params.target_name,
        params.margin,
        params.rtb
    );
    Ok(Json(params))
}

/// Plan the current mission.
pub async fn plan_mission(State(state): State<Arc<AppState>>) -> Result<Json<MissionPlan>, ApiError> {
    Ok(Json(plan_current(&state).await?))
}

/// Steer points of a fresh plan of the current mission as CSV.
pub async fn steer_points_csv(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = plan_current(&state).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        steer::to_csv(&plan.steer_points),
    ))
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub command: TacticalCommand,
    pub changed: bool,
    pub params: MissionParams,
}

/// Apply a parser-produced command. Malformed payloads come back as a `CHAT`
/// explaining the parse failure.
pub async fn apply_command(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Json<CommandResponse> {
    let command = TacticalCommand::parse_or_chat(&body).validated(&state.airports());

    let (changed, params) = state.update_mission(|mission| {
        let changed = command.apply_to(&mut mission.params);
        if !command.response_text.is_empty() {
            mission.add_chat_message("assistant", command.response_text.clone());
        }
        (changed, mission.params.clone())
    });

    Json(CommandResponse {
        command,
        changed,
        params,
    })
}

/// Planning is CPU-bound; run it on the blocking pool against a snapshot.
async fn plan_current(state: &AppState) -> Result<MissionPlan, ApiError> {
    let mission = state.mission_snapshot();
    let planner = state.planner();
    let airports = state.airports();

    let plan = tokio::task::spawn_blocking(move || mission.plan(&planner, &airports)).await??;
    if !plan.has_route() {
        tracing::warn!("No feasible ingress route for current mission");
    }
    Ok(plan)
}

fn validate_params(params: &MissionParams, airports: &AirportCatalog) -> Result<(), ApiError> {
    if !airports.contains(&params.start) {
        return Err(ApiError::BadRequest(format!(
            "Unknown departure base '{}'",
            params.start
        )));
    }
    if let Some(waypoint) = params.waypoint.as_deref() {
        if !airports.contains(waypoint) {
            return Err(ApiError::BadRequest(format!("Unknown waypoint '{}'", waypoint)));
        }
    }
    if !(params.target_lat.is_finite() && params.target_lon.is_finite()) {
        return Err(ApiError::BadRequest("Target position must be finite".to_string()));
    }
    if !(MIN_MARGIN_KM..=MAX_MARGIN_KM).contains(&params.margin) {
        return Err(ApiError::BadRequest(format!(
            "Safety margin must be within [{}, {}] km",
            MIN_MARGIN_KM, MAX_MARGIN_KM
        )));
    }
    if !(MIN_STPT_GAP..=MAX_STPT_GAP).contains(&params.stpt_gap) {
        return Err(ApiError::BadRequest(format!(
            "Steer point gap must be within [{}, {}]",
            MIN_STPT_GAP, MAX_STPT_GAP
        )));
    }
    Ok(())
}

//! Scenario save/load endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::api::ApiError;
use crate::state::AppState;
use imps_core::{scenario, MissionState};

#[derive(Debug, Serialize)]
pub struct SavedScenario {
    pub name: String,
    pub path: String,
    pub saved_at: DateTime<Utc>,
}

/// Snapshot the current mission to `<scenario_dir>/<name>`.
pub async fn save_scenario(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<SavedScenario>), ApiError> {
    let mission = state.mission_snapshot();
    let dir = state.scenario_dir().to_path_buf();
    let filename = name.clone();
    let path =
        tokio::task::spawn_blocking(move || scenario::save(&dir, &filename, &mission)).await??;
    Ok((
        StatusCode::CREATED,
        Json(SavedScenario {
            name,
            path: path.display().to_string(),
            saved_at: Utc::now(),
        }),
    ))
}

/// Replace the current mission with a saved scenario.
pub async fn load_scenario(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<MissionState>, ApiError> {
    let dir = state.scenario_dir().to_path_buf();
    let mission = tokio::task::spawn_blocking(move || scenario::load(&dir, &name)).await??;
    state.replace_mission(mission.clone());
    Ok(Json(mission))
}

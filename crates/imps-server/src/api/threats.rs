//! Threat zone endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::ApiError;
use crate::state::AppState;
use imps_core::{NamedThreat, Threat};

pub async fn list_threats(State(state): State<Arc<AppState>>) -> Json<Vec<NamedThreat>> {
    Json(state.mission_snapshot().threats)
}

/// Add a SAM or NFZ. Names need not be unique.
pub async fn create_threat(
    State(state): State<Arc<AppState>>,
    Json(threat): Json<NamedThreat>,
) -> Result<(StatusCode, Json<NamedThreat>), ApiError> {
    validate_threat(&threat)?;
    state.update_mission(|mission| mission.add_threat(threat.clone()));
    tracing::info!("Created threat '{}'", threat.name);
    Ok((StatusCode::CREATED, Json(threat)))
}

/// Delete every threat with the given name.
pub async fn delete_threat(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> StatusCode {
    if state.update_mission(|mission| mission.remove_threat(&name)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

fn validate_threat(threat: &NamedThreat) -> Result<(), ApiError> {
    if threat.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Threat name must not be empty".to_string()));
    }
    match threat.threat {
        Threat::Circular { lat, lon, radius_km } => {
            if !(lat.is_finite() && lon.is_finite() && radius_km.is_finite()) {
                return Err(ApiError::BadRequest("SAM position and radius must be finite".to_string()));
            }
            if radius_km < 0.0 {
                return Err(ApiError::BadRequest("SAM radius must be non-negative".to_string()));
            }
        }
        Threat::Rectangular { lat_min, lat_max, lon_min, lon_max } => {
            if ![lat_min, lat_max, lon_min, lon_max].iter().all(|v| v.is_finite()) {
                return Err(ApiError::BadRequest("NFZ bounds must be finite".to_string()));
            }
            if lat_min > lat_max || lon_min > lon_max {
                return Err(ApiError::BadRequest("NFZ minimum must not exceed maximum".to_string()));
            }
        }
    }
    Ok(())
}

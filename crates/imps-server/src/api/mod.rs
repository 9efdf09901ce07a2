//! API routes for the IMPS server.

pub mod mission;
mod routes;
pub mod scenarios;
pub mod threats;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use imps_core::{MissionError, ScenarioError};
use std::sync::Arc;
use thiserror::Error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

/// Handler failure rendered as `{"error": ...}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Mission(#[from] MissionError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("planning task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Mission(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Scenario(ScenarioError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            ApiError::Scenario(ScenarioError::Io(err))
                if err.kind() == std::io::ErrorKind::NotFound =>
            {
                StatusCode::NOT_FOUND
            }
            ApiError::Scenario(ScenarioError::Json(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Scenario(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

//! Scenario snapshots for reproducing planning sessions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::mission::{ChatMessage, MissionParams, MissionState};
use crate::models::NamedThreat;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario name '{0}'")]
    InvalidName(String),
    #[error("scenario I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("scenario file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub timestamp: DateTime<Utc>,
    pub params: MissionParams,
    pub threats: Vec<NamedThreat>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

impl Scenario {
    pub fn capture(state: &MissionState) -> Self {
        Self {
            timestamp: Utc::now(),
            params: state.params.clone(),
            threats: state.threats.clone(),
            chat_history: state.chat_history.clone(),
        }
    }

    pub fn into_state(self) -> MissionState {
        MissionState {
            params: self.params,
            threats: self.threats,
            chat_history: self.chat_history,
        }
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn read(path: &Path) -> Result<Self, ScenarioError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ScenarioError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Save `state` as `dir/filename`, creating `dir` when needed.
pub fn save(dir: &Path, filename: &str, state: &MissionState) -> Result<PathBuf, ScenarioError> {
    let path = scenario_path(dir, filename)?;
    Scenario::capture(state).write(&path)?;
    info!("scenario saved to {}", path.display());
    Ok(path)
}

pub fn load(dir: &Path, filename: &str) -> Result<MissionState, ScenarioError> {
    let path = scenario_path(dir, filename)?;
    let state = Scenario::read(&path)?.into_state();
    info!("scenario loaded from {}", path.display());
    Ok(state)
}

/// Scenario files live directly inside `dir`; separators and parent references
/// are rejected.
fn scenario_path(dir: &Path, filename: &str) -> Result<PathBuf, ScenarioError> {
    let invalid = filename.is_empty()
        || filename.contains(['/', '\\'])
        || filename == "."
        || filename.contains("..");
    if invalid {
        return Err(ScenarioError::InvalidName(filename.to_string()));
    }
    Ok(dir.join(filename))
}

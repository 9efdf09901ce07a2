//! In-memory mission store shared by all handlers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use imps_core::{AirportCatalog, ConfigError, MissionState, RoutePlanner};

use crate::config::Config;

/// Application state - one mission, one planner, one airport catalog.
pub struct AppState {
    planner: Arc<RoutePlanner>,
    airports: Arc<AirportCatalog>,
    mission: RwLock<MissionState>,
    scenario_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            planner: Arc::new(RoutePlanner::new(config.planner.clone())?),
            airports: Arc::new(AirportCatalog::default()),
            mission: RwLock::new(MissionState::default()),
            scenario_dir: config.scenario_dir.clone(),
        })
    }

    pub fn planner(&self) -> Arc<RoutePlanner> {
        self.planner.clone()
    }

    pub fn airports(&self) -> Arc<AirportCatalog> {
        self.airports.clone()
    }

    pub fn scenario_dir(&self) -> &Path {
        &self.scenario_dir
    }

    /// Copy of the current mission, safe to move onto a blocking task.
    pub fn mission_snapshot(&self) -> MissionState {
        self.read_mission().clone()
    }

    /// Run `f` with exclusive access to the mission.
    pub fn update_mission<R>(&self, f: impl FnOnce(&mut MissionState) -> R) -> R {
        f(&mut self.write_mission())
    }

    pub fn replace_mission(&self, mission: MissionState) {
        *self.write_mission() = mission;
    }

    // Mutations are single assignments, so a poisoned lock still holds a valid mission.
    fn read_mission(&self) -> RwLockReadGuard<'_, MissionState> {
        self.mission.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_mission(&self) -> RwLockWriteGuard<'_, MissionState> {
        self.mission.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

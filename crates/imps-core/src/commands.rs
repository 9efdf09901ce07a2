//! Structured parameter-update commands.
//!
//! A language-model front end turns free text into a JSON command of the shape
//! `{"action": "UPDATE" | "CHAT", "update_params": {..}, "response_text": ".."}`.
//! Nothing produced by that layer is trusted: ranges are clamped and waypoint names
//! are checked against the airport catalog before anything touches the mission.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AirportCatalog;
use crate::mission::{
    MissionParams, MAX_MARGIN_KM, MAX_STPT_GAP, MIN_MARGIN_KM, MIN_STPT_GAP,
};

const UNKNOWN_WAYPOINT_NOTE: &str = " (unknown airport name ignored)";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandAction {
    Update,
    Chat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateParams {
    #[serde(default)]
    pub safety_margin_km: Option<f64>,
    #[serde(default)]
    pub rtb: Option<bool>,
    #[serde(default)]
    pub waypoint_name: Option<String>,
    #[serde(default)]
    pub stpt_gap: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalCommand {
    pub action: CommandAction,
    #[serde(default)]
    pub update_params: UpdateParams,
    #[serde(default)]
    pub response_text: String,
}

impl TacticalCommand {
    pub fn chat(text: impl Into<String>) -> Self {
        Self {
            action: CommandAction::Chat,
            update_params: UpdateParams::default(),
            response_text: text.into(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse, or turn the parse failure into a `CHAT` reply explaining it.
    pub fn parse_or_chat(raw: &str) -> Self {
        Self::from_json(raw).unwrap_or_else(|err| {
            debug!("rejecting command payload: {}", err);
            Self::chat(format!("Could not parse command: {}", err))
        })
    }

    /// Clamp numeric fields into their allowed ranges and drop unknown waypoints.
    pub fn validated(mut self, airports: &AirportCatalog) -> Self {
        let params = &mut self.update_params;

        params.safety_margin_km = params
            .safety_margin_km
            .filter(|margin| margin.is_finite())
            .map(|margin| margin.clamp(MIN_MARGIN_KM, MAX_MARGIN_KM));

        params.stpt_gap = params
            .stpt_gap
            .map(|gap| gap.clamp(MIN_STPT_GAP as i64, MAX_STPT_GAP as i64));

        let unknown_waypoint = params
            .waypoint_name
            .as_deref()
            .is_some_and(|name| !name.is_empty() && !airports.contains(name));
        if unknown_waypoint {
            params.waypoint_name = None;
            self.response_text.push_str(UNKNOWN_WAYPOINT_NOTE);
        }

        self
    }

    /// Apply an `UPDATE` to the mission. Returns whether any field changed.
    ///
    /// Absent fields leave the mission untouched; an absent or empty waypoint does
    /// not clear an existing one.
    pub fn apply_to(&self, mission: &mut MissionParams) -> bool {
        if self.action != CommandAction::Update {
            return false;
        }
        let update = &self.update_params;
        let before = mission.clone();

        if let Some(margin) = update.safety_margin_km {
            mission.margin = margin;
        }
        if let Some(rtb) = update.rtb {
            mission.rtb = rtb;
        }
        if let Some(gap) = update.stpt_gap {
            mission.stpt_gap = gap.max(MIN_STPT_GAP as i64) as usize;
        }
        if let Some(name) = update.waypoint_name.as_deref().filter(|n| !n.is_empty()) {
            mission.waypoint = Some(name.to_string());
        }

        let changed = *mission != before;
        if changed {
            info!(
                "mission updated: margin={} rtb={} waypoint={:?} stpt_gap={}",
                mission.margin, mission.rtb, mission.waypoint, mission.stpt_gap
            );
        }
        changed
    }
}

/// One-line state summary handed to the command parser as context.
///
/// Margins always carry a decimal point and booleans are capitalized, the form the
/// parser prompt was written against.
pub fn describe_state(params: &MissionParams) -> String {
    format!(
        "Margin: {:?}km, RTB: {}, Waypoint: {}, STPT_Gap: {}",
        params.margin,
        if params.rtb { "True" } else { "False" },
        params.waypoint.as_deref().unwrap_or("None"),
        params.stpt_gap
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_update_and_clamps_ranges() {
        let raw = r#"{
            "action": "UPDATE",
            "update_params": {"safety_margin_km": 80.0, "rtb": null, "waypoint_name": null, "stpt_gap": 0},
            "response_text": "Margin widened."
        }"#;
        let command = TacticalCommand::from_json(raw)
            .unwrap()
            .validated(&AirportCatalog::default());
        assert_eq!(command.action, CommandAction::Update);
        assert_eq!(command.update_params.safety_margin_km, Some(50.0));
        assert_eq!(command.update_params.stpt_gap, Some(1));
        assert_eq!(command.response_text, "Margin widened.");
    }

    #[test]
    fn unknown_waypoint_is_dropped_with_note() {
        let command = TacticalCommand {
            action: CommandAction::Update,
            update_params: UpdateParams {
                waypoint_name: Some("Atlantis".to_string()),
                ..UpdateParams::default()
            },
            response_text: "Routing via Atlantis.".to_string(),
        }
        .validated(&AirportCatalog::default());
        assert_eq!(command.update_params.waypoint_name, None);
        assert!(command.response_text.ends_with(UNKNOWN_WAYPOINT_NOTE));
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut params = MissionParams {
            waypoint: Some("대구(Daegu)".to_string()),
            ..MissionParams::default()
        };
        let command = TacticalCommand {
            action: CommandAction::Update,
            update_params: UpdateParams {
                stpt_gap: Some(20),
                ..UpdateParams::default()
            },
            response_text: String::new(),
        };
        assert!(command.apply_to(&mut params));
        assert_eq!(params.stpt_gap, 20);
        assert_eq!(params.margin, 5.0);
        assert_eq!(params.waypoint.as_deref(), Some("대구(Daegu)"));
        assert!(!command.apply_to(&mut params));
    }

    #[test]
    fn chat_commands_do_not_modify_mission() {
        let mut params = MissionParams::default();
        let mut command = TacticalCommand::chat("Say again?");
        command.update_params.rtb = Some(false);
        assert!(!command.apply_to(&mut params));
        assert!(params.rtb);
    }

    #[test]
    fn malformed_payload_becomes_chat() {
        let command = TacticalCommand::parse_or_chat("not json");
        assert_eq!(command.action, CommandAction::Chat);
        assert!(command.response_text.starts_with("Could not parse command"));
    }

    #[test]
    fn state_summary_lists_all_parameters() {
        assert_eq!(
            describe_state(&MissionParams::default()),
            "Margin: 5.0km, RTB: True, Waypoint: None, STPT_Gap: 10"
        );

        let params = MissionParams {
            margin: 12.5,
            rtb: false,
            waypoint: Some("대구(Daegu)".to_string()),
            stpt_gap: 3,
            ..MissionParams::default()
        };
        assert_eq!(
            describe_state(&params),
            "Margin: 12.5km, RTB: False, Waypoint: 대구(Daegu), STPT_Gap: 3"
        );
    }
}

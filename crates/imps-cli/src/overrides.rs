//! Command-line overrides of mission parameters.

use imps_core::mission::{MAX_MARGIN_KM, MAX_STPT_GAP, MIN_MARGIN_KM, MIN_STPT_GAP};
use imps_core::MissionParams;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionOverrides {
    pub margin: Option<f64>,
    pub gap: Option<usize>,
    pub waypoint: Option<String>,
    pub no_rtb: bool,
}

impl MissionOverrides {
    /// Apply present overrides, clamped to the same ranges as operator commands.
    /// An empty waypoint clears the current one.
    pub fn apply(&self, params: &mut MissionParams) {
        if let Some(margin) = self.margin.filter(|m| m.is_finite()) {
            params.margin = margin.clamp(MIN_MARGIN_KM, MAX_MARGIN_KM);
        }
        if let Some(gap) = self.gap {
            params.stpt_gap = gap.clamp(MIN_STPT_GAP, MAX_STPT_GAP);
        }
        if let Some(waypoint) = &self.waypoint {
            params.waypoint = (!waypoint.is_empty()).then(|| waypoint.clone());
        }
        if self.no_rtb {
            params.rtb = false;
        }
    }
}

//! Plain-text rendering of planning results.

use std::fmt::Write as _;

use imps_core::{RouteLeg, SteerPoint};

/// Fixed-width steer-point table, one row per point.
pub fn steer_point_table(points: &[SteerPoint]) -> String {
    let mut out = format!("{:<8} {:>4} {:>10} {:>10}\n", "Type", "Seq", "Lat", "Lon");
    for point in points {
        let _ = writeln!(
            out,
            "{:<8} {:>4} {:>10.4} {:>10.4}",
            point.leg.as_str(),
            point.seq,
            point.lat,
            point.lon
        );
    }
    out
}

/// One-line description of a leg: length and search effort, or why it failed.
pub fn leg_summary(label: &str, leg: &RouteLeg) -> String {
    match leg.failure {
        Some(reason) => format!(
            "{}: no feasible route ({}, {} nodes expanded)",
            label, reason, leg.nodes_expanded
        ),
        None => format!(
            "{}: {:.1} km, {} grid points, {} nodes expanded",
            label,
            leg.length_km,
            leg.raw.len(),
            leg.nodes_expanded
        ),
    }
}

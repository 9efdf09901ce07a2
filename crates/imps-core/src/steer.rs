//! Steer point extraction and export.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegKind {
    Ingress,
    Egress,
}

impl LegKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegKind::Ingress => "Ingress",
            LegKind::Egress => "Egress",
        }
    }
}

/// A down-sampled route point for display and export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteerPoint {
    pub leg: LegKind,
    /// 1-based within its leg.
    pub seq: usize,
    pub lat: f64,
    pub lon: f64,
}

/// Every `gap`-th point of `path`, starting with the first. A gap of 0 acts as 1.
pub fn extract_steer_points(path: &[GeoPoint], gap: usize, leg: LegKind) -> Vec<SteerPoint> {
    path.iter()
        .step_by(gap.max(1))
        .enumerate()
        .map(|(i, point)| SteerPoint {
            leg,
            seq: i + 1,
            lat: point.lat,
            lon: point.lon,
        })
        .collect()
}

/// Ingress points followed by egress points; nothing at all without an ingress route.
pub fn mission_steer_points(ingress: &[GeoPoint], egress: &[GeoPoint], gap: usize) -> Vec<SteerPoint> {
    if ingress.is_empty() {
        return Vec::new();
    }
    let mut points = extract_steer_points(ingress, gap, LegKind::Ingress);
    points.extend(extract_steer_points(egress, gap, LegKind::Egress));
    points
}

/// `Type,Seq,Lat,Lon` table with four decimal places.
pub fn to_csv(points: &[SteerPoint]) -> String {
    let mut out = String::from("Type,Seq,Lat,Lon\n");
    for point in points {
        let _ = writeln!(
            out,
            "{},{},{:.4},{:.4}",
            point.leg.as_str(),
            point.seq,
            point.lat,
            point.lon
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(len: usize) -> Vec<GeoPoint> {
        (0..len)
            .map(|i| GeoPoint::new(35.0 + i as f64 * 0.01, 127.0))
            .collect()
    }

    #[test]
    fn stride_starts_at_first_point() {
        let points = extract_steer_points(&line(25), 10, LegKind::Ingress);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].seq, 1);
        assert_eq!(points[2].seq, 3);
        assert!((points[1].lat - 35.10).abs() < 1e-9);
        assert!((points[2].lat - 35.20).abs() < 1e-9);
    }

    #[test]
    fn zero_gap_keeps_every_point() {
        assert_eq!(extract_steer_points(&line(4), 0, LegKind::Egress).len(), 4);
    }

    #[test]
    fn egress_numbering_restarts() {
        let points = mission_steer_points(&line(3), &line(2), 1);
        assert_eq!(points.len(), 5);
        assert_eq!(points[3].leg, LegKind::Egress);
        assert_eq!(points[3].seq, 1);
        assert!(mission_steer_points(&[], &line(5), 1).is_empty());
    }

    #[test]
    fn csv_has_header_and_fixed_precision() {
        let csv = to_csv(&extract_steer_points(&[GeoPoint::new(35.17912, 129.0751)], 10, LegKind::Ingress));
        assert_eq!(csv, "Type,Seq,Lat,Lon\nIngress,1,35.1791,129.0751\n");
    }
}

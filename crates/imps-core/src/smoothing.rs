//! Route smoothing with a parametric cubic smoothing spline.
//!
//! The raw grid route is treated as a curve `u -> (lat, lon)` parameterized by
//! normalized chord length. A natural cubic smoothing spline is fitted to each
//! coordinate with a shared roughness penalty `alpha`, chosen so the summed squared
//! residual over both coordinates matches the configured smoothing factor. The
//! fitted curve is then resampled uniformly in `u`.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;
use tracing::warn;

use crate::models::{GeoPath, GeoPoint};

/// Output points per input point.
pub const RESAMPLE_FACTOR: usize = 5;
/// Shorter paths are returned untouched.
pub const MIN_SMOOTHING_POINTS: usize = 3;

const LN_ALPHA_MIN: f64 = -40.0;
const LN_ALPHA_MAX: f64 = 25.0;
const MAX_BISECTIONS: usize = 60;
const RSS_REL_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Error, PartialEq)]
pub enum SplineError {
    #[error("need at least 3 distinct points, got {0}")]
    TooFewPoints(usize),
    #[error("parameter values are not strictly increasing")]
    DegenerateParameterization,
    #[error("smoothing system is not positive definite")]
    Singular,
    #[error("spline evaluation produced a non-finite value")]
    NonFinite,
}

#[derive(Debug, Clone, Copy)]
pub struct PathSmoother {
    smoothing_factor: f64,
}

impl PathSmoother {
    pub fn new(smoothing_factor: f64) -> Self {
        Self { smoothing_factor }
    }

    /// Smooth a route, returning `5 × path.len()` points on success.
    ///
    /// Paths with fewer than three points, or fewer than three after dropping
    /// consecutive duplicates, come back unchanged. Any fitting failure also
    /// returns the input unchanged.
    pub fn smooth(&self, path: &[GeoPoint]) -> GeoPath {
        if path.len() < MIN_SMOOTHING_POINTS {
            return path.to_vec();
        }

        let mut clean = path.to_vec();
        clean.dedup();
        if clean.len() < MIN_SMOOTHING_POINTS {
            return path.to_vec();
        }

        match ParametricSpline::fit(&clean, self.smoothing_factor)
            .and_then(|spline| spline.sample(path.len() * RESAMPLE_FACTOR))
        {
            Ok(smoothed) => smoothed,
            Err(err) => {
                warn!("path smoothing failed, keeping raw route: {}", err);
                path.to_vec()
            }
        }
    }
}

/// Natural cubic spline in each coordinate over a shared parameter vector.
#[derive(Debug, Clone)]
struct ParametricSpline {
    knots: Vec<f64>,
    lat: CoordinateSpline,
    lon: CoordinateSpline,
}

/// Knot values and second derivatives (zero at both ends).
#[derive(Debug, Clone)]
struct CoordinateSpline {
    values: DVector<f64>,
    second: DVector<f64>,
}

/// Reinsch band matrices for a fixed knot vector.
struct SmoothingSystem {
    q: DMatrix<f64>,
    r: DMatrix<f64>,
    qtq: DMatrix<f64>,
}

impl ParametricSpline {
    fn fit(points: &[GeoPoint], smoothing_factor: f64) -> Result<Self, SplineError> {
        let n = points.len();
        if n < MIN_SMOOTHING_POINTS {
            return Err(SplineError::TooFewPoints(n));
        }

        let knots = chord_length_parameters(points)?;
        let system = SmoothingSystem::new(&knots);
        let lat = DVector::from_iterator(n, points.iter().map(|p| p.lat));
        let lon = DVector::from_iterator(n, points.iter().map(|p| p.lon));

        let fit_at = |alpha: f64| -> Result<(CoordinateSpline, CoordinateSpline, f64), SplineError> {
            let (lat_fit, lat_rss) = system.solve(&lat, alpha)?;
            let (lon_fit, lon_rss) = system.solve(&lon, alpha)?;
            Ok((lat_fit, lon_fit, lat_rss + lon_rss))
        };

        if smoothing_factor <= 0.0 {
            let (lat, lon, _) = fit_at(0.0)?;
            return Ok(Self { knots, lat, lon });
        }

        // The residual grows monotonically with alpha; the stiffest fit is used
        // when even it stays within the allowance.
        let stiffest = fit_at(LN_ALPHA_MAX.exp())?;
        if stiffest.2 <= smoothing_factor {
            return Ok(Self {
                knots,
                lat: stiffest.0,
                lon: stiffest.1,
            });
        }

        let mut lo = LN_ALPHA_MIN;
        let mut hi = LN_ALPHA_MAX;
        let mut best = fit_at(lo.exp())?;
        for _ in 0..MAX_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            let candidate = fit_at(mid.exp())?;
            if candidate.2 <= smoothing_factor {
                lo = mid;
                let close = (smoothing_factor - candidate.2) <= RSS_REL_TOLERANCE * smoothing_factor;
                best = candidate;
                if close {
                    break;
                }
            } else {
                hi = mid;
            }
        }

        Ok(Self {
            knots,
            lat: best.0,
            lon: best.1,
        })
    }

    /// Evaluate `count` points evenly spaced over the whole parameter range.
    fn sample(&self, count: usize) -> Result<GeoPath, SplineError> {
        let first = self.knots[0];
        let last = self.knots[self.knots.len() - 1];
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let t = if count > 1 {
                first + (last - first) * i as f64 / (count - 1) as f64
            } else {
                first
            };
            let lat = self.lat.eval(&self.knots, t);
            let lon = self.lon.eval(&self.knots, t);
            if !lat.is_finite() || !lon.is_finite() {
                return Err(SplineError::NonFinite);
            }
            out.push(GeoPoint::new(lat, lon));
        }
        Ok(out)
    }
}

impl SmoothingSystem {
    fn new(knots: &[f64]) -> Self {
        let n = knots.len();
        let m = n - 2;
        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();

        let mut q = DMatrix::zeros(n, m);
        let mut r = DMatrix::zeros(m, m);
        for col in 0..m {
            let i = col + 1;
            q[(i - 1, col)] = 1.0 / h[i - 1];
            q[(i, col)] = -1.0 / h[i - 1] - 1.0 / h[i];
            q[(i + 1, col)] = 1.0 / h[i];

            r[(col, col)] = (h[i - 1] + h[i]) / 3.0;
            if col + 1 < m {
                r[(col, col + 1)] = h[i] / 6.0;
                r[(col + 1, col)] = h[i] / 6.0;
            }
        }
        let qtq = q.transpose() * &q;
        Self { q, r, qtq }
    }

    /// Solve `(R + alpha QᵀQ) γ = Qᵀ y`, then `g = y - alpha Q γ`.
    fn solve(&self, y: &DVector<f64>, alpha: f64) -> Result<(CoordinateSpline, f64), SplineError> {
        let system = &self.r + &self.qtq * alpha;
        let cholesky = system.cholesky().ok_or(SplineError::Singular)?;
        let gamma = cholesky.solve(&(self.q.transpose() * y));
        let residual = &self.q * &gamma * alpha;
        let values = y - &residual;
        let rss = residual.norm_squared();
        if !rss.is_finite() {
            return Err(SplineError::NonFinite);
        }

        let n = y.len();
        let mut second = DVector::zeros(n);
        second.rows_mut(1, n - 2).copy_from(&gamma);
        Ok((CoordinateSpline { values, second }, rss))
    }
}

impl CoordinateSpline {
    fn eval(&self, knots: &[f64], t: f64) -> f64 {
        let last = knots.len() - 2;
        let i = match knots.partition_point(|&k| k <= t) {
            0 => 0,
            idx => (idx - 1).min(last),
        };
        let h = knots[i + 1] - knots[i];
        let a = t - knots[i];
        let b = knots[i + 1] - t;
        let (g0, g1) = (self.values[i], self.values[i + 1]);
        let (c0, c1) = (self.second[i], self.second[i + 1]);
        (a * g1 + b * g0) / h - a * b / 6.0 * ((1.0 + a / h) * c1 + (1.0 + b / h) * c0)
    }
}

/// Cumulative chord length scaled to `[0, 1]`.
fn chord_length_parameters(points: &[GeoPoint]) -> Result<Vec<f64>, SplineError> {
    let mut knots = Vec::with_capacity(points.len());
    let mut total = 0.0;
    knots.push(0.0);
    for pair in points.windows(2) {
        let d_lat = pair[1].lat - pair[0].lat;
        let d_lon = pair[1].lon - pair[0].lon;
        total += (d_lat * d_lat + d_lon * d_lon).sqrt();
        knots.push(total);
    }
    if !total.is_finite() || total <= 0.0 {
        return Err(SplineError::DegenerateParameterization);
    }
    for knot in knots.iter_mut() {
        *knot /= total;
    }
    if knots.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SplineError::DegenerateParameterization);
    }
    Ok(knots)
}

use serde::{Deserialize, Serialize};
use tracing::debug;
use wmp_core::errors::{ErrorInfo, WmpError};

fn range_error(code: &str, message: impl Into<String>, e_min: f64, e_max: f64) -> WmpError {
    WmpError::InvalidRange(
        ErrorInfo::new(code, message)
            .with_context("e_min", e_min.to_string())
            .with_context("e_max", e_max.to_string()),
    )
}

/// Strictly increasing, logarithmically spaced evaluation energies.
///
/// The first and last points are exactly the requested bounds; only the
/// interior carries log-spacing rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyGrid {
    points: Vec<f64>,
}

impl EnergyGrid {
    /// Grid size used when none is configured.
    pub const DEFAULT_POINTS: usize = 10_000;

    /// Builds `n_points` energies uniformly spaced in log10 over
    /// `[e_min, e_max]`.
    pub fn log_spaced(e_min: f64, e_max: f64, n_points: usize) -> Result<Self, WmpError> {
        if !e_min.is_finite() || !e_max.is_finite() {
            return Err(range_error(
                "grid_bounds",
                "energy bounds must be finite",
                e_min,
                e_max,
            ));
        }
        if e_min <= 0.0 {
            return Err(range_error(
                "grid_bounds",
                "e_min must be positive",
                e_min,
                e_max,
            ));
        }
        if e_max <= e_min {
            return Err(range_error(
                "grid_bounds",
                "e_max must exceed e_min",
                e_min,
                e_max,
            ));
        }
        if n_points < 2 {
            return Err(range_error(
                "grid_points",
                format!("grid needs at least 2 points, got {n_points}"),
                e_min,
                e_max,
            ));
        }

        let lo = e_min.log10();
        let hi = e_max.log10();
        let step = (hi - lo) / (n_points - 1) as f64;
        let mut points: Vec<f64> = (0..n_points)
            .map(|idx| 10f64.powf(lo + idx as f64 * step))
            .collect();
        points[0] = e_min;
        points[n_points - 1] = e_max;

        if let Some(idx) = points.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(range_error(
                "grid_resolution",
                format!("{n_points} points do not resolve the range; stalled at index {idx}"),
                e_min,
                e_max,
            ));
        }
        debug!(e_min, e_max, n_points, "built energy grid");
        Ok(Self { points })
    }

    /// Energies as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest energy.
    pub fn first(&self) -> f64 {
        self.points[0]
    }

    /// Highest energy.
    pub fn last(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Energy at `idx`.
    pub fn energy(&self, idx: usize) -> f64 {
        self.points[idx]
    }
}

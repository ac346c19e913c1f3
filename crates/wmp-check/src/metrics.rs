//! Absolute and threshold-gated relative error between two curves.

use serde::{Deserialize, Serialize};
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::Reaction;

use crate::channels::ReactionCurve;
use crate::grid::EnergyGrid;

/// Absolute error (b) below which relative error is not reported.
pub const DEFAULT_ABS_THRESHOLD: f64 = 1e-5;

/// Location and size of a maximum error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorPoint {
    /// Error value (barns for absolute, fraction for relative).
    pub error: f64,
    /// Grid energy (eV) where the maximum occurs.
    pub energy: f64,
    /// Candidate cross section at that energy.
    pub candidate: f64,
    /// Reference cross section at that energy.
    pub reference: f64,
}

/// Maxima for a compared channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    /// Largest absolute error.
    pub max_abs: ErrorPoint,
    /// Largest relative error once small absolute errors are gated out.
    pub max_rel: ErrorPoint,
}

impl ChannelMetrics {
    /// Maximum relative error as a percentage with two decimals.
    pub fn max_rel_percent(&self) -> String {
        format!("{:.2}%", self.max_rel.error * 100.0)
    }
}

/// Outcome for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelReport {
    /// The reference has no data for the channel.
    Skipped,
    /// Both sources were compared.
    Compared(ChannelMetrics),
}

impl ChannelReport {
    /// Metrics when the channel was compared.
    pub fn metrics(&self) -> Option<&ChannelMetrics> {
        match self {
            ChannelReport::Skipped => None,
            ChannelReport::Compared(metrics) => Some(metrics),
        }
    }
}

/// Elementwise error curves over the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCurves {
    /// `|candidate - reference|`.
    pub absolute: Vec<f64>,
    /// `|candidate / reference - 1|`, zero where the reference is zero.
    pub relative: Vec<f64>,
    /// `relative`, zeroed where `absolute <= epsilon`.
    pub thresholded: Vec<f64>,
}

/// Computes the three error curves.
pub fn error_curves(candidate: &[f64], reference: &[f64], epsilon: f64) -> ErrorCurves {
    let absolute: Vec<f64> = candidate
        .iter()
        .zip(reference)
        .map(|(c, r)| (c - r).abs())
        .collect();
    let relative: Vec<f64> = candidate
        .iter()
        .zip(reference)
        .map(|(c, r)| if *r == 0.0 { 0.0 } else { (c / r - 1.0).abs() })
        .collect();
    let thresholded = relative
        .iter()
        .zip(&absolute)
        .map(|(rel, abs)| if *abs <= epsilon { 0.0 } else { *rel })
        .collect();
    ErrorCurves {
        absolute,
        relative,
        thresholded,
    }
}

/// Index of the first maximum, ignoring NaN.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate() {
        if *value > values[best] || values[best].is_nan() {
            best = idx;
        }
    }
    best
}

/// Comparison of one channel, with curves kept for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelComparison {
    /// Channel compared.
    pub reaction: Reaction,
    /// Reported outcome.
    pub report: ChannelReport,
    /// Error curves, present only for compared channels.
    pub curves: Option<ErrorCurves>,
}

/// Compares a candidate curve against a reference curve over `grid`.
///
/// A reference that is identically zero marks the channel as skipped rather
/// than reporting a zero or undefined error.
pub fn compare(
    candidate: &ReactionCurve,
    reference: &ReactionCurve,
    grid: &EnergyGrid,
    epsilon: f64,
) -> Result<ChannelComparison, WmpError> {
    let reaction = reference.reaction();
    let (c, r) = (candidate.values(), reference.values());
    if candidate.reaction() != reaction || c.len() != grid.len() || r.len() != grid.len() {
        return Err(WmpError::Data(
            ErrorInfo::new("compare_shape", "curves are not comparable over the grid")
                .with_context("candidate", format!("{}[{}]", candidate.reaction(), c.len()))
                .with_context("reference", format!("{}[{}]", reaction, r.len()))
                .with_context("grid", grid.len().to_string()),
        ));
    }
    if reference.is_zero() {
        return Ok(ChannelComparison {
            reaction,
            report: ChannelReport::Skipped,
            curves: None,
        });
    }

    let curves = error_curves(c, r, epsilon);
    let point = |idx: usize, error: f64| ErrorPoint {
        error,
        energy: grid.energy(idx),
        candidate: c[idx],
        reference: r[idx],
    };
    let abs_idx = argmax(&curves.absolute);
    let rel_idx = argmax(&curves.thresholded);
    let metrics = ChannelMetrics {
        max_abs: point(abs_idx, curves.absolute[abs_idx]),
        max_rel: point(rel_idx, curves.thresholded[rel_idx]),
    };
    Ok(ChannelComparison {
        reaction,
        report: ChannelReport::Compared(metrics),
        curves: Some(curves),
    })
}

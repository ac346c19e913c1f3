use serde::{Deserialize, Serialize};
use wmp_core::errors::{ErrorInfo, WmpError};

/// Piecewise-linear function over a non-decreasing abscissa.
///
/// Evaluates to zero outside the tabulated domain, so threshold reactions
/// vanish below their first tabulated energy. Repeated abscissae encode
/// discontinuities; the right-hand value wins at the jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabulated {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Tabulated {
    /// Builds a table, validating lengths and ordering.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, WmpError> {
        if x.len() != y.len() {
            return Err(WmpError::Data(
                ErrorInfo::new("table_length", "abscissa and ordinate lengths differ")
                    .with_context("x", x.len().to_string())
                    .with_context("y", y.len().to_string()),
            ));
        }
        if x.is_empty() {
            return Err(WmpError::Data(ErrorInfo::new(
                "table_empty",
                "table has no points",
            )));
        }
        if let Some(idx) = x.iter().position(|value| !value.is_finite()) {
            return Err(WmpError::Data(
                ErrorInfo::new("table_abscissa", "abscissa must be finite")
                    .with_context("index", idx.to_string()),
            ));
        }
        if let Some(idx) = x.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(WmpError::Data(
                ErrorInfo::new("table_order", "abscissa must be non-decreasing")
                    .with_context("index", (idx + 1).to_string()),
            ));
        }
        Ok(Self { x, y })
    }

    /// First and last abscissa.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Returns true when `[lo, hi]` lies inside the tabulated domain.
    pub fn covers(&self, lo: f64, hi: f64) -> bool {
        let (first, last) = self.domain();
        lo >= first && hi <= last
    }

    /// Evaluates the table at a single abscissa.
    pub fn eval(&self, at: f64) -> f64 {
        let (first, last) = self.domain();
        if at.is_nan() || at < first || at > last {
            return 0.0;
        }
        // First index with x > at; at least 1 because x[0] <= at.
        let upper = self.x.partition_point(|&value| value <= at);
        if upper == self.x.len() {
            return self.y[upper - 1];
        }
        let lower = upper - 1;
        let (x0, x1) = (self.x[lower], self.x[upper]);
        let (y0, y1) = (self.y[lower], self.y[upper]);
        y0 + (y1 - y0) * (at - x0) / (x1 - x0)
    }

    /// Evaluates the table over a slice of abscissae.
    pub fn eval_many(&self, at: &[f64]) -> Vec<f64> {
        at.iter().map(|&value| self.eval(value)).collect()
    }
}

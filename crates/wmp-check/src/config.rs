use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::Convention;
use wmp_data::temperature_label;

use crate::grid::EnergyGrid;

fn config_error(code: &str, message: impl Into<String>) -> WmpError {
    WmpError::Config(ErrorInfo::new(code, message.into()))
}

/// Read-only settings shared by every nuclide in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Comparison temperature in kelvin.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Number of points in the shared energy grid.
    #[serde(default = "default_grid_points")]
    pub grid_points: usize,
    /// Absolute error (b) at or below which relative error is ignored.
    #[serde(default = "default_abs_threshold")]
    pub abs_threshold: f64,
    /// Row layout assumed for libraries that do not declare one.
    #[serde(default)]
    pub default_convention: Convention,
    /// Whether to render per-channel plots.
    #[serde(default = "default_plots")]
    pub plots: bool,
    /// Plot geometry.
    #[serde(default)]
    pub plot: PlotConfig,
}

fn default_temperature() -> f64 {
    293.75
}

fn default_grid_points() -> usize {
    EnergyGrid::DEFAULT_POINTS
}

fn default_abs_threshold() -> f64 {
    1e-5
}

fn default_plots() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            grid_points: default_grid_points(),
            abs_threshold: default_abs_threshold(),
            default_convention: Convention::default(),
            plots: default_plots(),
            plot: PlotConfig::default(),
        }
    }
}

impl ValidationConfig {
    /// Label used to look up temperature data, e.g. `294K`.
    pub fn temperature_label(&self) -> String {
        temperature_label(self.temperature)
    }

    /// Temperature as written into artefact names, e.g. `293.75` or `294.0`.
    pub fn temperature_tag(&self) -> String {
        if self.temperature.fract() == 0.0 {
            format!("{:.1}", self.temperature)
        } else {
            format!("{}", self.temperature)
        }
    }

    /// Rejects settings no nuclide could be validated with.
    pub fn validate(&self) -> Result<(), WmpError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(config_error(
                "config_temperature",
                format!("temperature must be a non-negative number, got {}", self.temperature),
            ));
        }
        if self.grid_points < 2 {
            return Err(config_error(
                "config_grid_points",
                format!("grid needs at least 2 points, got {}", self.grid_points),
            ));
        }
        if !self.abs_threshold.is_finite() || self.abs_threshold < 0.0 {
            return Err(config_error(
                "config_threshold",
                format!("threshold must be non-negative, got {}", self.abs_threshold),
            ));
        }
        Ok(())
    }
}

/// Plot canvas settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 640,
        }
    }
}

/// Loads a YAML configuration file; absent keys take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ValidationConfig, WmpError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        WmpError::Config(
            ErrorInfo::new("config_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let config: ValidationConfig = serde_yaml::from_slice(&bytes).map_err(|err| {
        WmpError::Config(
            ErrorInfo::new("config_parse", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    config.validate()?;
    Ok(config)
}

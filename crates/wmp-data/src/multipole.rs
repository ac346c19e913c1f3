//! File-backed windowed multipole library.
//!
//! Two persisted schema revisions exist. The current one stores `E_min`,
//! `E_max` and the window table directly; the legacy one stores `start_E`,
//! `end_E` and a window spacing in sqrt(E), from which the window count is
//! derived. Both are normalised into [`MultipoleLibrary`] on load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::{Convention, FilenameIdentity, IdentitySource, NameIdentity, NuclideId};

use crate::evaluator::{temperature_label, ChannelTriple, MultipoleEvaluator};
use crate::serde::from_json_slice;
use crate::tabulated::Tabulated;

fn data_error(code: &str, message: impl Into<String>, path: &Path) -> WmpError {
    WmpError::Data(ErrorInfo::new(code, message).with_context("path", path.display().to_string()))
}

/// Exported evaluator rows at one temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTable {
    /// Energies (eV) at which the rows were exported.
    pub energy: Vec<f64>,
    /// Exactly three rows, laid out per the library convention.
    pub channels: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CurrentSchema {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "E_min")]
    e_min: f64,
    #[serde(rename = "E_max")]
    e_max: f64,
    windows: Vec<[i64; 2]>,
    data: Vec<Vec<f64>>,
    fit_order: u32,
    #[serde(default)]
    fissionable: bool,
    #[serde(default)]
    pseudo_k0rs: Option<Vec<f64>>,
    #[serde(default)]
    convention: Option<Convention>,
    #[serde(default)]
    samples: BTreeMap<String, SampleTable>,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacySchema {
    #[serde(rename = "start_E")]
    start_e: f64,
    #[serde(rename = "end_E")]
    end_e: f64,
    spacing: f64,
    data: Vec<Vec<f64>>,
    fit_order: u32,
    #[serde(default)]
    fissionable: bool,
    #[serde(default)]
    convention: Option<Convention>,
    #[serde(default)]
    samples: BTreeMap<String, SampleTable>,
}

/// Persisted schema revision a library was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaRevision {
    /// `start_E` / `end_E` / `spacing`.
    Legacy,
    /// `E_min` / `E_max` / `windows`.
    Current,
}

/// Number of windows implied by the legacy sqrt(E) spacing.
pub fn legacy_window_count(start_e: f64, end_e: f64, spacing: f64) -> usize {
    ((end_e.sqrt() - start_e.sqrt()) / spacing + 1.0).floor() as usize
}

/// Windowed multipole library loaded from disk.
#[derive(Debug, Clone)]
pub struct MultipoleLibrary {
    path: PathBuf,
    nuclide: NuclideId,
    name_attribute: Option<String>,
    schema: SchemaRevision,
    e_min: f64,
    e_max: f64,
    pole_count: usize,
    window_count: usize,
    fit_order: u32,
    fissionable: bool,
    zero_radius_correction: Option<bool>,
    convention: Option<Convention>,
    samples: BTreeMap<String, [Tabulated; 3]>,
}

impl MultipoleLibrary {
    /// Reads and normalises a library file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WmpError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| WmpError::io("wmp_read", path, err))?;
        Self::from_json(path, &bytes)
    }

    /// Parses library bytes; `path` supplies the file-name identity when the
    /// payload carries no name attribute.
    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self, WmpError> {
        let value: Value = from_json_slice(bytes).map_err(|err| with_path(err, path))?;
        // Legacy files are recognised by `start_E`; everything else must
        // parse as the current schema so field errors surface as-is.
        let legacy = value.get("start_E").is_some() && value.get("E_min").is_none();
        let library = if legacy {
            Self::from_legacy(path, parse_schema(value, path)?)?
        } else {
            Self::from_current(path, parse_schema(value, path)?)?
        };
        debug!(
            nuclide = %library.nuclide,
            schema = ?library.schema,
            windows = library.window_count,
            poles = library.pole_count,
            "loaded multipole library"
        );
        Ok(library)
    }

    fn from_current(path: &Path, schema: CurrentSchema) -> Result<Self, WmpError> {
        let nuclide = resolve_identity(path, schema.name.as_deref())?;
        let zero_radius_correction = schema
            .pseudo_k0rs
            .as_ref()
            .map(|terms| terms.iter().all(|term| *term == 0.0));
        Ok(Self {
            path: path.to_path_buf(),
            nuclide,
            name_attribute: schema.name,
            schema: SchemaRevision::Current,
            e_min: schema.e_min,
            e_max: schema.e_max,
            pole_count: schema.data.len(),
            window_count: schema.windows.len(),
            fit_order: schema.fit_order,
            fissionable: schema.fissionable,
            zero_radius_correction,
            convention: schema.convention,
            samples: build_samples(path, schema.samples)?,
        })
    }

    fn from_legacy(path: &Path, schema: LegacySchema) -> Result<Self, WmpError> {
        if schema.spacing.is_nan() || schema.spacing <= 0.0 {
            return Err(data_error(
                "legacy_spacing",
                "window spacing must be positive",
                path,
            ));
        }
        let nuclide = resolve_identity(path, None)?;
        Ok(Self {
            path: path.to_path_buf(),
            nuclide,
            name_attribute: None,
            schema: SchemaRevision::Legacy,
            e_min: schema.start_e,
            e_max: schema.end_e,
            pole_count: schema.data.len(),
            window_count: legacy_window_count(schema.start_e, schema.end_e, schema.spacing),
            fit_order: schema.fit_order,
            fissionable: schema.fissionable,
            zero_radius_correction: None,
            convention: schema.convention,
            samples: build_samples(path, schema.samples)?,
        })
    }

    /// Source file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name attribute stored in the file, if any.
    pub fn name_attribute(&self) -> Option<&str> {
        self.name_attribute.as_deref()
    }

    /// Schema revision the file was written in.
    pub fn schema(&self) -> SchemaRevision {
        self.schema
    }

    /// Number of poles.
    pub fn pole_count(&self) -> usize {
        self.pole_count
    }

    /// Whether the scattering-radius correction terms are all zero; `None`
    /// for schema revisions that do not store them.
    pub fn zero_radius_correction(&self) -> Option<bool> {
        self.zero_radius_correction
    }

    /// Temperature labels with exported rows.
    pub fn sample_labels(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }
}

fn with_path(err: WmpError, path: &Path) -> WmpError {
    match err {
        WmpError::Serde(info) => {
            WmpError::Serde(info.with_context("path", path.display().to_string()))
        }
        other => other,
    }
}

fn parse_schema<T: DeserializeOwned>(value: Value, path: &Path) -> Result<T, WmpError> {
    serde_json::from_value(value).map_err(|err| {
        WmpError::Serde(
            ErrorInfo::new("json_deserialize", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

fn resolve_identity(path: &Path, name: Option<&str>) -> Result<NuclideId, WmpError> {
    let source: Box<dyn IdentitySource> = match name {
        Some(name) => Box::new(NameIdentity::new(name)),
        None => Box::new(FilenameIdentity::new(path)),
    };
    source.nuclide_id()
}

fn build_samples(
    path: &Path,
    samples: BTreeMap<String, SampleTable>,
) -> Result<BTreeMap<String, [Tabulated; 3]>, WmpError> {
    let mut tables = BTreeMap::new();
    for (label, table) in samples {
        let SampleTable { energy, channels } = table;
        let rows: [Vec<f64>; 3] = channels.try_into().map_err(|rows: Vec<Vec<f64>>| {
            data_error(
                "sample_rows",
                format!("expected 3 rows, found {}", rows.len()),
                path,
            )
        })?;
        let [first, second, third] = rows;
        let built = [
            Tabulated::new(energy.clone(), first)?,
            Tabulated::new(energy.clone(), second)?,
            Tabulated::new(energy, third)?,
        ];
        tables.insert(label, built);
    }
    Ok(tables)
}

impl MultipoleEvaluator for MultipoleLibrary {
    fn nuclide(&self) -> NuclideId {
        self.nuclide
    }

    fn e_min(&self) -> f64 {
        self.e_min
    }

    fn e_max(&self) -> f64 {
        self.e_max
    }

    fn window_count(&self) -> usize {
        self.window_count
    }

    fn fit_order(&self) -> u32 {
        self.fit_order
    }

    fn fissionable(&self) -> bool {
        self.fissionable
    }

    fn convention(&self) -> Option<Convention> {
        self.convention
    }

    fn evaluate(&self, energy: &[f64], temperature: f64) -> Result<ChannelTriple, WmpError> {
        let label = temperature_label(temperature);
        let rows = self.samples.get(&label).ok_or_else(|| {
            WmpError::MissingTemperature(
                ErrorInfo::new("wmp_temperature", "multipole library has no rows at temperature")
                    .with_context("label", label.clone())
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        if let (Some(&lo), Some(&hi)) = (energy.first(), energy.last()) {
            if !rows[0].covers(lo, hi) {
                let (first, last) = rows[0].domain();
                return Err(WmpError::Data(
                    ErrorInfo::new("wmp_coverage", "exported rows do not cover the energy grid")
                        .with_context("grid", format!("[{lo}, {hi}]"))
                        .with_context("rows", format!("[{first}, {last}]"))
                        .with_context("path", self.path.display().to_string()),
                ));
            }
        }
        Ok([
            rows[0].eval_many(energy),
            rows[1].eval_many(energy),
            rows[2].eval_many(energy),
        ])
    }
}

//! Sequential batch driver with per-nuclide failure isolation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::{FilenameIdentity, IdentitySource, NameIdentity};
use wmp_data::{to_canonical_json_bytes, MultipoleEvaluator, MultipoleLibrary, PointwiseLibrary};

use crate::config::ValidationConfig;
use crate::hash::file_sha256;
use crate::plot::{PlotRenderer, SvgPlotRenderer};
use crate::report::TextReportWriter;
use crate::run::{NuclideOutcome, RunFailure, RunSources, RunState, ValidationRun};

fn config_error(code: &str, message: &str, path: &Path) -> WmpError {
    WmpError::Config(
        ErrorInfo::new(code, message).with_context("path", path.display().to_string()),
    )
}

/// Directories a batch reads from and writes to, checked once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPaths {
    /// Multipole libraries to validate, in processing order.
    pub libraries: Vec<PathBuf>,
    /// Directory holding `<nuclide>.json` reference files.
    pub ace_dir: PathBuf,
    /// Output directory.
    pub out_dir: PathBuf,
}

impl BatchPaths {
    /// Validates the inputs and creates the output directory.
    ///
    /// An explicit `wmp_file` takes precedence over `wmp_dir`. Any missing
    /// input is a configuration error: nothing is processed.
    pub fn resolve(
        wmp_dir: &Path,
        wmp_file: Option<&Path>,
        ace_dir: &Path,
        out_dir: &Path,
    ) -> Result<Self, WmpError> {
        let libraries = match wmp_file {
            Some(file) => {
                if !file.is_file() {
                    return Err(config_error(
                        "wmp_file_missing",
                        "multipole library file does not exist",
                        file,
                    ));
                }
                vec![file.to_path_buf()]
            }
            None => {
                if !wmp_dir.is_dir() {
                    return Err(config_error(
                        "wmp_dir_missing",
                        "multipole library directory does not exist",
                        wmp_dir,
                    ));
                }
                discover_libraries(wmp_dir)?
            }
        };
        if !ace_dir.is_dir() {
            return Err(config_error(
                "ace_dir_missing",
                "reference data directory does not exist",
                ace_dir,
            ));
        }
        fs::create_dir_all(out_dir).map_err(|err| {
            WmpError::Config(
                ErrorInfo::new("out_dir_create", err.to_string())
                    .with_context("path", out_dir.display().to_string()),
            )
        })?;
        Ok(Self {
            libraries,
            ace_dir: ace_dir.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
        })
    }

    /// Reference file expected for a nuclide.
    pub fn reference_path(&self, nuclide: &str) -> PathBuf {
        self.ace_dir.join(format!("{nuclide}.json"))
    }
}

/// `*.json` files directly under `dir`, sorted by path.
pub fn discover_libraries(dir: &Path) -> Result<Vec<PathBuf>, WmpError> {
    let pattern = dir.join("*.json");
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern).map_err(|err| {
        WmpError::Config(
            ErrorInfo::new("discover_pattern", err.to_string())
                .with_context("pattern", pattern.to_string()),
        )
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            WmpError::io("discover_entry", &path, err.into_error())
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Counts and outcomes for a finished batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Nuclides with a written report.
    pub completed: usize,
    /// Nuclides that aborted.
    pub failed: usize,
    /// Outcome per nuclide in processing order.
    pub outcomes: Vec<NuclideOutcome>,
    /// Path of the batch index.
    pub index_path: PathBuf,
}

#[derive(Serialize)]
struct BatchIndex<'a> {
    temperature: f64,
    grid_points: usize,
    abs_threshold: f64,
    completed: usize,
    failed: usize,
    nuclides: &'a [NuclideOutcome],
}

fn failure_name(path: &Path) -> String {
    FilenameIdentity::new(path)
        .canonical_name()
        .unwrap_or_else(|_| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}

/// Validates one multipole library against its reference.
pub fn run_one(
    wmp_path: &Path,
    paths: &BatchPaths,
    config: &ValidationConfig,
) -> Result<NuclideOutcome, RunFailure> {
    let fail = |nuclide: String| move |error: WmpError| RunFailure {
        nuclide,
        state: RunState::Init,
        error,
    };

    let library = MultipoleLibrary::open(wmp_path).map_err(fail(failure_name(wmp_path)))?;
    let nuclide = library.nuclide().canonical_name();
    let ace_path = paths.reference_path(&nuclide);
    if !ace_path.is_file() {
        return Err(fail(nuclide)(WmpError::Precondition(
            ErrorInfo::new("ace_missing", "no reference file for nuclide")
                .with_context("path", ace_path.display().to_string())
                .with_hint("reference files are named after the canonical nuclide"),
        )));
    }
    let reference = PointwiseLibrary::open(&ace_path).map_err(fail(nuclide.clone()))?;
    if let Some(name) = reference.name() {
        let recorded = NameIdentity::new(name)
            .canonical_name()
            .map_err(fail(nuclide.clone()))?;
        if recorded != nuclide {
            let error = WmpError::Precondition(
                ErrorInfo::new("ace_identity", "reference file names a different nuclide")
                    .with_context("expected", nuclide.clone())
                    .with_context("recorded", recorded)
                    .with_context("path", ace_path.display().to_string()),
            );
            return Err(fail(nuclide)(error));
        }
    }
    let sources = RunSources {
        wmp_sha256: file_sha256(wmp_path).map_err(fail(nuclide.clone()))?,
        ace_sha256: file_sha256(&ace_path).map_err(fail(nuclide.clone()))?,
        wmp_path: wmp_path.to_path_buf(),
        ace_path,
    };

    let writer = TextReportWriter::new(&paths.out_dir);
    let renderer = SvgPlotRenderer::new(&paths.out_dir, config.plot);
    let plotter: Option<&dyn PlotRenderer> = config.plots.then_some(&renderer as &dyn PlotRenderer);

    let artefacts = ValidationRun::new(config, &library, &reference, sources).execute(&writer, plotter)?;
    Ok(NuclideOutcome::Complete {
        nuclide,
        report: artefacts.report_path,
        plots: artefacts.plots,
    })
}

/// Runs every library in `paths`, one at a time. Per-nuclide failures are
/// logged and recorded; only failing to write the index aborts the batch.
pub fn run_batch(paths: &BatchPaths, config: &ValidationConfig) -> Result<BatchSummary, WmpError> {
    let total = paths.libraries.len();
    let mut outcomes = Vec::with_capacity(total);
    for (idx, wmp_path) in paths.libraries.iter().enumerate() {
        info!(
            file = %wmp_path.display(),
            progress = %format!("{}/{}", idx + 1, total),
            "validating"
        );
        let outcome = match run_one(wmp_path, paths, config) {
            Ok(outcome) => {
                info!(nuclide = outcome.nuclide(), "validation complete");
                outcome
            }
            Err(failure) => {
                error!(
                    nuclide = %failure.nuclide,
                    state = %failure.state,
                    error = %failure.error,
                    "validation aborted"
                );
                NuclideOutcome::Failed(failure)
            }
        };
        outcomes.push(outcome);
    }

    let completed = outcomes.iter().filter(|outcome| outcome.is_complete()).count();
    let failed = outcomes.len() - completed;
    let index_path = paths.out_dir.join("index.json");
    let index = BatchIndex {
        temperature: config.temperature,
        grid_points: config.grid_points,
        abs_threshold: config.abs_threshold,
        completed,
        failed,
        nuclides: &outcomes,
    };
    let bytes = to_canonical_json_bytes(&index)?;
    fs::write(&index_path, bytes).map_err(|err| WmpError::io("index_write", &index_path, err))?;

    Ok(BatchSummary {
        completed,
        failed,
        outcomes,
        index_path,
    })
}

//! Per-nuclide validation reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wmp_core::errors::WmpError;
use wmp_core::{Convention, Reaction};
use wmp_data::to_canonical_json_bytes;

use crate::channels::NegativeCrossSectionWarning;
use crate::metrics::{ChannelReport, ErrorPoint};

/// Identification block written at the top of every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHeader {
    /// Canonical nuclide name.
    pub nuclide: String,
    /// Multipole library path.
    pub wmp_path: PathBuf,
    /// Reference library path.
    pub ace_path: PathBuf,
    /// Lower bound declared by the multipole library (eV).
    pub e_min: f64,
    /// Upper bound declared by the multipole library (eV).
    pub e_max: f64,
    /// Number of energy windows.
    pub window_count: usize,
    /// Whether the nuclide is fissionable.
    pub fissionable: bool,
    /// First and last grid energies actually tested (eV).
    pub test_range: [f64; 2],
    /// Grid size.
    pub grid_points: usize,
    /// Comparison temperature (K).
    pub temperature: f64,
    /// Temperature as written into artefact names.
    pub temperature_tag: String,
    /// Row layout the multipole rows were read with.
    pub convention: Convention,
    /// SHA-256 of the multipole library file.
    pub wmp_sha256: String,
    /// SHA-256 of the reference library file.
    pub ace_sha256: String,
}

/// Outcome of one channel in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    /// Channel.
    pub reaction: Reaction,
    /// Metrics or skip marker.
    pub report: ChannelReport,
}

/// Everything known about one validated nuclide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuclideReport {
    /// Identification block.
    pub header: RunHeader,
    /// Channel outcomes in canonical order.
    pub channels: Vec<ChannelEntry>,
    /// Negative cross sections found in the candidate.
    pub warnings: Vec<NegativeCrossSectionWarning>,
    /// RFC 3339 timestamp of report creation.
    pub created_at: String,
}

/// Persists per-nuclide reports.
pub trait ReportWriter {
    /// Writes the report and returns the path of the primary artefact.
    fn write(&self, report: &NuclideReport) -> Result<PathBuf, WmpError>;
}

/// Writes a human-readable `.log` report and a canonical JSON sidecar.
#[derive(Debug, Clone)]
pub struct TextReportWriter {
    out_dir: PathBuf,
}

impl TextReportWriter {
    /// Writer rooted at `out_dir`, which must exist.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Base file name shared by the log and its sidecar.
    pub fn stem(header: &RunHeader) -> String {
        format!("{}_{}K_validation", header.nuclide, header.temperature_tag)
    }
}

impl ReportWriter for TextReportWriter {
    fn write(&self, report: &NuclideReport) -> Result<PathBuf, WmpError> {
        let stem = Self::stem(&report.header);
        let log_path = self.out_dir.join(format!("{stem}.log"));
        let json_path = self.out_dir.join(format!("{stem}.json"));

        {
            let file = File::create(&log_path)
                .map_err(|err| WmpError::io("report_create", &log_path, err))?;
            let mut out = BufWriter::new(file);
            render_text(&mut out, report)
                .and_then(|_| out.flush())
                .map_err(|err| WmpError::io("report_write", &log_path, err))?;
        }

        let bytes = to_canonical_json_bytes(report)?;
        std::fs::write(&json_path, bytes)
            .map_err(|err| WmpError::io("report_write", &json_path, err))?;
        Ok(log_path)
    }
}

fn title_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn write_point(out: &mut impl Write, point: &ErrorPoint) -> std::io::Result<()> {
    writeln!(out, "  energy: {:e}", point.energy)?;
    writeln!(out, "  WMP xs: {:e}", point.candidate)?;
    writeln!(out, "  ACE xs: {:e}", point.reference)
}

/// Renders the human-readable report layout.
pub fn render_text(out: &mut impl Write, report: &NuclideReport) -> std::io::Result<()> {
    let header = &report.header;
    writeln!(out, "WMP file: {}", header.wmp_path.display())?;
    writeln!(out, "Nuclide: {}", header.nuclide)?;
    writeln!(out, "Energy range: [{:e}, {:e}] eV", header.e_min, header.e_max)?;
    writeln!(out, "Number of windows: {}", header.window_count)?;
    writeln!(out, "Fissionable: {}", title_bool(header.fissionable))?;
    writeln!(out, "Load ace file: {}", header.ace_path.display())?;
    writeln!(
        out,
        "Test energy range: [{:e}, {:e}] eV",
        header.test_range[0], header.test_range[1]
    )?;
    writeln!(out, "Test temperature: {} K", header.temperature_tag)?;
    writeln!(out, "Channel convention: {}", header.convention)?;

    for entry in &report.channels {
        let rxn = entry.reaction;
        match &entry.report {
            ChannelReport::Skipped => {
                writeln!(out, "{rxn} - skipped: no reference data")?;
            }
            ChannelReport::Compared(metrics) => {
                writeln!(out, "{rxn} - max abs error:")?;
                write_point(out, &metrics.max_abs)?;
                writeln!(out, "  error : {:e}", metrics.max_abs.error)?;
                writeln!(out, "{rxn} - max rel error:")?;
                write_point(out, &metrics.max_rel)?;
                writeln!(out, "  error : {}", metrics.max_rel_percent())?;
            }
        }
    }

    for warning in &report.warnings {
        writeln!(
            out,
            "Warning: negative {} cross sections at {} energies (min {:e} b at {:e} eV)",
            warning.reaction, warning.count, warning.min_value, warning.energy_at_min
        )?;
    }
    Ok(())
}

/// Path of the JSON sidecar that accompanies a `.log` report.
pub fn sidecar_path(log_path: &Path) -> PathBuf {
    log_path.with_extension("json")
}

//! Per-file structural metadata rendered as a fixed-width table.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wmp_core::errors::WmpError;
use wmp_core::{FilenameIdentity, IdentitySource};
use wmp_data::{MultipoleEvaluator, MultipoleLibrary};

use crate::batch::discover_libraries;

const TITLE: &str = "# WMP Library Overview";
const HEADERS: [&str; 7] = [
    "Nuclide",
    "WMP File",
    "Energy Range",
    "# Poles",
    "# Windows",
    "CF Order",
    "Zero k0RS",
];
const WIDTHS: [usize; 7] = [8, 11, 28, 7, 9, 8, 9];

/// One row of the metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    /// Canonical nuclide name.
    pub nuclide: String,
    /// Source file name.
    pub file_name: String,
    /// Lower energy bound (eV).
    pub e_min: f64,
    /// Upper energy bound (eV).
    pub e_max: f64,
    /// Number of poles.
    pub poles: usize,
    /// Number of windows.
    pub windows: usize,
    /// Curve-fit order.
    pub fit_order: u32,
    /// Zero scattering-radius correction flag; `None` for legacy files.
    pub zero_radius_correction: Option<bool>,
}

impl MetadataRow {
    /// Projects a loaded library onto a table row.
    ///
    /// Fixed-width numeric file names (`092238.json`) name the nuclide;
    /// anything else falls back to the identity the library resolved itself.
    pub fn from_library(library: &MultipoleLibrary) -> Result<Self, WmpError> {
        let by_file = FilenameIdentity::new(library.path());
        let nuclide = if by_file.is_fixed_width() {
            by_file.canonical_name()?
        } else {
            library.nuclide().canonical_name()
        };
        let file_name = library
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            nuclide,
            file_name,
            e_min: library.e_min(),
            e_max: library.e_max(),
            poles: library.pole_count(),
            windows: library.window_count(),
            fit_order: library.fit_order(),
            zero_radius_correction: library.zero_radius_correction(),
        })
    }
}

/// Formats like C's `%.6e`: `1.000000e-05`.
pub fn scientific(value: f64) -> String {
    let raw = format!("{value:.6e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    }
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn push_row(out: &mut String, cells: [&str; 7]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(WIDTHS) {
        let _ = write!(out, " {cell:<width$} |");
    }
    out.push('\n');
}

/// Renders the table with its title, header and separator rows.
pub fn render_table(rows: &[MetadataRow]) -> String {
    let mut out = format!("{TITLE}\n\n");
    push_row(&mut out, HEADERS);
    let dashes = WIDTHS.map(|width| "-".repeat(width));
    push_row(&mut out, dashes.each_ref().map(String::as_str));
    for row in rows {
        let range = format!("[{}, {}]", scientific(row.e_min), scientific(row.e_max));
        let poles = row.poles.to_string();
        let windows = row.windows.to_string();
        let order = row.fit_order.to_string();
        push_row(
            &mut out,
            [
                row.nuclide.as_str(),
                row.file_name.as_str(),
                range.as_str(),
                poles.as_str(),
                windows.as_str(),
                order.as_str(),
                flag(row.zero_radius_correction),
            ],
        );
    }
    out
}

/// Persists the rendered table.
pub fn write_metadata_table(path: &Path, rows: &[MetadataRow]) -> Result<(), WmpError> {
    fs::write(path, render_table(rows)).map_err(|err| WmpError::io("summary_write", path, err))
}

/// Rows for every library in a directory plus the files that could not be
/// summarised.
#[derive(Debug, Clone, Default)]
pub struct DirectorySummary {
    /// Rows in discovery order.
    pub rows: Vec<MetadataRow>,
    /// Files skipped with the reason.
    pub skipped: Vec<(PathBuf, WmpError)>,
}

/// Summarises every `*.json` library under `dir`.
pub fn summarize_directory(dir: &Path) -> Result<DirectorySummary, WmpError> {
    let mut summary = DirectorySummary::default();
    for path in discover_libraries(dir)? {
        match MultipoleLibrary::open(&path).and_then(|library| MetadataRow::from_library(&library)) {
            Ok(row) => {
                info!(nuclide = %row.nuclide, file = %row.file_name, "summarised library");
                summary.rows.push(row);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping library");
                summary.skipped.push((path, err));
            }
        }
    }
    Ok(summary)
}

//! File-backed pointwise reference library.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::Reaction;

use crate::evaluator::PointwiseEvaluator;
use crate::serde::from_json_slice;
use crate::tabulated::Tabulated;

/// Tabulated cross section for one reaction at one temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionTable {
    /// Energies (eV).
    pub energy: Vec<f64>,
    /// Cross sections (b).
    pub xs: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPointwise {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    temperatures: Vec<String>,
    #[serde(default)]
    reactions: BTreeMap<String, BTreeMap<u32, ReactionTable>>,
}

/// Pointwise reference data for a single nuclide, keyed by temperature label
/// and MT number.
#[derive(Debug, Clone)]
pub struct PointwiseLibrary {
    path: PathBuf,
    name: Option<String>,
    temperatures: Vec<String>,
    reactions: BTreeMap<String, BTreeMap<u32, Tabulated>>,
}

impl PointwiseLibrary {
    /// Reads a reference file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WmpError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| WmpError::io("ace_read", path, err))?;
        Self::from_json(path, &bytes)
    }

    /// Parses reference bytes.
    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self, WmpError> {
        let raw: RawPointwise = from_json_slice(bytes)?;
        // Only labels backed by tables count as available temperatures.
        let mut temperatures: Vec<String> = raw
            .temperatures
            .into_iter()
            .filter(|label| raw.reactions.contains_key(label))
            .collect();
        for label in raw.reactions.keys() {
            if !temperatures.contains(label) {
                temperatures.push(label.clone());
            }
        }
        let mut reactions = BTreeMap::new();
        for (label, by_mt) in raw.reactions {
            let mut tables = BTreeMap::new();
            for (mt, table) in by_mt {
                let built = Tabulated::new(table.energy, table.xs).map_err(|err| match err {
                    WmpError::Data(info) => WmpError::Data(
                        info.with_context("mt", mt.to_string())
                            .with_context("label", label.clone())
                            .with_context("path", path.display().to_string()),
                    ),
                    other => other,
                })?;
                tables.insert(mt, built);
            }
            reactions.insert(label, tables);
        }
        debug!(
            path = %path.display(),
            temperatures = ?temperatures,
            "loaded pointwise library"
        );
        Ok(Self {
            path: path.to_path_buf(),
            name: raw.name,
            temperatures,
            reactions,
        })
    }

    /// Nuclide name recorded in the file, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Source file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PointwiseEvaluator for PointwiseLibrary {
    fn temperatures(&self) -> Vec<String> {
        self.temperatures.clone()
    }

    fn has_reaction(&self, reaction: Reaction) -> bool {
        self.reactions
            .values()
            .any(|tables| tables.contains_key(&reaction.mt()))
    }

    fn cross_section(
        &self,
        reaction: Reaction,
        label: &str,
        energy: &[f64],
    ) -> Result<Option<Vec<f64>>, WmpError> {
        if !self.has_reaction(reaction) {
            return Ok(None);
        }
        let tables = self.reactions.get(label).ok_or_else(|| {
            WmpError::MissingTemperature(
                ErrorInfo::new("ace_temperature", "reference has no data at temperature")
                    .with_context("label", label)
                    .with_context("path", self.path.display().to_string()),
            )
        })?;
        Ok(tables.get(&reaction.mt()).map(|table| table.eval_many(energy)))
    }
}

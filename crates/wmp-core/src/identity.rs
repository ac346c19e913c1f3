//! Nuclide identity and the adapters that derive it from library files.
//!
//! Multipole libraries encode identity in two ways: older files carry it in a
//! fixed-width numeric file name (`ZZZAAA[suffix]`), newer files carry a name
//! attribute. Both adapters resolve to the same [`NuclideId`], and the
//! canonical string is always produced by [`NuclideId::canonical_name`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::elements;
use crate::errors::{ErrorInfo, WmpError};

fn identity_error(code: &str, message: impl Into<String>, input: &str) -> WmpError {
    WmpError::Identity(ErrorInfo::new(code, message).with_context("input", input))
}

/// Physical identity of a nuclide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NuclideId {
    z: u32,
    a: u32,
    metastable: Option<u32>,
}

impl NuclideId {
    /// Creates an identity, rejecting atomic numbers without a known symbol.
    pub fn new(z: u32, a: u32, metastable: Option<u32>) -> Result<Self, WmpError> {
        if elements::symbol(z).is_none() {
            return Err(WmpError::Identity(
                ErrorInfo::new("unknown_element", "atomic number has no element symbol")
                    .with_context("z", z.to_string()),
            ));
        }
        let metastable = metastable.filter(|state| *state > 0);
        Ok(Self { z, a, metastable })
    }

    /// Atomic number.
    pub fn z(&self) -> u32 {
        self.z
    }

    /// Mass number.
    pub fn a(&self) -> u32 {
        self.a
    }

    /// Metastable state index, `None` for the ground state.
    pub fn metastable(&self) -> Option<u32> {
        self.metastable
    }

    /// Canonical name such as `U238` or `Am242_m1`.
    pub fn canonical_name(&self) -> String {
        // `new` guarantees the symbol exists.
        let symbol = elements::symbol(self.z).unwrap_or("X");
        match self.metastable {
            Some(state) => format!("{symbol}{}_m{state}", self.a),
            None => format!("{symbol}{}", self.a),
        }
    }
}

impl fmt::Display for NuclideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

impl FromStr for NuclideId {
    type Err = WmpError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (base, suffix) = match input.split_once('_') {
            Some((base, suffix)) => (base, Some(suffix)),
            None => (input, None),
        };
        let digits_at = base
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| identity_error("name_mass", "name has no mass number", input))?;
        let (symbol, mass) = base.split_at(digits_at);
        let z = elements::atomic_number(symbol)
            .ok_or_else(|| identity_error("name_symbol", "unknown element symbol", input))?;
        let a = mass
            .parse::<u32>()
            .map_err(|_| identity_error("name_mass", "mass number is not numeric", input))?;
        let metastable = match suffix {
            Some(suffix) => Some(parse_metastable(suffix, input)?),
            None => None,
        };
        NuclideId::new(z, a, metastable)
    }
}

fn parse_metastable(suffix: &str, input: &str) -> Result<u32, WmpError> {
    let digits = suffix
        .trim_start_matches('_')
        .strip_prefix('m')
        .ok_or_else(|| identity_error("metastable", "suffix must look like m<N>", input))?;
    digits
        .parse::<u32>()
        .map_err(|_| identity_error("metastable", "metastable index is not numeric", input))
}

/// Anything that can yield a nuclide identity.
pub trait IdentitySource {
    /// Derives the nuclide identity.
    fn nuclide_id(&self) -> Result<NuclideId, WmpError>;

    /// Derives the canonical name through [`NuclideId::canonical_name`].
    fn canonical_name(&self) -> Result<String, WmpError> {
        self.nuclide_id().map(|id| id.canonical_name())
    }
}

/// Identity encoded in a fixed-width file name: three digits of atomic
/// number, three digits of mass number, then an optional metastable suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameIdentity {
    path: PathBuf,
}

impl FilenameIdentity {
    /// Wraps a library file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns true when the file stem starts with six ASCII digits.
    pub fn is_fixed_width(&self) -> bool {
        self.stem()
            .map(|stem| stem.len() >= 6 && stem.bytes().take(6).all(|b| b.is_ascii_digit()))
            .unwrap_or(false)
    }

    fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }
}

impl IdentitySource for FilenameIdentity {
    fn nuclide_id(&self) -> Result<NuclideId, WmpError> {
        let display = self.path.display().to_string();
        let stem = self
            .stem()
            .ok_or_else(|| identity_error("filename_stem", "path has no file stem", &display))?;
        if !self.is_fixed_width() {
            return Err(identity_error(
                "filename_width",
                "file name does not start with ZZZAAA digits",
                &display,
            ));
        }
        let z = stem[0..3]
            .parse::<u32>()
            .map_err(|_| identity_error("filename_z", "atomic number field", &display))?;
        let a = stem[3..6]
            .parse::<u32>()
            .map_err(|_| identity_error("filename_a", "mass number field", &display))?;
        let suffix = &stem[6..];
        let metastable = if suffix.is_empty() {
            None
        } else {
            Some(parse_metastable(suffix, &display)?)
        };
        NuclideId::new(z, a, metastable)
    }
}

/// Identity supplied by the library itself as a name attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIdentity {
    name: String,
}

impl NameIdentity {
    /// Wraps a library-supplied name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl IdentitySource for NameIdentity {
    fn nuclide_id(&self) -> Result<NuclideId, WmpError> {
        self.name.parse()
    }
}

//! Canonical reaction channels and multipole output conventions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical reaction channels compared by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    /// MT 1.
    Total,
    /// MT 2.
    Elastic,
    /// MT 27.
    Absorption,
    /// MT 18.
    Fission,
}

impl Reaction {
    /// Canonical ordering used for reports and plots.
    pub const ALL: [Reaction; 4] = [
        Reaction::Total,
        Reaction::Elastic,
        Reaction::Absorption,
        Reaction::Fission,
    ];

    /// ENDF MT number identifying the reaction in pointwise data.
    pub fn mt(self) -> u32 {
        match self {
            Reaction::Total => 1,
            Reaction::Elastic => 2,
            Reaction::Fission => 18,
            Reaction::Absorption => 27,
        }
    }

    /// Looks up a canonical reaction by MT number.
    pub fn from_mt(mt: u32) -> Option<Self> {
        Reaction::ALL.into_iter().find(|reaction| reaction.mt() == mt)
    }

    /// Lower-case label used in file names and reports.
    pub fn label(self) -> &'static str {
        match self {
            Reaction::Total => "total",
            Reaction::Elastic => "elastic",
            Reaction::Absorption => "absorption",
            Reaction::Fission => "fission",
        }
    }

    /// Position of the reaction in [`Reaction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Reaction::Total => 0,
            Reaction::Elastic => 1,
            Reaction::Absorption => 2,
            Reaction::Fission => 3,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Layout of the three rows a multipole evaluator returns.
///
/// Total is elastic plus absorption and fission is part of absorption, so an
/// evaluator only ever reports three independent rows. Library revisions
/// disagree on which three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// Rows are (elastic, absorption, fission); total is derived.
    #[default]
    ElasticAbsorptionFission,
    /// Rows are (total, absorption, fission); elastic is derived.
    TotalAbsorptionFission,
}

impl Convention {
    /// Reaction reported in the first row.
    pub fn leading(self) -> Reaction {
        match self {
            Convention::ElasticAbsorptionFission => Reaction::Elastic,
            Convention::TotalAbsorptionFission => Reaction::Total,
        }
    }

    /// Reaction the resolver must derive.
    pub fn derived(self) -> Reaction {
        match self {
            Convention::ElasticAbsorptionFission => Reaction::Total,
            Convention::TotalAbsorptionFission => Reaction::Elastic,
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::ElasticAbsorptionFission => f.write_str("elastic/absorption/fission"),
            Convention::TotalAbsorptionFission => f.write_str("total/absorption/fission"),
        }
    }
}

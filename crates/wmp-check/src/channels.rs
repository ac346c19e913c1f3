//! Reconciles evaluator outputs into the canonical channel set.

use serde::{Deserialize, Serialize};
use tracing::warn;
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::{Convention, Reaction};
use wmp_data::{ChannelTriple, MultipoleEvaluator, PointwiseEvaluator};

use crate::grid::EnergyGrid;

fn length_error(reaction: Reaction, expected: usize, found: usize) -> WmpError {
    WmpError::Data(
        ErrorInfo::new("curve_length", "curve length does not match the energy grid")
            .with_context("reaction", reaction.label())
            .with_context("expected", expected.to_string())
            .with_context("found", found.to_string()),
    )
}

/// Cross sections for one reaction, aligned with an [`EnergyGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionCurve {
    reaction: Reaction,
    values: Vec<f64>,
}

impl ReactionCurve {
    /// Tags a value vector with its reaction.
    pub fn new(reaction: Reaction, values: Vec<f64>) -> Self {
        Self { reaction, values }
    }

    /// Reaction the values belong to.
    pub fn reaction(&self) -> Reaction {
        self.reaction
    }

    /// Cross sections, one per grid energy.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// True when every value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|value| *value == 0.0)
    }
}

/// The four canonical curves of one evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSet {
    curves: [ReactionCurve; 4],
}

impl ReactionSet {
    /// Assembles a set from per-reaction values.
    pub fn new(total: Vec<f64>, elastic: Vec<f64>, absorption: Vec<f64>, fission: Vec<f64>) -> Self {
        Self {
            curves: [
                ReactionCurve::new(Reaction::Total, total),
                ReactionCurve::new(Reaction::Elastic, elastic),
                ReactionCurve::new(Reaction::Absorption, absorption),
                ReactionCurve::new(Reaction::Fission, fission),
            ],
        }
    }

    /// Curve for a reaction.
    pub fn get(&self, reaction: Reaction) -> &ReactionCurve {
        &self.curves[reaction.index()]
    }

    /// Curves in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &ReactionCurve> {
        self.curves.iter()
    }
}

/// Negative values found in a candidate channel. Reported, never corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeCrossSectionWarning {
    /// Affected channel.
    pub reaction: Reaction,
    /// Number of grid energies with a negative value.
    pub count: usize,
    /// Most negative value.
    pub min_value: f64,
    /// Energy of the most negative value.
    pub energy_at_min: f64,
}

/// Canonical candidate channels plus the diagnostics found while building them.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateChannels {
    /// Canonical curves.
    pub set: ReactionSet,
    /// Layout the evaluator rows were read with.
    pub convention: Convention,
    /// Channels containing negative values.
    pub warnings: Vec<NegativeCrossSectionWarning>,
}

/// Maps native evaluator outputs onto {total, elastic, absorption, fission}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelResolver {
    default_convention: Convention,
}

impl ChannelResolver {
    /// Resolver that assumes `default_convention` for evaluators that do not
    /// declare their own.
    pub fn new(default_convention: Convention) -> Self {
        Self { default_convention }
    }

    /// Layout in effect for an evaluator.
    pub fn convention_for(&self, evaluator: &dyn MultipoleEvaluator) -> Convention {
        evaluator.convention().unwrap_or(self.default_convention)
    }

    /// Evaluates a multipole library over the grid and reconciles its rows.
    pub fn resolve_candidate(
        &self,
        evaluator: &dyn MultipoleEvaluator,
        grid: &EnergyGrid,
        temperature: f64,
    ) -> Result<CandidateChannels, WmpError> {
        let convention = self.convention_for(evaluator);
        let triple = evaluator.evaluate(grid.as_slice(), temperature)?;
        self.resolve_triple(convention, triple, grid)
    }

    /// Reconciles three raw rows laid out per `convention`.
    ///
    /// The derived channel always comes from the other two rows. Under
    /// [`Convention::TotalAbsorptionFission`] the stored total is re-formed as
    /// `elastic + absorption` after deriving elastic, so the closure
    /// `total == elastic + absorption` is exact in both layouts.
    pub fn resolve_triple(
        &self,
        convention: Convention,
        triple: ChannelTriple,
        grid: &EnergyGrid,
    ) -> Result<CandidateChannels, WmpError> {
        let [leading, absorption, fission] = triple;
        let expected = grid.len();
        for (reaction, row) in [
            (convention.leading(), &leading),
            (Reaction::Absorption, &absorption),
            (Reaction::Fission, &fission),
        ] {
            if row.len() != expected {
                return Err(length_error(reaction, expected, row.len()));
            }
        }

        let set = match convention {
            Convention::ElasticAbsorptionFission => {
                let total = leading
                    .iter()
                    .zip(&absorption)
                    .map(|(elastic, absorption)| elastic + absorption)
                    .collect();
                ReactionSet::new(total, leading, absorption, fission)
            }
            Convention::TotalAbsorptionFission => {
                let elastic: Vec<f64> = leading
                    .iter()
                    .zip(&absorption)
                    .map(|(total, absorption)| total - absorption)
                    .collect();
                let total = elastic
                    .iter()
                    .zip(&absorption)
                    .map(|(elastic, absorption)| elastic + absorption)
                    .collect();
                ReactionSet::new(total, elastic, absorption, fission)
            }
        };

        let warnings = negative_warnings(&set, grid);
        for warning in &warnings {
            warn!(
                reaction = %warning.reaction,
                count = warning.count,
                min_value = warning.min_value,
                energy = warning.energy_at_min,
                "negative cross sections in multipole library"
            );
        }
        Ok(CandidateChannels {
            set,
            convention,
            warnings,
        })
    }

    /// Queries each canonical reaction from the reference directly; reactions
    /// absent from the source are zero-filled.
    pub fn resolve_reference(
        &self,
        evaluator: &dyn PointwiseEvaluator,
        grid: &EnergyGrid,
        label: &str,
    ) -> Result<ReactionSet, WmpError> {
        let mut curves: [Vec<f64>; 4] = Default::default();
        for reaction in Reaction::ALL {
            let values = match evaluator.cross_section(reaction, label, grid.as_slice())? {
                Some(values) if values.len() != grid.len() => {
                    return Err(length_error(reaction, grid.len(), values.len()));
                }
                Some(values) => values,
                None => vec![0.0; grid.len()],
            };
            curves[reaction.index()] = values;
        }
        let [total, elastic, absorption, fission] = curves;
        Ok(ReactionSet::new(total, elastic, absorption, fission))
    }
}

fn negative_warnings(set: &ReactionSet, grid: &EnergyGrid) -> Vec<NegativeCrossSectionWarning> {
    set.iter()
        .filter_map(|curve| {
            let mut count = 0;
            let mut min_idx = 0;
            for (idx, value) in curve.values().iter().enumerate() {
                if *value < 0.0 {
                    if count == 0 || *value < curve.values()[min_idx] {
                        min_idx = idx;
                    }
                    count += 1;
                }
            }
            (count > 0).then(|| NegativeCrossSectionWarning {
                reaction: curve.reaction(),
                count,
                min_value: curve.values()[min_idx],
                energy_at_min: grid.energy(min_idx),
            })
        })
        .collect()
}

//! Narrow interfaces to the two physics evaluators the engine compares.

use wmp_core::{Convention, NuclideId, Reaction, WmpError};

/// Three rows returned by a multipole evaluator, laid out per [`Convention`].
pub type ChannelTriple = [Vec<f64>; 3];

/// Windowed multipole evaluator for a single nuclide.
pub trait MultipoleEvaluator {
    /// Canonical identity of the nuclide.
    fn nuclide(&self) -> NuclideId;

    /// Lowest energy (eV) the representation is valid for.
    fn e_min(&self) -> f64;

    /// Highest energy (eV) the representation is valid for.
    fn e_max(&self) -> f64;

    /// Number of energy windows.
    fn window_count(&self) -> usize;

    /// Order of the background curve fit.
    fn fit_order(&self) -> u32;

    /// Whether the nuclide has a fission channel.
    fn fissionable(&self) -> bool;

    /// Row layout declared by the evaluator, when it declares one.
    fn convention(&self) -> Option<Convention> {
        None
    }

    /// Evaluates the three independent rows at `temperature` kelvin.
    fn evaluate(&self, energy: &[f64], temperature: f64) -> Result<ChannelTriple, WmpError>;
}

/// Pointwise reference evaluator for a single nuclide.
pub trait PointwiseEvaluator {
    /// Temperature labels (e.g. `294K`) with data.
    fn temperatures(&self) -> Vec<String>;

    /// Whether the reaction is present at any temperature.
    fn has_reaction(&self, reaction: Reaction) -> bool;

    /// Cross section for `reaction` at the labelled temperature, `None` when
    /// the reaction is absent from the source.
    fn cross_section(
        &self,
        reaction: Reaction,
        label: &str,
        energy: &[f64],
    ) -> Result<Option<Vec<f64>>, WmpError>;
}

/// Rounded-kelvin label used to key temperature data, e.g. `294K` for 293.75.
///
/// Halves round to even so labels agree with the tooling that produced the
/// reference libraries.
pub fn temperature_label(kelvin: f64) -> String {
    format!("{}K", kelvin.round_ties_even() as i64)
}

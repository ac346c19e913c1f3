#![deny(missing_docs)]
#![doc = "Evaluator interfaces and the file-backed multipole and pointwise libraries consumed by the validation engine."]

/// Evaluator traits and temperature labelling.
pub mod evaluator;
/// Windowed multipole library files.
pub mod multipole;
/// Pointwise reference library files.
pub mod pointwise;
/// Canonical JSON serde helpers.
pub mod serde;
/// Piecewise-linear tables.
pub mod tabulated;

pub use evaluator::{temperature_label, ChannelTriple, MultipoleEvaluator, PointwiseEvaluator};
pub use multipole::{legacy_window_count, MultipoleLibrary, SampleTable, SchemaRevision};
pub use pointwise::{PointwiseLibrary, ReactionTable};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
pub use tabulated::Tabulated;

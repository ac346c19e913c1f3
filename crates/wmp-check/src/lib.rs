#![deny(missing_docs)]
#![doc = "Cross-section comparison engine: energy grids, channel reconciliation, error metrics, per-nuclide runs and their artefacts."]

/// Sequential batch driver.
pub mod batch;
/// Channel reconciliation across row conventions.
pub mod channels;
/// Validation settings.
pub mod config;
/// Logarithmic energy grids.
pub mod grid;
/// File digests for provenance.
pub mod hash;
/// Error curves and maxima.
pub mod metrics;
/// SVG chart rendering.
pub mod plot;
/// Text and JSON reports.
pub mod report;
/// Per-nuclide state machine.
pub mod run;
/// Library metadata tables.
pub mod summary;

pub use batch::{discover_libraries, run_batch, run_one, BatchPaths, BatchSummary};
pub use channels::{
    CandidateChannels, ChannelResolver, NegativeCrossSectionWarning, ReactionCurve, ReactionSet,
};
pub use config::{load_config, PlotConfig, ValidationConfig};
pub use grid::EnergyGrid;
pub use hash::file_sha256;
pub use metrics::{
    compare, error_curves, ChannelComparison, ChannelMetrics, ChannelReport, ErrorCurves,
    ErrorPoint, DEFAULT_ABS_THRESHOLD,
};
pub use plot::{render_svg, PlotRenderer, PlotRequest, SvgPlotRenderer};
pub use report::{
    render_text, sidecar_path, ChannelEntry, NuclideReport, ReportWriter, RunHeader,
    TextReportWriter,
};
pub use run::{NuclideOutcome, RunArtefacts, RunFailure, RunSources, RunState, ValidationRun};
pub use summary::{
    render_table, scientific, summarize_directory, write_metadata_table, DirectorySummary,
    MetadataRow,
};

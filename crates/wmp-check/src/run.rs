//! Per-nuclide validation state machine.
//!
//! A run moves strictly forward through
//! `Init -> GridBuilt -> ChannelsResolved -> MetricsComputed -> Reported -> Done`.
//! Each step checks the transition before doing any work, so a failed step
//! leaves the run in the last state it actually reached.

use std::fmt;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wmp_core::errors::{ErrorInfo, WmpError};
use wmp_core::Reaction;
use wmp_data::{MultipoleEvaluator, PointwiseEvaluator};

use crate::channels::{CandidateChannels, ChannelResolver, ReactionSet};
use crate::config::ValidationConfig;
use crate::grid::EnergyGrid;
use crate::metrics::{compare, ChannelComparison, ChannelReport};
use crate::plot::{PlotRenderer, PlotRequest};
use crate::report::{ChannelEntry, NuclideReport, ReportWriter, RunHeader};

/// Progress of a single nuclide run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing done yet.
    Init,
    /// Energy grid built.
    GridBuilt,
    /// Candidate and reference channel sets resolved.
    ChannelsResolved,
    /// Per-channel metrics computed.
    MetricsComputed,
    /// Report (and plots) written.
    Reported,
    /// Run complete.
    Done,
}

impl RunState {
    /// The only state reachable from `self`.
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::Init => Some(RunState::GridBuilt),
            RunState::GridBuilt => Some(RunState::ChannelsResolved),
            RunState::ChannelsResolved => Some(RunState::MetricsComputed),
            RunState::MetricsComputed => Some(RunState::Reported),
            RunState::Reported => Some(RunState::Done),
            RunState::Done => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Init => "init",
            RunState::GridBuilt => "grid_built",
            RunState::ChannelsResolved => "channels_resolved",
            RunState::MetricsComputed => "metrics_computed",
            RunState::Reported => "reported",
            RunState::Done => "done",
        };
        f.write_str(label)
    }
}

/// Files a run reads, with their digests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSources {
    /// Multipole library path.
    pub wmp_path: PathBuf,
    /// Reference library path.
    pub ace_path: PathBuf,
    /// SHA-256 of the multipole library.
    pub wmp_sha256: String,
    /// SHA-256 of the reference library.
    pub ace_sha256: String,
}

/// A nuclide run that stopped early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Canonical nuclide name, or the file name when identity failed.
    pub nuclide: String,
    /// Last state the run reached.
    pub state: RunState,
    /// Cause.
    pub error: WmpError,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed after {}: {}", self.nuclide, self.state, self.error)
    }
}

/// How one nuclide ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NuclideOutcome {
    /// Report written.
    Complete {
        /// Canonical nuclide name.
        nuclide: String,
        /// Path of the text report.
        report: PathBuf,
        /// Paths of the rendered plots.
        plots: Vec<PathBuf>,
    },
    /// Run aborted.
    Failed(RunFailure),
}

impl NuclideOutcome {
    /// Nuclide the outcome belongs to.
    pub fn nuclide(&self) -> &str {
        match self {
            NuclideOutcome::Complete { nuclide, .. } => nuclide,
            NuclideOutcome::Failed(failure) => &failure.nuclide,
        }
    }

    /// True for completed runs.
    pub fn is_complete(&self) -> bool {
        matches!(self, NuclideOutcome::Complete { .. })
    }
}

/// Artefacts produced by the reporting step.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArtefacts {
    /// Report contents.
    pub report: NuclideReport,
    /// Text report path.
    pub report_path: PathBuf,
    /// Plot paths, one per compared channel when plotting is enabled.
    pub plots: Vec<PathBuf>,
}

/// Validation of one nuclide against its reference.
pub struct ValidationRun<'a> {
    config: &'a ValidationConfig,
    candidate: &'a dyn MultipoleEvaluator,
    reference: &'a dyn PointwiseEvaluator,
    sources: RunSources,
    nuclide: String,
    state: RunState,
    grid: Option<EnergyGrid>,
    candidate_channels: Option<CandidateChannels>,
    reference_set: Option<ReactionSet>,
    comparisons: Vec<ChannelComparison>,
    artefacts: Option<RunArtefacts>,
}

impl<'a> ValidationRun<'a> {
    /// New run in [`RunState::Init`].
    pub fn new(
        config: &'a ValidationConfig,
        candidate: &'a dyn MultipoleEvaluator,
        reference: &'a dyn PointwiseEvaluator,
        sources: RunSources,
    ) -> Self {
        Self {
            config,
            candidate,
            reference,
            sources,
            nuclide: candidate.nuclide().canonical_name(),
            state: RunState::Init,
            grid: None,
            candidate_channels: None,
            reference_set: None,
            comparisons: Vec::new(),
            artefacts: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Canonical nuclide name.
    pub fn nuclide(&self) -> &str {
        &self.nuclide
    }

    /// Grid, once built.
    pub fn grid(&self) -> Option<&EnergyGrid> {
        self.grid.as_ref()
    }

    /// Per-channel comparisons, once computed.
    pub fn comparisons(&self) -> &[ChannelComparison] {
        &self.comparisons
    }

    fn check_transition(&self, to: RunState) -> Result<(), WmpError> {
        if self.state.next() == Some(to) {
            Ok(())
        } else {
            Err(WmpError::State(
                ErrorInfo::new("run_transition", "out-of-order validation step")
                    .with_context("nuclide", self.nuclide.clone())
                    .with_context("from", self.state.to_string())
                    .with_context("to", to.to_string()),
            ))
        }
    }

    fn missing(&self, what: &str) -> WmpError {
        WmpError::State(
            ErrorInfo::new("run_incomplete", format!("{what} not available"))
                .with_context("nuclide", self.nuclide.clone())
                .with_context("state", self.state.to_string()),
        )
    }

    /// Checks the temperature precondition and builds the energy grid.
    pub fn build_grid(&mut self) -> Result<&EnergyGrid, WmpError> {
        self.check_transition(RunState::GridBuilt)?;
        let label = self.config.temperature_label();
        let available = self.reference.temperatures();
        if !available.iter().any(|candidate| *candidate == label) {
            return Err(WmpError::MissingTemperature(
                ErrorInfo::new("ace_temperature", "reference data has no such temperature")
                    .with_context("nuclide", self.nuclide.clone())
                    .with_context("label", label)
                    .with_context("available", available.join(","))
                    .with_context("path", self.sources.ace_path.display().to_string()),
            ));
        }
        let grid = EnergyGrid::log_spaced(
            self.candidate.e_min(),
            self.candidate.e_max(),
            self.config.grid_points,
        )?;
        self.state = RunState::GridBuilt;
        Ok(self.grid.insert(grid))
    }

    /// Evaluates both sources over the grid and reconciles their channels.
    pub fn resolve_channels(&mut self) -> Result<(), WmpError> {
        self.check_transition(RunState::ChannelsResolved)?;
        let grid = self.grid.as_ref().ok_or_else(|| self.missing("grid"))?;
        let resolver = ChannelResolver::new(self.config.default_convention);
        let candidate =
            resolver.resolve_candidate(self.candidate, grid, self.config.temperature)?;
        let reference =
            resolver.resolve_reference(self.reference, grid, &self.config.temperature_label())?;
        debug!(
            nuclide = %self.nuclide,
            convention = %candidate.convention,
            warnings = candidate.warnings.len(),
            "resolved channels"
        );
        self.candidate_channels = Some(candidate);
        self.reference_set = Some(reference);
        self.state = RunState::ChannelsResolved;
        Ok(())
    }

    /// Compares every canonical channel.
    pub fn compute_metrics(&mut self) -> Result<&[ChannelComparison], WmpError> {
        self.check_transition(RunState::MetricsComputed)?;
        let grid = self.grid.as_ref().ok_or_else(|| self.missing("grid"))?;
        let candidate = self
            .candidate_channels
            .as_ref()
            .ok_or_else(|| self.missing("candidate channels"))?;
        let reference = self
            .reference_set
            .as_ref()
            .ok_or_else(|| self.missing("reference channels"))?;

        let mut comparisons = Vec::with_capacity(Reaction::ALL.len());
        for reaction in Reaction::ALL {
            let comparison = compare(
                candidate.set.get(reaction),
                reference.get(reaction),
                grid,
                self.config.abs_threshold,
            )?;
            match &comparison.report {
                ChannelReport::Skipped => {
                    warn!(nuclide = %self.nuclide, reaction = %reaction, "no reference data, channel skipped");
                }
                ChannelReport::Compared(metrics) => {
                    info!(
                        nuclide = %self.nuclide,
                        reaction = %reaction,
                        max_abs = metrics.max_abs.error,
                        max_rel = %metrics.max_rel_percent(),
                        "compared channel"
                    );
                }
            }
            comparisons.push(comparison);
        }
        self.comparisons = comparisons;
        self.state = RunState::MetricsComputed;
        Ok(&self.comparisons)
    }

    /// Assembles the report without writing it.
    fn assemble_report(&self) -> Result<NuclideReport, WmpError> {
        let grid = self.grid.as_ref().ok_or_else(|| self.missing("grid"))?;
        let candidate = self
            .candidate_channels
            .as_ref()
            .ok_or_else(|| self.missing("candidate channels"))?;
        let header = RunHeader {
            nuclide: self.nuclide.clone(),
            wmp_path: self.sources.wmp_path.clone(),
            ace_path: self.sources.ace_path.clone(),
            e_min: self.candidate.e_min(),
            e_max: self.candidate.e_max(),
            window_count: self.candidate.window_count(),
            fissionable: self.candidate.fissionable(),
            test_range: [grid.first(), grid.last()],
            grid_points: grid.len(),
            temperature: self.config.temperature,
            temperature_tag: self.config.temperature_tag(),
            convention: candidate.convention,
            wmp_sha256: self.sources.wmp_sha256.clone(),
            ace_sha256: self.sources.ace_sha256.clone(),
        };
        Ok(NuclideReport {
            header,
            channels: self
                .comparisons
                .iter()
                .map(|comparison| ChannelEntry {
                    reaction: comparison.reaction,
                    report: comparison.report,
                })
                .collect(),
            warnings: candidate.warnings.clone(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }

    /// Renders one plot per compared channel when a renderer is given, then
    /// writes the report. A failed plot leaves no report behind.
    pub fn report(
        &mut self,
        writer: &dyn ReportWriter,
        plotter: Option<&dyn PlotRenderer>,
    ) -> Result<&RunArtefacts, WmpError> {
        self.check_transition(RunState::Reported)?;
        let report = self.assemble_report()?;

        let mut plots = Vec::new();
        if let Some(plotter) = plotter {
            let grid = self.grid.as_ref().ok_or_else(|| self.missing("grid"))?;
            let candidate = self
                .candidate_channels
                .as_ref()
                .ok_or_else(|| self.missing("candidate channels"))?;
            let reference = self
                .reference_set
                .as_ref()
                .ok_or_else(|| self.missing("reference channels"))?;
            let tag = self.config.temperature_tag();
            for comparison in &self.comparisons {
                let Some(curves) = &comparison.curves else {
                    continue;
                };
                let request = PlotRequest {
                    nuclide: &self.nuclide,
                    reaction: comparison.reaction,
                    temperature_tag: &tag,
                    energy: grid.as_slice(),
                    candidate: candidate.set.get(comparison.reaction).values(),
                    reference: reference.get(comparison.reaction).values(),
                    relative: &curves.relative,
                };
                plots.push(plotter.render(&request)?);
            }
        }
        let report_path = writer.write(&report)?;

        info!(nuclide = %self.nuclide, report = %report_path.display(), plots = plots.len(), "report written");
        self.state = RunState::Reported;
        Ok(self.artefacts.insert(RunArtefacts {
            report,
            report_path,
            plots,
        }))
    }

    /// Closes the run and hands back its artefacts.
    pub fn finish(mut self) -> Result<RunArtefacts, WmpError> {
        self.check_transition(RunState::Done)?;
        let artefacts = self.artefacts.take().ok_or_else(|| self.missing("report"))?;
        self.state = RunState::Done;
        Ok(artefacts)
    }

    fn run_steps(
        &mut self,
        writer: &dyn ReportWriter,
        plotter: Option<&dyn PlotRenderer>,
    ) -> Result<(), WmpError> {
        self.build_grid()?;
        self.resolve_channels()?;
        self.compute_metrics()?;
        self.report(writer, plotter)?;
        Ok(())
    }

    /// Runs every step in order, converting the first error into a
    /// [`RunFailure`] stamped with the state reached.
    pub fn execute(
        mut self,
        writer: &dyn ReportWriter,
        plotter: Option<&dyn PlotRenderer>,
    ) -> Result<RunArtefacts, RunFailure> {
        match self.run_steps(writer, plotter) {
            Ok(()) => {
                let nuclide = self.nuclide.clone();
                self.finish().map_err(|error| RunFailure {
                    nuclide,
                    state: RunState::Reported,
                    error,
                })
            }
            Err(error) => Err(RunFailure {
                nuclide: self.nuclide.clone(),
                state: self.state,
                error,
            }),
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::tempdir;
use wmp_check::{
    run_batch, BatchPaths, ChannelReport, NuclideOutcome, PlotRenderer, PlotRequest, RunSources,
    RunState, TextReportWriter, ValidationConfig, ValidationRun,
};
use wmp_core::{ErrorInfo, Reaction, WmpError};
use wmp_data::{MultipoleLibrary, PointwiseLibrary};

fn wmp_payload(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "E_min": 1.0,
        "E_max": 100.0,
        "windows": [[1, 1]],
        "data": [[0.0, 0.0]],
        "fit_order": 2,
        "fissionable": true,
        "pseudo_k0rs": [0.0],
        "samples": {
            "294K": {
                "energy": [1.0, 100.0],
                "channels": [[10.0, 10.0], [5.0, 5.0], [1.0, 1.0]]
            }
        }
    })
}

fn ace_payload(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "temperatures": ["294K"],
        "reactions": {
            "294K": {
                "1": {"energy": [1.0, 100.0], "xs": [15.5, 15.5]},
                "2": {"energy": [1.0, 100.0], "xs": [10.0, 10.0]},
                "27": {"energy": [1.0, 100.0], "xs": [5.5, 5.5]}
            }
        }
    })
}

fn write_json(path: &Path, payload: &serde_json::Value) {
    fs::write(path, serde_json::to_vec_pretty(payload).unwrap()).unwrap();
}

fn small_config() -> ValidationConfig {
    ValidationConfig {
        grid_points: 50,
        ..ValidationConfig::default()
    }
}

fn in_memory() -> (MultipoleLibrary, PointwiseLibrary) {
    let wmp = MultipoleLibrary::from_json(
        Path::new("092235.json"),
        &serde_json::to_vec(&wmp_payload("U235")).unwrap(),
    )
    .unwrap();
    let ace = PointwiseLibrary::from_json(
        Path::new("U235.json"),
        &serde_json::to_vec(&ace_payload("U235")).unwrap(),
    )
    .unwrap();
    (wmp, ace)
}

#[test]
fn fission_absent_from_reference_is_skipped_alone() {
    let out = tempdir().unwrap();
    let (wmp, ace) = in_memory();
    let config = small_config();
    let artefacts = ValidationRun::new(&config, &wmp, &ace, RunSources::default())
        .execute(&TextReportWriter::new(out.path()), None)
        .expect("run completes");

    let channels = &artefacts.report.channels;
    assert_eq!(channels.len(), 4);
    for entry in channels {
        match entry.reaction {
            Reaction::Fission => assert_eq!(entry.report, ChannelReport::Skipped),
            _ => assert!(entry.report.metrics().is_some(), "{} compared", entry.reaction),
        }
    }
    let absorption = channels[Reaction::Absorption.index()].report.metrics().unwrap();
    assert!((absorption.max_abs.error - 0.5).abs() < 1e-12);
    assert!(artefacts.plots.is_empty());

    let log = fs::read_to_string(&artefacts.report_path).unwrap();
    assert!(log.contains("fission - skipped: no reference data"));
    assert!(log.contains("Test temperature: 293.75 K"));
    assert!(artefacts.report_path.ends_with("U235_293.75K_validation.log"));
}

#[test]
fn missing_temperature_stops_before_the_grid() {
    let out = tempdir().unwrap();
    let (wmp, ace) = in_memory();
    let config = ValidationConfig {
        temperature: 600.0,
        ..small_config()
    };
    let failure = ValidationRun::new(&config, &wmp, &ace, RunSources::default())
        .execute(&TextReportWriter::new(out.path()), None)
        .unwrap_err();
    assert_eq!(failure.nuclide, "U235");
    assert_eq!(failure.state, RunState::Init);
    assert!(matches!(failure.error, WmpError::MissingTemperature(_)));
}

#[test]
fn listed_label_without_tables_fails_the_precondition() {
    let out = tempdir().unwrap();
    let (wmp, _) = in_memory();
    let payload = json!({
        "name": "U235",
        "temperatures": ["294K", "600K"],
        "reactions": {
            "600K": {"1": {"energy": [1.0, 100.0], "xs": [15.5, 15.5]}}
        }
    });
    let ace =
        PointwiseLibrary::from_json(Path::new("U235.json"), &serde_json::to_vec(&payload).unwrap())
            .unwrap();
    let config = small_config();
    let failure = ValidationRun::new(&config, &wmp, &ace, RunSources::default())
        .execute(&TextReportWriter::new(out.path()), None)
        .unwrap_err();
    assert_eq!(failure.state, RunState::Init);
    assert!(matches!(failure.error, WmpError::MissingTemperature(_)));
    assert_eq!(failure.error.info().context["available"], "600K");
}

struct BrokenRenderer;

impl PlotRenderer for BrokenRenderer {
    fn render(&self, request: &PlotRequest<'_>) -> Result<PathBuf, WmpError> {
        Err(WmpError::Io(
            ErrorInfo::new("plot_write", "disk full")
                .with_context("reaction", request.reaction.to_string()),
        ))
    }
}

#[test]
fn failed_plot_leaves_no_report_behind() {
    let out = tempdir().unwrap();
    let (wmp, ace) = in_memory();
    let config = small_config();
    let failure = ValidationRun::new(&config, &wmp, &ace, RunSources::default())
        .execute(&TextReportWriter::new(out.path()), Some(&BrokenRenderer as &dyn PlotRenderer))
        .unwrap_err();
    assert_eq!(failure.state, RunState::MetricsComputed);
    assert_eq!(failure.error.info().code, "plot_write");
    assert!(!out.path().join("U235_293.75K_validation.log").exists());
    assert!(!out.path().join("U235_293.75K_validation.json").exists());
}

#[test]
fn reference_naming_another_nuclide_is_rejected() {
    let root = tempdir().unwrap();
    let wmp_dir = root.path().join("wmp");
    let ace_dir = root.path().join("ace");
    fs::create_dir_all(&wmp_dir).unwrap();
    fs::create_dir_all(&ace_dir).unwrap();
    write_json(&wmp_dir.join("092235.json"), &wmp_payload("U235"));
    write_json(&ace_dir.join("U235.json"), &ace_payload("U238"));

    let paths = BatchPaths::resolve(&wmp_dir, None, &ace_dir, &root.path().join("out")).unwrap();
    let summary = run_batch(&paths, &small_config()).unwrap();
    assert_eq!(summary.failed, 1);
    match &summary.outcomes[0] {
        NuclideOutcome::Failed(failure) => {
            assert_eq!(failure.state, RunState::Init);
            assert_eq!(failure.error.info().code, "ace_identity");
            assert_eq!(failure.error.info().context["recorded"], "U238");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn steps_cannot_run_out_of_order() {
    let (wmp, ace) = in_memory();
    let config = small_config();
    let mut run = ValidationRun::new(&config, &wmp, &ace, RunSources::default());
    let err = run.compute_metrics().unwrap_err();
    assert!(matches!(err, WmpError::State(_)));
    assert_eq!(run.state(), RunState::Init);

    run.build_grid().unwrap();
    assert_eq!(run.state(), RunState::GridBuilt);
    assert!(matches!(run.build_grid().unwrap_err(), WmpError::State(_)));
    run.resolve_channels().unwrap();
    assert_eq!(run.compute_metrics().unwrap().len(), 4);
    assert_eq!(run.state(), RunState::MetricsComputed);
}

#[test]
fn batch_continues_past_a_failed_nuclide() {
    let root = tempdir().unwrap();
    let wmp_dir = root.path().join("wmp");
    let ace_dir = root.path().join("ace");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&wmp_dir).unwrap();
    fs::create_dir_all(&ace_dir).unwrap();
    write_json(&wmp_dir.join("092235.json"), &wmp_payload("U235"));
    write_json(&wmp_dir.join("094239.json"), &wmp_payload("Pu239"));
    write_json(&ace_dir.join("U235.json"), &ace_payload("U235"));

    let paths = BatchPaths::resolve(&wmp_dir, None, &ace_dir, &out_dir).unwrap();
    assert_eq!(paths.libraries.len(), 2);
    assert!(out_dir.is_dir());

    let summary = run_batch(&paths, &small_config()).unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);

    match &summary.outcomes[0] {
        NuclideOutcome::Complete { nuclide, plots, .. } => {
            assert_eq!(nuclide, "U235");
            assert_eq!(plots.len(), 3);
        }
        other => panic!("expected completion, got {other:?}"),
    }
    match &summary.outcomes[1] {
        NuclideOutcome::Failed(failure) => {
            assert_eq!(failure.nuclide, "Pu239");
            assert!(matches!(failure.error, WmpError::Precondition(_)));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    assert!(out_dir.join("U235_293.75K_validation.log").is_file());
    assert!(out_dir.join("U235_293.75K_validation.json").is_file());
    assert!(out_dir.join("U235_validation_293.75K_total.svg").is_file());

    let index: serde_json::Value =
        serde_json::from_slice(&fs::read(&summary.index_path).unwrap()).unwrap();
    assert_eq!(index["completed"], 1);
    assert_eq!(index["nuclides"][1]["status"], "failed");
}

#[test]
fn missing_inputs_abort_before_processing() {
    let root = tempdir().unwrap();
    let ace_dir = root.path().join("ace");
    fs::create_dir_all(&ace_dir).unwrap();
    let out_dir = root.path().join("out");

    let err = BatchPaths::resolve(&root.path().join("absent"), None, &ace_dir, &out_dir)
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.info().code, "wmp_dir_missing");

    let err = BatchPaths::resolve(
        root.path(),
        Some(&root.path().join("nope.json")),
        &ace_dir,
        &out_dir,
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.info().code, "wmp_file_missing");

    let err = BatchPaths::resolve(root.path(), None, &root.path().join("no-ace"), &out_dir)
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.info().code, "ace_dir_missing");
    assert!(!out_dir.exists());
}

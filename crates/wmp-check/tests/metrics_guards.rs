use proptest::prelude::*;
use wmp_check::{
    compare, error_curves, ChannelReport, EnergyGrid, ReactionCurve, DEFAULT_ABS_THRESHOLD,
};
use wmp_core::Reaction;

fn grid(n: usize) -> EnergyGrid {
    EnergyGrid::log_spaced(1.0, 1e3, n).unwrap()
}

fn curve(values: &[f64]) -> ReactionCurve {
    ReactionCurve::new(Reaction::Total, values.to_vec())
}

#[test]
fn identical_curves_report_zero_error() {
    let grid = grid(3);
    let result = compare(
        &curve(&[10.0, 10.0, 10.0]),
        &curve(&[10.0, 10.0, 10.0]),
        &grid,
        DEFAULT_ABS_THRESHOLD,
    )
    .unwrap();
    let metrics = result.report.metrics().expect("compared, not skipped");
    assert_eq!(metrics.max_abs.error, 0.0);
    assert_eq!(metrics.max_rel.error, 0.0);
    assert_eq!(metrics.max_abs.energy, grid.first());
    assert_eq!(metrics.max_rel_percent(), "0.00%");
}

#[test]
fn zero_reference_point_has_zero_relative_error() {
    let curves = error_curves(&[1e-13], &[0.0], DEFAULT_ABS_THRESHOLD);
    assert_eq!(curves.absolute, vec![1e-13]);
    assert_eq!(curves.relative, vec![0.0]);
    assert_eq!(curves.thresholded, vec![0.0]);
}

#[test]
fn all_zero_reference_is_skipped() {
    let result = compare(
        &curve(&[1.0, 2.0]),
        &curve(&[0.0, 0.0]),
        &grid(2),
        DEFAULT_ABS_THRESHOLD,
    )
    .unwrap();
    assert_eq!(result.report, ChannelReport::Skipped);
    assert!(result.curves.is_none());
}

#[test]
fn tiny_discrepancies_do_not_dominate_relative_error() {
    let grid = grid(3);
    let result = compare(
        &curve(&[2e-12, 10.0, 100.0]),
        &curve(&[1e-12, 10.5, 101.0]),
        &grid,
        DEFAULT_ABS_THRESHOLD,
    )
    .unwrap();
    let metrics = result.report.metrics().unwrap();
    assert_eq!(metrics.max_rel.energy, grid.energy(1));
    assert!((metrics.max_rel.error - 0.5 / 10.5).abs() < 1e-12);
    assert_eq!(metrics.max_rel_percent(), "4.76%");
    assert_eq!(metrics.max_abs.energy, grid.energy(2));
    assert_eq!(metrics.max_abs.candidate, 100.0);
    assert_eq!(metrics.max_abs.reference, 101.0);
    let curves = result.curves.unwrap();
    assert!((curves.relative[0] - 1.0).abs() < 1e-12);
    assert_eq!(curves.thresholded[0], 0.0);
}

#[test]
fn first_maximum_wins_ties() {
    let grid = grid(3);
    let result = compare(
        &curve(&[2.0, 1.0, 2.0]),
        &curve(&[1.0, 1.0, 1.0]),
        &grid,
        DEFAULT_ABS_THRESHOLD,
    )
    .unwrap();
    assert_eq!(result.report.metrics().unwrap().max_abs.energy, grid.first());
}

#[test]
fn mismatched_shapes_are_rejected() {
    let err = compare(&curve(&[1.0]), &curve(&[1.0, 2.0]), &grid(2), DEFAULT_ABS_THRESHOLD)
        .unwrap_err();
    assert_eq!(err.info().code, "compare_shape");
}

proptest! {
    #[test]
    fn threshold_only_ever_removes_error(
        pairs in proptest::collection::vec((0.0f64..1e3, prop_oneof![Just(0.0), 1e-9f64..1e3]), 1..200),
        epsilon in 0.0f64..1.0,
    ) {
        let candidate: Vec<f64> = pairs.iter().map(|pair| pair.0).collect();
        let reference: Vec<f64> = pairs.iter().map(|pair| pair.1).collect();
        let curves = error_curves(&candidate, &reference, epsilon);
        for idx in 0..pairs.len() {
            prop_assert!(curves.relative[idx].is_finite());
            prop_assert!(curves.thresholded[idx] <= curves.relative[idx]);
            if curves.absolute[idx] > epsilon {
                prop_assert_eq!(curves.thresholded[idx], curves.relative[idx]);
            }
            if reference[idx] == 0.0 {
                prop_assert_eq!(curves.relative[idx], 0.0);
            }
        }
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wmp_check::{compare, ChannelResolver, EnergyGrid, ReactionCurve, DEFAULT_ABS_THRESHOLD};
use wmp_core::{Convention, Reaction};

fn resonance(energy: f64) -> f64 {
    10.0 + 500.0 / (1.0 + ((energy - 6.67) / 0.05).powi(2))
}

fn bench_metrics(c: &mut Criterion) {
    let grid = EnergyGrid::log_spaced(1e-5, 2e4, EnergyGrid::DEFAULT_POINTS).expect("grid");
    let reference: Vec<f64> = grid.as_slice().iter().map(|&e| resonance(e)).collect();
    let candidate: Vec<f64> = reference.iter().map(|xs| xs * (1.0 + 1e-4)).collect();
    let reference = ReactionCurve::new(Reaction::Total, reference);
    let candidate = ReactionCurve::new(Reaction::Total, candidate);

    c.bench_function("compare_10k", |b| {
        b.iter(|| {
            compare(
                black_box(&candidate),
                black_box(&reference),
                &grid,
                DEFAULT_ABS_THRESHOLD,
            )
            .expect("compare")
        });
    });

    let resolver = ChannelResolver::new(Convention::TotalAbsorptionFission);
    let rows = [
        grid.as_slice().iter().map(|&e| resonance(e)).collect::<Vec<_>>(),
        vec![2.0; grid.len()],
        vec![1.0; grid.len()],
    ];
    c.bench_function("resolve_10k", |b| {
        b.iter(|| {
            resolver
                .resolve_triple(Convention::TotalAbsorptionFission, black_box(rows.clone()), &grid)
                .expect("resolve")
        });
    });
}

criterion_group!(benches, bench_metrics);
criterion_main!(benches);

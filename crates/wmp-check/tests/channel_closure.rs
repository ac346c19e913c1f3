use proptest::prelude::*;
use wmp_check::{ChannelResolver, EnergyGrid};
use wmp_core::{Convention, NuclideId, Reaction, WmpError};
use wmp_data::{ChannelTriple, MultipoleEvaluator, PointwiseEvaluator};

struct ConstantRows {
    convention: Option<Convention>,
    rows: [f64; 3],
}

impl MultipoleEvaluator for ConstantRows {
    fn nuclide(&self) -> NuclideId {
        NuclideId::new(92, 235, None).unwrap()
    }
    fn e_min(&self) -> f64 {
        1.0
    }
    fn e_max(&self) -> f64 {
        100.0
    }
    fn window_count(&self) -> usize {
        1
    }
    fn fit_order(&self) -> u32 {
        2
    }
    fn fissionable(&self) -> bool {
        true
    }
    fn convention(&self) -> Option<Convention> {
        self.convention
    }
    fn evaluate(&self, energy: &[f64], _temperature: f64) -> Result<ChannelTriple, WmpError> {
        Ok(self.rows.map(|value| vec![value; energy.len()]))
    }
}

struct NoFission;

impl PointwiseEvaluator for NoFission {
    fn temperatures(&self) -> Vec<String> {
        vec!["294K".into()]
    }
    fn has_reaction(&self, reaction: Reaction) -> bool {
        reaction != Reaction::Fission
    }
    fn cross_section(
        &self,
        reaction: Reaction,
        _label: &str,
        energy: &[f64],
    ) -> Result<Option<Vec<f64>>, WmpError> {
        Ok(self
            .has_reaction(reaction)
            .then(|| vec![reaction.mt() as f64; energy.len()]))
    }
}

fn grid() -> EnergyGrid {
    EnergyGrid::log_spaced(1.0, 100.0, 4).unwrap()
}

#[test]
fn both_conventions_yield_the_same_set() {
    let resolver = ChannelResolver::default();
    let grid = grid();
    let a = resolver
        .resolve_triple(Convention::ElasticAbsorptionFission, [vec![3.0; 4], vec![4.0; 4], vec![1.0; 4]], &grid)
        .unwrap();
    let b = resolver
        .resolve_triple(Convention::TotalAbsorptionFission, [vec![7.0; 4], vec![4.0; 4], vec![1.0; 4]], &grid)
        .unwrap();
    assert_eq!(a.set, b.set);
    assert_eq!(a.set.get(Reaction::Total).values(), &[7.0; 4]);
    assert_eq!(b.set.get(Reaction::Elastic).values(), &[3.0; 4]);
    assert!(a.warnings.is_empty());
}

#[test]
fn declared_convention_overrides_default() {
    let resolver = ChannelResolver::new(Convention::ElasticAbsorptionFission);
    let evaluator = ConstantRows {
        convention: Some(Convention::TotalAbsorptionFission),
        rows: [7.0, 4.0, 1.0],
    };
    let resolved = resolver.resolve_candidate(&evaluator, &grid(), 293.75).unwrap();
    assert_eq!(resolved.convention, Convention::TotalAbsorptionFission);
    assert_eq!(resolved.set.get(Reaction::Elastic).values(), &[3.0; 4]);

    let undeclared = ConstantRows {
        convention: None,
        rows: [7.0, 4.0, 1.0],
    };
    let resolved = resolver.resolve_candidate(&undeclared, &grid(), 293.75).unwrap();
    assert_eq!(resolved.convention, Convention::ElasticAbsorptionFission);
    assert_eq!(resolved.set.get(Reaction::Total).values(), &[11.0; 4]);
}

#[test]
fn negative_values_are_flagged_not_clamped() {
    let grid = grid();
    let resolved = ChannelResolver::default()
        .resolve_triple(
            Convention::TotalAbsorptionFission,
            [vec![5.0, 2.0, 1.0, 5.0], vec![1.0, 3.0, 4.0, 1.0], vec![0.0; 4]],
            &grid,
        )
        .unwrap();
    let elastic = resolved.set.get(Reaction::Elastic).values();
    assert_eq!(elastic, &[4.0, -1.0, -3.0, 4.0]);
    assert_eq!(resolved.warnings.len(), 1);
    let warning = &resolved.warnings[0];
    assert_eq!(warning.reaction, Reaction::Elastic);
    assert_eq!(warning.count, 2);
    assert_eq!(warning.min_value, -3.0);
    assert_eq!(warning.energy_at_min, grid.energy(2));
}

#[test]
fn short_rows_are_rejected() {
    let err = ChannelResolver::default()
        .resolve_triple(
            Convention::ElasticAbsorptionFission,
            [vec![1.0; 4], vec![1.0; 3], vec![1.0; 4]],
            &grid(),
        )
        .unwrap_err();
    assert_eq!(err.info().code, "curve_length");
}

#[test]
fn reference_channels_absent_from_source_are_zero() {
    let set = ChannelResolver::default()
        .resolve_reference(&NoFission, &grid(), "294K")
        .unwrap();
    assert_eq!(set.get(Reaction::Total).values(), &[1.0; 4]);
    assert_eq!(set.get(Reaction::Absorption).values(), &[27.0; 4]);
    assert!(set.get(Reaction::Fission).is_zero());
}

proptest! {
    #[test]
    fn total_is_elastic_plus_absorption(
        rows in proptest::collection::vec((0.0f64..1e4, 0.0f64..1e4, 0.0f64..1e3), 4),
        total_first in any::<bool>(),
    ) {
        let grid = grid();
        let convention = if total_first {
            Convention::TotalAbsorptionFission
        } else {
            Convention::ElasticAbsorptionFission
        };
        let triple = [
            rows.iter().map(|row| row.0).collect(),
            rows.iter().map(|row| row.1).collect(),
            rows.iter().map(|row| row.2).collect(),
        ];
        let resolved = ChannelResolver::default().resolve_triple(convention, triple, &grid).unwrap();
        let total = resolved.set.get(Reaction::Total).values();
        let elastic = resolved.set.get(Reaction::Elastic).values();
        let absorption = resolved.set.get(Reaction::Absorption).values();
        for idx in 0..grid.len() {
            prop_assert_eq!(total[idx], elastic[idx] + absorption[idx]);
        }
    }
}

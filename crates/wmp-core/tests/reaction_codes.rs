use wmp_core::{Convention, Reaction};

#[test]
fn mt_codes_match_endf() {
    assert_eq!(Reaction::Total.mt(), 1);
    assert_eq!(Reaction::Elastic.mt(), 2);
    assert_eq!(Reaction::Fission.mt(), 18);
    assert_eq!(Reaction::Absorption.mt(), 27);
    for reaction in Reaction::ALL {
        assert_eq!(Reaction::from_mt(reaction.mt()), Some(reaction));
        assert_eq!(Reaction::ALL[reaction.index()], reaction);
    }
    assert_eq!(Reaction::from_mt(102), None);
}

#[test]
fn conventions_name_their_derived_channel() {
    assert_eq!(Convention::ElasticAbsorptionFission.derived(), Reaction::Total);
    assert_eq!(Convention::TotalAbsorptionFission.derived(), Reaction::Elastic);
    assert_eq!(Convention::default(), Convention::ElasticAbsorptionFission);
    let json = serde_json::to_string(&Convention::TotalAbsorptionFission).unwrap();
    assert_eq!(json, "\"total_absorption_fission\"");
}

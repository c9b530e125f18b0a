use std::collections::BTreeMap;
use std::sync::Arc;

use algebra::module::arbitrary::{arb_descriptors, SlotArbParams};
use algebra::module::{ActionKind, CompositeModule, ModuleComponentFactory, Slot, Subalgebra};
use algebra::{ChevalleyAlgebra, RootSystem, Weight};
use bgg::BggCohomology;
use proptest::prelude::*;

fn cohomology(descriptors: &[Vec<Slot>]) -> BggCohomology<ChevalleyAlgebra> {
    let root_system = Arc::new(RootSystem::new("A2".parse().unwrap()));
    let algebra = Arc::new(ChevalleyAlgebra::new(root_system).unwrap());
    let f = ModuleComponentFactory::new(Arc::clone(&algebra));
    let components = [
        (Subalgebra::G, ActionKind::Adjoint),
        (Subalgebra::U, ActionKind::Coadjoint),
        (Subalgebra::N, ActionKind::Adjoint),
    ]
    .into_iter()
    .map(|(s, k)| f.build_component(s, k, &[], Subalgebra::B).unwrap())
    .collect();
    let module = CompositeModule::new(f.weights(), components, descriptors).unwrap();
    BggCohomology::new(algebra, Arc::new(module)).unwrap()
}

/// `Σ (-1)^degree dimension` for every weight, given `(weight, degree, dimension)` triples.
fn alternating_sum(
    terms: impl IntoIterator<Item = (Weight, usize, usize)>,
) -> BTreeMap<Weight, i64> {
    let mut result: BTreeMap<Weight, i64> = BTreeMap::new();
    for (weight, degree, dimension) in terms {
        let dimension = dimension as i64;
        *result.entry(weight).or_default() += if degree % 2 == 0 { dimension } else { -dimension };
    }
    result.retain(|_, x| *x != 0);
    result
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 16,
        .. ProptestConfig::default()
    })]

    #[test]
    fn complex_and_euler_characteristic(descriptors in arb_descriptors(SlotArbParams::default())) {
        let c = cohomology(&descriptors);
        prop_assert!(c.check_all().is_ok());

        let expected = alternating_sum(
            c.regular_weights()
                .iter()
                .map(|(w, mu, l)| (mu.clone(), *l, c.module().dimension(w))),
        );
        let actual = alternating_sum(
            c.cohomology_all()
                .unwrap()
                .into_iter()
                .enumerate()
                .flat_map(|(i, part)| part.into_iter().map(move |(mu, m)| (mu, i, m))),
        );
        prop_assert_eq!(expected, actual);
    }
}

use std::collections::BTreeMap;

use algebra::Weight;
use bgg::utils::construct;
use expect_test::expect;
use rstest::rstest;

fn format_all(module: &str) -> String {
    let cohomology = construct(module).unwrap();
    let all = cohomology.cohomology_all().unwrap();
    format!("{all:?}")
}

/// A module of the whole Lie algebra only has cohomology in degree 0, where it counts the
/// highest weights of the irreducible summands.
#[rstest]
#[case("trivial", expect!["[[([0, 0], 1)], [], [], []]"])]
#[case("adjoint", expect!["[[([1, 1], 1)], [], [], []]"])]
#[case("exterior_g", expect!["[[([1, 1], 1), ([1, 2], 1), ([2, 1], 1)], [], [], []]"])]
#[case("sym_g", expect!["[[([0, 0], 1), ([1, 1], 1), ([2, 2], 1)], [], [], []]"])]
fn sl3_modules(#[case] module: &str, #[case] expected: expect_test::Expect) {
    expected.assert_eq(&format_all(module));
}

#[test]
fn sl2() {
    expect!["[[([1], 1)], []]"].assert_eq(&format_all("adjoint@A1"));
    expect!["[[([0], 1)], []]"].assert_eq(&format_all("trivial@A1"));
    expect!["[[([0], 1), ([2], 1)], []]"].assert_eq(&format_all("sym_g@A1"));

    let cohomology = construct("adjoint@A1").unwrap();
    assert_eq!(cohomology.graph().arrows(), &[(0, 1)]);
    assert_eq!(cohomology.graph().signs(), &[1]);
}

#[test]
fn non_simply_laced() {
    expect!["[[([2, 2, 1], 1)], [], [], [], [], [], [], [], [], []]"]
        .assert_eq(&format_all("adjoint@C3"));
    expect!["[[([0, 0], 1)], [], [], [], [], [], []]"].assert_eq(&format_all("trivial@G2"));
}

#[rstest]
#[case("exterior_u")]
#[case("parabolic")]
#[case("exterior_u@B2")]
#[case("exterior_u@G2")]
fn euler_characteristic(#[case] module: &str) {
    let cohomology = construct(module).unwrap();
    cohomology.check_all().unwrap();

    let mut expected: BTreeMap<Weight, i64> = BTreeMap::new();
    for (weight, dominant, length) in cohomology.regular_weights() {
        let dimension = cohomology.module().dimension(weight) as i64;
        *expected.entry(dominant.clone()).or_default() +=
            if length % 2 == 0 { dimension } else { -dimension };
    }
    expected.retain(|_, x| *x != 0);

    let mut actual: BTreeMap<Weight, i64> = BTreeMap::new();
    for (degree, part) in cohomology.cohomology_all().unwrap().into_iter().enumerate() {
        for (mu, multiplicity) in part {
            let multiplicity = multiplicity as i64;
            *actual.entry(mu).or_default() +=
                if degree % 2 == 0 { multiplicity } else { -multiplicity };
        }
    }
    actual.retain(|_, x| *x != 0);

    assert_eq!(expected, actual);
}

/// Asking for a single component agrees with the full computation.
#[test]
fn components_agree() {
    let cohomology = construct("exterior_u").unwrap();
    for degree in 0..=3 {
        for (mu, multiplicity) in cohomology.cohomology(degree).unwrap() {
            let isolated = !cohomology
                .regular_weights()
                .iter()
                .any(|(_, d, l)| d == &mu && (*l + 1 == degree || *l == degree + 1));
            if !isolated {
                assert_eq!(
                    cohomology.cohomology_component(&mu, degree).unwrap(),
                    multiplicity
                );
            }
        }
    }
}

#[test]
fn not_dominant() {
    let cohomology = construct("adjoint").unwrap();
    assert!(cohomology.compute_differential(&[-1, 0], 0).is_err());
    assert!(cohomology.cohomology_component(&[1, 0], 1).is_err());
}

#[test]
fn not_regular() {
    let cohomology = construct("adjoint").unwrap();
    let weights = cohomology.weight_set();
    assert!(weights.make_dominant(&[-1, -1]).is_err());
    assert!(!weights.is_regular(&[1, 0]));
    // The roots α1 and α2 are not dot-regular, so only four weights of the adjoint module count.
    assert_eq!(cohomology.regular_weights().len(), 4);
}

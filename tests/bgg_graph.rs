use std::sync::Arc;

use algebra::{CartanType, CoxeterGroup, RootSystem, WeylGroup};
use bgg::BggGraph;
use rstest::rstest;

fn graph(t: &str) -> BggGraph<WeylGroup> {
    let cartan_type: CartanType = t.parse().unwrap();
    BggGraph::new(&WeylGroup::new(Arc::new(RootSystem::new(cartan_type)))).unwrap()
}

#[rstest]
#[case("A1", 2)]
#[case("A2", 6)]
#[case("A3", 24)]
#[case("A4", 120)]
#[case("B2", 8)]
#[case("B3", 48)]
#[case("C3", 48)]
#[case("D4", 192)]
#[case("G2", 12)]
#[case("F4", 1152)]
fn group_order(#[case] t: &str, #[case] order: usize) {
    let g = graph(t);
    assert_eq!(g.vertex_count(), order);

    // Every element other than the identity is reached by an arrow, and lengths go up by one.
    for v in 1..g.vertex_count() {
        assert!(!g.incoming(v).is_empty(), "{t}: vertex {v} has no incoming arrow");
    }
    for &(a, b) in g.arrows() {
        assert_eq!(g.length(b), g.length(a) + 1);
    }
    assert_eq!(g.column(g.max_length()), &[g.longest_element()]);
}

#[rstest]
#[case("A3")]
#[case("B3")]
#[case("D4")]
#[case("G2")]
fn squares_anticommute(#[case] t: &str) {
    let g = graph(t);
    g.verify_signs().unwrap();
    for &(a, b, c, b2) in g.squares() {
        let product: i64 = [(a, b), (b, c), (a, b2), (b2, c)]
            .iter()
            .map(|&(x, y)| g.sign(g.arrow(x, y).unwrap()))
            .product();
        assert_eq!(product, -1);
    }
    for &arrow in g.outgoing(0) {
        assert_eq!(g.sign(arrow), 1);
    }
}

/// Every interval of length two in the Bruhat order has exactly two middle elements, so every
/// path of length two lies in exactly one square, counted once from each side.
#[rstest]
#[case("A2")]
#[case("A3")]
#[case("B2")]
#[case("G2")]
fn squares_are_diamonds(#[case] t: &str) {
    let g = graph(t);
    let paths: usize = g
        .arrows()
        .iter()
        .map(|&(_, b)| g.outgoing(b).len())
        .sum();
    assert_eq!(g.squares().len(), paths);
}

#[test]
fn words_are_reduced() {
    let group = WeylGroup::new(Arc::new(RootSystem::new(CartanType::B(3))));
    let g = BggGraph::new(&group).unwrap();
    for v in 0..g.vertex_count() {
        let product = g
            .word(v)
            .iter()
            .fold(group.identity(), |acc, &s| {
                group.multiply(&acc, &group.generators()[s])
            });
        assert_eq!(&product, g.element(v));
        assert_eq!(g.word(v).len(), g.length(v));
    }
}

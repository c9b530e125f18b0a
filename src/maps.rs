//! Maps between Verma modules along the arrows of the Bruhat graph.
//!
//! For dominant `μ` and an arrow `w → w'`, the Verma module `M(w'·μ)` embeds into `M(w·μ)`, and
//! the embedding is determined by the image of the highest weight vector, a singular vector
//! `u v_(w·μ)` with `u ∈ U(n⁻)`. These `u` are only unique up to scalars, and the scalars are
//! chosen so that every square of the graph commutes.

use std::collections::VecDeque;

use algebra::{LieAlgebra, PbwAlgebra, PbwElement, Weight, WeylGroup};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::bgg_graph::Square;
use crate::{BggError, BggGraph, WeightSet};

/// The element of `U(n⁻)` attached to every arrow of the graph, indexed like
/// [`BggGraph::arrows`]. The map `M(w'·μ) → M(w·μ)` is `v_(w'·μ) ↦ u v_(w·μ)`, so the composite
/// along `a → b → c` is right multiplication by `u_bc u_ab`.
#[tracing::instrument(skip(algebra, graph, weights))]
pub fn compute_maps<L: LieAlgebra>(
    algebra: &L,
    graph: &BggGraph<WeylGroup>,
    weights: &WeightSet,
    mu: &[i32],
) -> Result<Vec<PbwElement>, BggError> {
    if !weights.is_dominant(mu) {
        return Err(BggError::NotDominant(mu.to_vec()));
    }
    let vertex_weights = weights.vertex_weights(mu);
    let mut pbw = PbwAlgebra::new(algebra);

    let mut maps = graph
        .arrows()
        .iter()
        .map(|&(a, b)| {
            let difference: Weight = vertex_weights[b]
                .iter()
                .zip(&vertex_weights[a])
                .map(|(x, y)| x - y)
                .collect();
            pbw.singular_vector(&vertex_weights[a], &difference)
        })
        .collect::<Result<Vec<_>, _>>()?;

    normalize(graph, &mut pbw, &mut maps)?;
    verify_squares(graph, &mut pbw, &maps)?;

    tracing::debug!(
        arrows = maps.len(),
        max_degree = maps.iter().map(PbwElement::degree).max().unwrap_or(0),
        "computed Verma module maps"
    );
    Ok(maps)
}

/// Rescale the maps vertex by vertex in order of length. At each vertex `c`, the first incoming
/// arrow keeps its scalar, and each square `(a, b, c, b')` whose arrow `b → c` is fixed then
/// fixes `b' → c` by rescaling all arrows into `c` by integers.
fn normalize<L: LieAlgebra>(
    graph: &BggGraph<WeylGroup>,
    pbw: &mut PbwAlgebra<'_, L>,
    maps: &mut [PbwElement],
) -> Result<(), BggError> {
    let mut squares_into: Vec<FxHashMap<usize, Vec<Square>>> =
        vec![FxHashMap::default(); graph.vertex_count()];
    for &square in graph.squares() {
        let (_, b, c, _) = square;
        let arrow = graph.arrow(b, c).ok_or(BggError::SquareMaps(square))?;
        squares_into[c].entry(arrow).or_default().push(square);
    }

    for column in graph.columns().iter().skip(2) {
        for &c in column {
            let mut fixed: FxHashSet<usize> = FxHashSet::default();
            for &start in graph.incoming(c) {
                if !fixed.insert(start) {
                    continue;
                }
                let mut queue = VecDeque::from([start]);
                while let Some(arrow) = queue.pop_front() {
                    let Some(squares) = squares_into[c].get(&arrow) else {
                        continue;
                    };
                    for &square in squares {
                        let (a, b, _, b2) = square;
                        let arrow_index =
                            |x, y| graph.arrow(x, y).ok_or(BggError::SquareMaps(square));
                        let other = arrow_index(b2, c)?;
                        if fixed.contains(&other) {
                            continue;
                        }
                        let left = pbw.multiply(&maps[arrow], &maps[arrow_index(a, b)?])?;
                        let right = pbw.multiply(&maps[other], &maps[arrow_index(a, b2)?])?;
                        let (p, q) = left
                            .proportion(&right)
                            .ok_or(BggError::SquareMaps(square))?;
                        if q != 1 {
                            for &f in &fixed {
                                maps[f].scale(q)?;
                            }
                        }
                        maps[other].scale(p)?;
                        fixed.insert(other);
                        queue.push_back(other);
                    }
                }
            }

            let content = graph
                .incoming(c)
                .iter()
                .fold(0, |g, &i| gcd(g, maps[i].content()));
            if content > 1 {
                for &i in graph.incoming(c) {
                    maps[i].divide_exact(content);
                }
            }
        }
    }
    Ok(())
}

fn verify_squares<L: LieAlgebra>(
    graph: &BggGraph<WeylGroup>,
    pbw: &mut PbwAlgebra<'_, L>,
    maps: &[PbwElement],
) -> Result<(), BggError> {
    for &square in graph.squares() {
        let (a, b, c, b2) = square;
        let arrow = |x, y| graph.arrow(x, y).ok_or(BggError::SquareMaps(square));
        let left = pbw.multiply(&maps[arrow(b, c)?], &maps[arrow(a, b)?])?;
        let right = pbw.multiply(&maps[arrow(b2, c)?], &maps[arrow(a, b2)?])?;
        if left != right {
            return Err(BggError::SquareMaps(square));
        }
    }
    Ok(())
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use algebra::{BasisKind, ChevalleyAlgebra, RootSystem};
    use expect_test::expect;
    use rstest::rstest;

    use super::*;

    fn setup(t: &str) -> (ChevalleyAlgebra, BggGraph<WeylGroup>, WeightSet) {
        let root_system = Arc::new(RootSystem::new(t.parse().unwrap()));
        let algebra = ChevalleyAlgebra::new(Arc::clone(&root_system)).unwrap();
        let group = Arc::new(WeylGroup::new(root_system));
        let graph = BggGraph::new(&*group).unwrap();
        let weights = WeightSet::new(group, &graph);
        (algebra, graph, weights)
    }

    #[test]
    fn test_sl2() {
        let (algebra, graph, weights) = setup("A1");
        let maps = compute_maps(&algebra, &graph, &weights, &[0]).unwrap();
        expect!["[PbwElement { terms: {[1]: 1} }]"].assert_eq(&format!("{maps:?}"));
        // M(-3α) ⊂ M(α) is generated by f³
        let maps = compute_maps(&algebra, &graph, &weights, &[1]).unwrap();
        assert_eq!(maps, vec![PbwElement::monomial(vec![1, 1, 1])]);
    }

    #[test]
    fn test_a2_squares_commute() {
        let (algebra, graph, weights) = setup("A2");
        for mu in [[0, 0], [1, 1], [2, 1]] {
            let maps = compute_maps(&algebra, &graph, &weights, &mu).unwrap();
            assert_eq!(maps.len(), 8);
            let mut pbw = PbwAlgebra::new(&algebra);
            verify_squares(&graph, &mut pbw, &maps).unwrap();
            for u in &maps {
                assert!(!u.is_zero());
                for (m, _) in u.iter() {
                    assert!(m.iter().all(|&g| algebra.kind(g) == BasisKind::Negative));
                }
            }
        }
    }

    #[test]
    fn test_a3_squares_commute() {
        let (algebra, graph, weights) = setup("A3");
        let maps = compute_maps(&algebra, &graph, &weights, &[0, 0, 0]).unwrap();
        assert_eq!(maps.len(), graph.arrows().len());
    }

    #[rstest]
    #[case("B2")]
    #[case("G2")]
    fn test_non_simply_laced_squares_commute(#[case] t: &str) {
        let (algebra, graph, weights) = setup(t);
        let maps = compute_maps(&algebra, &graph, &weights, &[0, 0]).unwrap();
        assert_eq!(maps.len(), graph.arrows().len());
        assert!(maps.iter().all(|u| !u.is_zero()));
        let mut pbw = PbwAlgebra::new(&algebra);
        verify_squares(&graph, &mut pbw, &maps).unwrap();
    }

    #[test]
    fn test_not_dominant() {
        let (algebra, graph, weights) = setup("A2");
        assert_eq!(
            compute_maps(&algebra, &graph, &weights, &[1, 0]),
            Err(BggError::NotDominant(vec![1, 0]))
        );
    }
}

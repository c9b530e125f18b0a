use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{BasisKind, ChevalleyAlgebra, LieAlgebra};
use crate::root_system::{height, CartanType, RootSystem};
use crate::{AlgebraError, Weight};

/// A simply laced type with a diagram automorphism `σ` whose fixed points form a Lie algebra of
/// non simply laced type.
///
/// | folded | unfolded   | `σ`                         |
/// |--------|------------|-----------------------------|
/// | B_n    | D_(n+1)    | swaps the two short legs    |
/// | C_n    | A_(2n - 1) | reverses the Dynkin diagram |
/// | F_4    | E_6        | reverses the long leg       |
/// | G_2    | D_4        | triality                    |
///
/// The automorphism of the Lie algebra sends the Chevalley generators `e_i, f_i, h_i` to
/// `e_σ(i), f_σ(i), h_σ(i)`, so the simple roots in one orbit of `σ` fold onto a single simple
/// root. Orbits of size one give the long roots.
pub(super) struct Unfolding {
    cartan_type: CartanType,
    /// `orbits[k]` are the nodes folding onto the `k`th simple root, listed so that `σ` sends each
    /// node to the next one.
    orbits: Vec<Vec<usize>>,
}

impl Unfolding {
    pub(super) fn of(cartan_type: CartanType) -> Option<Self> {
        let (unfolded, orbits) = match cartan_type {
            CartanType::B(n) => (
                CartanType::D(n + 1),
                (0..n - 1)
                    .map(|i| vec![i])
                    .chain([vec![n - 1, n]])
                    .collect(),
            ),
            CartanType::C(n) => (
                CartanType::A(2 * n - 1),
                (0..n - 1)
                    .map(|i| vec![i, 2 * n - 2 - i])
                    .chain([vec![n - 1]])
                    .collect(),
            ),
            CartanType::F4 => (
                CartanType::E(6),
                vec![vec![1], vec![3], vec![2, 4], vec![0, 5]],
            ),
            CartanType::G2 => (CartanType::D(4), vec![vec![0, 2, 3], vec![1]]),
            _ => return None,
        };
        Some(Self {
            cartan_type: unfolded,
            orbits,
        })
    }

    fn permutation(&self) -> Vec<usize> {
        let mut result = vec![0; self.cartan_type.rank()];
        for orbit in &self.orbits {
            for (k, &node) in orbit.iter().enumerate() {
                result[node] = orbit[(k + 1) % orbit.len()];
            }
        }
        result
    }

    /// The restriction of a root of the unfolded algebra to the fixed Cartan subalgebra.
    fn restrict(&self, root: &[i32]) -> Weight {
        self.orbits
            .iter()
            .map(|orbit| orbit.iter().map(|&i| root[i]).sum())
            .collect()
    }

    /// The images of the basis elements of `unfolded` under `σ`, as `(index, sign)`.
    fn automorphism(&self, unfolded: &ChevalleyAlgebra) -> Option<Vec<(usize, i64)>> {
        let rank = unfolded.rank();
        let permutation = self.permutation();
        let permute = |root: &[i32]| {
            let mut result = vec![0; rank];
            for (i, &c) in root.iter().enumerate() {
                result[permutation[i]] = c;
            }
            result
        };
        let coefficient = |terms: &[(usize, i64)], index: usize| {
            terms
                .iter()
                .find(|&&(k, _)| k == index)
                .map_or(0, |&(_, c)| c)
        };

        let mut images: Vec<(usize, i64)> = vec![(0, 0); unfolded.dimension()];
        let cartan = unfolded.basis_of_kind(BasisKind::Cartan);
        for (k, &index) in cartan.iter().enumerate() {
            images[index] = (cartan[permutation[k]], 1);
        }

        let mut roots: Vec<usize> = (0..unfolded.dimension())
            .filter(|&i| unfolded.kind(i) != BasisKind::Cartan)
            .collect();
        roots.sort_by_key(|&i| height(unfolded.weight(i)).abs());
        for index in roots {
            let root = unfolded.weight(index);
            let target = unfolded.root_index(&permute(root))?;
            let h = height(root);
            if h.abs() == 1 {
                images[index] = (target, 1);
                continue;
            }
            // x_root = c [x_previous, x_simple] for c = ±1, and both factors already have images.
            let sign = h.signum();
            let (previous, simple) = (0..rank).find_map(|i| {
                let mut previous = root.to_vec();
                previous[i] -= sign;
                let mut simple = vec![0; rank];
                simple[i] = sign;
                Some((unfolded.root_index(&previous)?, unfolded.root_index(&simple)?))
            })?;
            let c = coefficient(unfolded.bracket(previous, simple), index);
            let (previous_image, eta) = images[previous];
            let (simple_image, _) = images[simple];
            let d = coefficient(unfolded.bracket(previous_image, simple_image), target);
            images[index] = (target, c * eta * d);
        }
        Some(images)
    }

    /// The structure constants of the folded algebra, in the basis [`ChevalleyAlgebra`] uses for
    /// `root_system`. Root vectors are the `σ`-orbit sums of root vectors of the unfolded algebra,
    /// and `h_k` is the sum of the simple coroots in the `k`th orbit.
    pub(super) fn brackets(
        &self,
        root_system: &RootSystem,
    ) -> Result<Vec<Vec<(usize, i64)>>, AlgebraError> {
        let fail = || AlgebraError::Folding {
            folded: root_system.cartan_type(),
            unfolded: self.cartan_type,
        };
        let unfolded = ChevalleyAlgebra::new(Arc::new(RootSystem::new(self.cartan_type)))?;
        let sigma = self.automorphism(&unfolded).ok_or_else(fail)?;

        let mut representatives: FxHashMap<Weight, usize> = FxHashMap::default();
        for index in 0..unfolded.dimension() {
            if unfolded.kind(index) != BasisKind::Cartan {
                representatives
                    .entry(self.restrict(unfolded.weight(index)))
                    .or_insert(index);
            }
        }
        let positive = root_system.positive_roots();
        if representatives.len() != 2 * positive.len() {
            return Err(fail());
        }

        // Every basis vector has coefficient 1 on its first term, and first terms are distinct.
        let mut basis: Vec<Vec<(usize, i64)>> = Vec::new();
        let negative = positive
            .iter()
            .map(|r| r.iter().map(|c| -c).collect::<Weight>());
        for root in positive.iter().cloned().chain(negative) {
            let &start = representatives.get(&root).ok_or_else(fail)?;
            basis.push(orbit_sum(&sigma, start).ok_or_else(fail)?);
        }
        let cartan = unfolded.basis_of_kind(BasisKind::Cartan);
        for orbit in &self.orbits {
            basis.push(orbit.iter().map(|&i| (cartan[i], 1)).collect());
        }
        let lead: FxHashMap<usize, usize> = basis
            .iter()
            .enumerate()
            .map(|(k, terms)| (terms[0].0, k))
            .collect();

        let mut brackets = Vec::with_capacity(basis.len() * basis.len());
        for a in &basis {
            for b in &basis {
                let mut product: FxHashMap<usize, i64> = FxHashMap::default();
                for &(i, c) in a {
                    for &(j, d) in b {
                        for &(k, e) in unfolded.bracket(i, j) {
                            *product.entry(k).or_default() += c * d * e;
                        }
                    }
                }
                let mut result: Vec<(usize, i64)> = product
                    .iter()
                    .filter(|&(_, &c)| c != 0)
                    .filter_map(|(k, &c)| Some((*lead.get(k)?, c)))
                    .collect();
                for &(k, c) in &result {
                    for &(i, d) in &basis[k] {
                        *product.entry(i).or_default() -= c * d;
                    }
                }
                if product.values().any(|&c| c != 0) {
                    return Err(fail());
                }
                result.sort_unstable();
                brackets.push(result);
            }
        }
        Ok(brackets)
    }
}

/// `Σ_k σ^k(x_start)`, or `None` if the orbit returns to `x_start` with the wrong sign.
fn orbit_sum(sigma: &[(usize, i64)], start: usize) -> Option<Vec<(usize, i64)>> {
    let mut terms = vec![(start, 1)];
    let (mut index, mut sign) = sigma[start];
    while index != start {
        terms.push((index, sign));
        let (next, s) = sigma[index];
        index = next;
        sign *= s;
    }
    (sign == 1).then_some(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restrict() {
        let g2 = Unfolding::of(CartanType::G2).unwrap();
        assert_eq!(g2.permutation(), vec![2, 1, 3, 0]);
        // The highest root of D_4 restricts to the highest root of G_2.
        assert_eq!(g2.restrict(&[1, 2, 1, 1]), vec![3, 2]);

        let c3 = Unfolding::of(CartanType::C(3)).unwrap();
        assert_eq!(c3.cartan_type, CartanType::A(5));
        assert_eq!(c3.permutation(), vec![4, 3, 2, 1, 0]);
        assert_eq!(c3.restrict(&[0, 1, 1, 1, 0]), vec![0, 2, 1]);

        assert!(Unfolding::of(CartanType::E(7)).is_none());
    }

    #[test]
    fn test_automorphism_has_finite_order() {
        for t in [CartanType::B(3), CartanType::C(2), CartanType::G2] {
            let unfolding = Unfolding::of(t).unwrap();
            let unfolded =
                ChevalleyAlgebra::new(Arc::new(RootSystem::new(unfolding.cartan_type))).unwrap();
            let sigma = unfolding.automorphism(&unfolded).unwrap();
            let order = unfolding.orbits.iter().map(Vec::len).max().unwrap();
            for start in 0..unfolded.dimension() {
                let (mut index, mut sign) = (start, 1);
                for _ in 0..order {
                    let (next, s) = sigma[index];
                    index = next;
                    sign *= s;
                }
                assert_eq!((index, sign), (start, 1), "{t}: σ^{order} moves {start}");
            }
        }
    }
}

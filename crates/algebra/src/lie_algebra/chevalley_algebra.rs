use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::folding::Unfolding;
use super::{BasisKind, LieAlgebra};
use crate::root_system::RootSystem;
use crate::{AlgebraError, Weight};

/// A simple Lie algebra with an integral basis of root vectors and simple coroots.
///
/// For simply laced types this is the basis of Frenkel and Kac. There is a root vector `e_α` for
/// every root `α`, and the Cartan subalgebra is spanned by the simple roots `h_i = α_i`,
/// identified with the simple coroots through the invariant form. The brackets are
/// ```text
/// [h, e_α] = (h, α) e_α
/// [e_α, e_-α] = -α
/// [e_α, e_β] = ε(α, β) e_(α+β)    if α + β is a root
/// ```
/// where `ε` is the bimultiplicative sign with `ε(α_i, α_i) = -1`, `ε(α_i, α_j) = (-1)^(α_i, α_j)`
/// for `i < j` and `ε(α_i, α_j) = 1` for `i > j`.
///
/// The other types are the fixed points of a diagram automorphism of a simply laced algebra, see
/// `Unfolding`. In either case `[h_i, x] = <wt(x), α_i^∨> x` and all structure constants are
/// integers.
///
/// The basis consists of the positive root vectors (in the order of
/// [`RootSystem::positive_roots`]), then the negative root vectors in the same order, then the
/// Cartan elements.
pub struct ChevalleyAlgebra {
    root_system: Arc<RootSystem>,
    weights: Vec<Weight>,
    index: FxHashMap<Weight, usize>,
    /// `brackets[i * dimension + j] = [x_i, x_j]`
    brackets: Vec<Vec<(usize, i64)>>,
}

impl ChevalleyAlgebra {
    pub fn new(root_system: Arc<RootSystem>) -> Result<Self, AlgebraError> {
        let rank = root_system.rank();
        let positive = root_system.positive_roots();

        let mut weights: Vec<Weight> = positive.to_vec();
        weights.extend(positive.iter().map(|r| r.iter().map(|c| -c).collect::<Weight>()));
        weights.extend((0..rank).map(|_| vec![0; rank]));
        let index = weights[..2 * positive.len()]
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        let mut algebra = Self {
            root_system,
            weights,
            index,
            brackets: Vec::new(),
        };
        algebra.brackets = match Unfolding::of(algebra.root_system.cartan_type()) {
            Some(unfolding) => unfolding.brackets(&algebra.root_system)?,
            None => {
                let dimension = algebra.weights.len();
                (0..dimension)
                    .flat_map(|i| (0..dimension).map(move |j| (i, j)))
                    .map(|(i, j)| algebra.compute_bracket(i, j))
                    .collect()
            }
        };
        Ok(algebra)
    }

    fn positive_count(&self) -> usize {
        self.root_system.positive_roots().len()
    }

    /// The cocycle `ε(a, b)`.
    fn sign(&self, a: &[i32], b: &[i32]) -> i64 {
        let cartan_matrix = self.root_system.cartan_matrix();
        let mut parity: i32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        for (i, row) in cartan_matrix.iter().enumerate() {
            for (j, &entry) in row.iter().enumerate().skip(i + 1) {
                if entry == -1 {
                    parity += a[i] * b[j];
                }
            }
        }
        if parity.rem_euclid(2) == 0 {
            1
        } else {
            -1
        }
    }

    fn compute_bracket(&self, i: usize, j: usize) -> Vec<(usize, i64)> {
        let single = |index: usize, coefficient: i64| {
            if coefficient == 0 {
                vec![]
            } else {
                vec![(index, coefficient)]
            }
        };
        match (self.kind(i), self.kind(j)) {
            (BasisKind::Cartan, BasisKind::Cartan) => vec![],
            (BasisKind::Cartan, _) => single(j, self.cartan_eval(i, &self.weights[j])),
            (_, BasisKind::Cartan) => single(i, -self.cartan_eval(j, &self.weights[i])),
            _ => {
                let (a, b) = (&self.weights[i], &self.weights[j]);
                let sum: Weight = a.iter().zip(b).map(|(x, y)| x + y).collect();
                if sum.iter().all(|&c| c == 0) {
                    let offset = 2 * self.positive_count();
                    a.iter()
                        .enumerate()
                        .filter(|(_, &c)| c != 0)
                        .map(|(k, &c)| (offset + k, -i64::from(c)))
                        .collect()
                } else if let Some(&k) = self.index.get(&sum) {
                    vec![(k, self.sign(a, b))]
                } else {
                    vec![]
                }
            }
        }
    }
}

impl LieAlgebra for ChevalleyAlgebra {
    fn root_system(&self) -> &RootSystem {
        &self.root_system
    }

    fn dimension(&self) -> usize {
        self.weights.len()
    }

    fn kind(&self, index: usize) -> BasisKind {
        let p = self.positive_count();
        if index < p {
            BasisKind::Positive
        } else if index < 2 * p {
            BasisKind::Negative
        } else {
            BasisKind::Cartan
        }
    }

    fn weight(&self, index: usize) -> &[i32] {
        &self.weights[index]
    }

    fn bracket(&self, i: usize, j: usize) -> &[(usize, i64)] {
        &self.brackets[i * self.dimension() + j]
    }

    fn dual(&self, index: usize) -> usize {
        let p = self.positive_count();
        match self.kind(index) {
            BasisKind::Positive => index + p,
            BasisKind::Negative => index - p,
            BasisKind::Cartan => index,
        }
    }

    fn cartan_eval(&self, index: usize, weight: &[i32]) -> i64 {
        let k = index - 2 * self.positive_count();
        i64::from(self.root_system.pairing(weight, k))
    }

    fn root_index(&self, root: &[i32]) -> Option<usize> {
        self.index.get(root).copied()
    }
}

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::{AlgebraError, Weight};

/// The type of an irreducible finite root system, with Bourbaki numbering of the simple roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CartanType {
    A(usize),
    B(usize),
    C(usize),
    D(usize),
    E(usize),
    F4,
    G2,
}

impl CartanType {
    pub fn rank(self) -> usize {
        match self {
            Self::A(n) | Self::B(n) | Self::C(n) | Self::D(n) | Self::E(n) => n,
            Self::F4 => 4,
            Self::G2 => 2,
        }
    }

    pub fn is_simply_laced(self) -> bool {
        matches!(self, Self::A(_) | Self::D(_) | Self::E(_))
    }

    pub fn weyl_group_order(self) -> usize {
        let factorial = |n: usize| (1..=n).product::<usize>();
        match self {
            Self::A(n) => factorial(n + 1),
            Self::B(n) | Self::C(n) => (1 << n) * factorial(n),
            Self::D(n) => (1 << (n - 1)) * factorial(n),
            Self::E(6) => 51_840,
            Self::E(7) => 2_903_040,
            Self::E(8) => 696_729_600,
            Self::E(_) => unreachable!("E_n is only defined for n = 6, 7, 8"),
            Self::F4 => 1152,
            Self::G2 => 12,
        }
    }

    /// The matrix of inner products `(α_i, α_j)` of the simple roots, normalized so that short
    /// roots have squared length 2.
    fn gram_matrix(self) -> Vec<Vec<i32>> {
        let n = self.rank();
        let mut gram = vec![vec![0; n]; n];
        let mut link = |i: usize, j: usize, value: i32| {
            gram[i][j] = value;
            gram[j][i] = value;
        };
        let lengths: Vec<i32> = match self {
            Self::A(_) => {
                (1..n).for_each(|i| link(i - 1, i, -1));
                vec![2; n]
            }
            Self::B(_) => {
                (1..n).for_each(|i| link(i - 1, i, -2));
                (0..n).map(|i| if i + 1 < n { 4 } else { 2 }).collect()
            }
            Self::C(_) => {
                (1..n).for_each(|i| link(i - 1, i, if i + 1 < n { -1 } else { -2 }));
                (0..n).map(|i| if i + 1 < n { 2 } else { 4 }).collect()
            }
            Self::D(_) => {
                (1..n - 1).for_each(|i| link(i - 1, i, -1));
                link(n - 3, n - 1, -1);
                vec![2; n]
            }
            Self::E(_) => {
                for (i, j) in [(0, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7), (1, 3)] {
                    if j < n {
                        link(i, j, -1);
                    }
                }
                vec![2; n]
            }
            Self::F4 => {
                link(0, 1, -2);
                link(1, 2, -2);
                link(2, 3, -1);
                vec![4, 4, 2, 2]
            }
            Self::G2 => {
                link(0, 1, -3);
                vec![2, 6]
            }
        };
        for (i, length) in lengths.into_iter().enumerate() {
            gram[i][i] = length;
        }
        gram
    }
}

impl FromStr for CartanType {
    type Err = AlgebraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AlgebraError::UnknownCartanType(s.to_owned());
        let mut chars = s.trim().chars();
        let letter = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        let n: usize = chars.as_str().parse().map_err(|_| err())?;
        let result = match (letter, n) {
            ('A', n) if n >= 1 => Self::A(n),
            ('B', n) if n >= 2 => Self::B(n),
            ('C', n) if n >= 2 => Self::C(n),
            ('D', n) if n >= 3 => Self::D(n),
            ('E', n) if (6..=8).contains(&n) => Self::E(n),
            ('F', 4) => Self::F4,
            ('G', 2) => Self::G2,
            _ => return Err(err()),
        };
        Ok(result)
    }
}

impl TryFrom<String> for CartanType {
    type Error = AlgebraError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CartanType> for String {
    fn from(t: CartanType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for CartanType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::A(n) => write!(f, "A{n}"),
            Self::B(n) => write!(f, "B{n}"),
            Self::C(n) => write!(f, "C{n}"),
            Self::D(n) => write!(f, "D{n}"),
            Self::E(n) => write!(f, "E{n}"),
            Self::F4 => write!(f, "F4"),
            Self::G2 => write!(f, "G2"),
        }
    }
}

/// A finite root system. Weights and roots are written in simple root coordinates throughout, so
/// everything in the root lattice is an integer vector.
#[derive(Clone, Debug)]
pub struct RootSystem {
    cartan_type: CartanType,
    gram: Vec<Vec<i32>>,
    /// `cartan_matrix[i][j] = <α_j, α_i^∨>`
    cartan_matrix: Vec<Vec<i32>>,
    positive_roots: Vec<Weight>,
    root_index: FxHashMap<Weight, usize>,
}

impl RootSystem {
    pub fn new(cartan_type: CartanType) -> Self {
        let gram = cartan_type.gram_matrix();
        let n = cartan_type.rank();
        let cartan_matrix: Vec<Vec<i32>> = (0..n)
            .map(|i| (0..n).map(|j| 2 * gram[i][j] / gram[i][i]).collect())
            .collect();

        // Every root is conjugate to a simple root, so the roots are the orbit of the simple roots
        // under the simple reflections.
        let mut roots: FxHashSet<Weight> = FxHashSet::default();
        let mut queue: VecDeque<Weight> = (0..n).map(|i| unit(n, i)).collect();
        while let Some(root) = queue.pop_front() {
            if !roots.insert(root.clone()) {
                continue;
            }
            for i in 0..n {
                let reflected = reflect(&cartan_matrix, i, &root);
                if !roots.contains(&reflected) {
                    queue.push_back(reflected);
                }
            }
        }

        let mut positive_roots: Vec<Weight> = roots
            .into_iter()
            .filter(|r| r.iter().all(|&c| c >= 0))
            .collect();
        positive_roots.sort_by(|a, b| height(a).cmp(&height(b)).then_with(|| b.cmp(a)));
        let root_index = positive_roots
            .iter()
            .enumerate()
            .map(|(i, r)| (r.clone(), i))
            .collect();

        Self {
            cartan_type,
            gram,
            cartan_matrix,
            positive_roots,
            root_index,
        }
    }

    pub fn cartan_type(&self) -> CartanType {
        self.cartan_type
    }

    pub fn rank(&self) -> usize {
        self.cartan_matrix.len()
    }

    pub fn cartan_matrix(&self) -> &[Vec<i32>] {
        &self.cartan_matrix
    }

    /// The inner product of two elements of the root lattice.
    pub fn inner_product(&self, a: &[i32], b: &[i32]) -> i32 {
        let mut result = 0;
        for (i, &x) in a.iter().enumerate() {
            if x == 0 {
                continue;
            }
            for (j, &y) in b.iter().enumerate() {
                result += x * self.gram[i][j] * y;
            }
        }
        result
    }

    /// Positive roots, sorted by height. Roots of the same height are in decreasing
    /// lexicographic order, so the simple roots come first in their natural order.
    pub fn positive_roots(&self) -> &[Weight] {
        &self.positive_roots
    }

    pub fn simple_root(&self, i: usize) -> Weight {
        unit(self.rank(), i)
    }

    pub fn positive_root_index(&self, root: &[i32]) -> Option<usize> {
        self.root_index.get(root).copied()
    }

    pub fn is_root(&self, v: &[i32]) -> bool {
        if v.iter().all(|&c| c >= 0) {
            self.root_index.contains_key(v)
        } else {
            let negated: Weight = v.iter().map(|&c| -c).collect();
            self.root_index.contains_key(&negated)
        }
    }

    /// `<μ, α_i^∨>`
    pub fn pairing(&self, weight: &[i32], i: usize) -> i32 {
        self.cartan_matrix[i]
            .iter()
            .zip(weight)
            .map(|(a, w)| a * w)
            .sum()
    }

    pub fn is_dominant(&self, weight: &[i32]) -> bool {
        (0..self.rank()).all(|i| self.pairing(weight, i) >= 0)
    }

    pub fn simple_reflection(&self, i: usize, weight: &[i32]) -> Weight {
        reflect(&self.cartan_matrix, i, weight)
    }

    /// The coroot `α^∨` of a root in the basis of simple coroots.
    pub fn coroot(&self, root: &[i32]) -> Weight {
        let norm = self.inner_product(root, root);
        root.iter()
            .enumerate()
            .map(|(j, &c)| c * self.gram[j][j] / norm)
            .collect()
    }

    /// `<μ, α^∨>` for an arbitrary root `α`.
    pub fn coroot_pairing(&self, weight: &[i32], root: &[i32]) -> i32 {
        self.coroot(root)
            .iter()
            .enumerate()
            .map(|(j, &k)| k * self.pairing(weight, j))
            .sum()
    }

    /// The sum of the positive roots, `2ρ`.
    pub fn two_rho(&self) -> Weight {
        let mut result = vec![0; self.rank()];
        for root in &self.positive_roots {
            for (r, c) in result.iter_mut().zip(root) {
                *r += c;
            }
        }
        result
    }

    /// Indices of the simple roots occurring in a root.
    pub fn support(root: &[i32]) -> impl Iterator<Item = usize> + '_ {
        root.iter()
            .enumerate()
            .filter(|(_, &c)| c != 0)
            .map(|(i, _)| i)
    }
}

pub fn height(root: &[i32]) -> i32 {
    root.iter().sum()
}

fn unit(n: usize, i: usize) -> Weight {
    let mut v = vec![0; n];
    v[i] = 1;
    v
}

fn reflect(cartan_matrix: &[Vec<i32>], i: usize, weight: &[i32]) -> Weight {
    let pairing: i32 = cartan_matrix[i].iter().zip(weight).map(|(a, w)| a * w).sum();
    let mut result = weight.to_vec();
    result[i] -= pairing;
    result
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("A1", 1)]
    #[case("A2", 3)]
    #[case("A4", 10)]
    #[case("B2", 4)]
    #[case("C3", 9)]
    #[case("D4", 12)]
    #[case("E6", 36)]
    #[case("F4", 24)]
    #[case("G2", 6)]
    fn test_number_of_positive_roots(#[case] name: &str, #[case] count: usize) {
        let rs = RootSystem::new(name.parse().unwrap());
        assert_eq!(rs.positive_roots().len(), count);
    }

    #[test]
    fn test_cartan_matrices() {
        let b3 = RootSystem::new(CartanType::B(3));
        assert_eq!(
            b3.cartan_matrix(),
            &[vec![2, -1, 0], vec![-1, 2, -1], vec![0, -2, 2]]
        );
        let g2 = RootSystem::new(CartanType::G2);
        assert_eq!(g2.cartan_matrix(), &[vec![2, -3], vec![-1, 2]]);
    }

    #[test]
    fn test_root_order() {
        let a3 = RootSystem::new(CartanType::A(3));
        assert_eq!(
            a3.positive_roots(),
            &[
                vec![1, 0, 0],
                vec![0, 1, 0],
                vec![0, 0, 1],
                vec![1, 1, 0],
                vec![0, 1, 1],
                vec![1, 1, 1],
            ]
        );
        let g2 = RootSystem::new(CartanType::G2);
        assert_eq!(g2.positive_roots().last().unwrap(), &vec![3, 2]);
    }

    #[test]
    fn test_coroots() {
        let b2 = RootSystem::new(CartanType::B(2));
        // α_1 is long and α_2 short, so (α_1 + 2α_2)^∨ = α_1^∨ + α_2^∨
        assert_eq!(b2.coroot(&[1, 2]), vec![1, 1]);
        assert_eq!(b2.coroot(&[1, 1]), vec![2, 1]);
        for root in b2.positive_roots() {
            assert_eq!(b2.coroot_pairing(root, root), 2);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("e7".parse::<CartanType>().unwrap(), CartanType::E(7));
        assert_eq!(CartanType::D(5).to_string(), "D5");
        assert!("E9".parse::<CartanType>().is_err());
        assert!("B1".parse::<CartanType>().is_err());
        assert!("X".parse::<CartanType>().is_err());
    }

    #[test]
    fn test_dominance() {
        let a2 = RootSystem::new(CartanType::A(2));
        assert!(a2.is_dominant(&[1, 1]));
        assert!(a2.is_dominant(&[2, 1]));
        assert!(!a2.is_dominant(&[1, 0]));
        assert_eq!(a2.two_rho(), vec![2, 2]);
    }
}

//! Elements of universal enveloping algebras in a PBW basis, and the Verma module computations
//! that produce the maps of the BGG resolution.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use linalg::SparseMatrix;
use rustc_hash::FxHashMap;

use crate::lie_algebra::{BasisKind, LieAlgebra};
use crate::{AlgebraError, Weight};

/// A PBW monomial, as a list of basis indices of the Lie algebra. For elements produced by
/// [`PbwAlgebra`] the indices are non-decreasing.
pub type Monomial = Vec<usize>;

/// An element of a universal enveloping algebra: a sum of monomials with integer coefficients.
///
/// A monomial `[a, b, c]` stands for the product `x_a x_b x_c`, so when it acts on a module the
/// last generator acts first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PbwElement {
    terms: BTreeMap<Monomial, i64>,
}

impl PbwElement {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::monomial(vec![])
    }

    pub fn monomial(generators: Monomial) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(generators, 1);
        Self { terms }
    }

    pub fn from_terms(
        terms: impl IntoIterator<Item = (Monomial, i64)>,
    ) -> Result<Self, AlgebraError> {
        let mut result = Self::zero();
        for (m, c) in terms {
            result.add_term(m, c)?;
        }
        Ok(result)
    }

    pub fn add_term(&mut self, monomial: Monomial, coefficient: i64) -> Result<(), AlgebraError> {
        if coefficient == 0 {
            return Ok(());
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(e) => {
                e.insert(coefficient);
            }
            Entry::Occupied(mut e) => {
                let sum = e
                    .get()
                    .checked_add(coefficient)
                    .ok_or(AlgebraError::Overflow)?;
                if sum == 0 {
                    e.remove();
                } else {
                    *e.get_mut() = sum;
                }
            }
        }
        Ok(())
    }

    /// `self += c * other`
    pub fn add_scaled(&mut self, other: &Self, c: i64) -> Result<(), AlgebraError> {
        for (m, &d) in &other.terms {
            let product = c.checked_mul(d).ok_or(AlgebraError::Overflow)?;
            self.add_term(m.clone(), product)?;
        }
        Ok(())
    }

    pub fn scale(&mut self, c: i64) -> Result<(), AlgebraError> {
        if c == 0 {
            self.terms.clear();
        }
        for d in self.terms.values_mut() {
            *d = d.checked_mul(c).ok_or(AlgebraError::Overflow)?;
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coefficient(&self, monomial: &[usize]) -> i64 {
        self.terms.get(monomial).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[usize], i64)> + '_ {
        self.terms.iter().map(|(m, &c)| (m.as_slice(), c))
    }

    pub fn degree(&self) -> usize {
        self.terms.keys().map(Vec::len).max().unwrap_or(0)
    }

    /// The gcd of the coefficients, which is zero only for the zero element.
    pub fn content(&self) -> i64 {
        self.terms.values().fold(0, |g, &c| gcd(g, c))
    }

    /// Divide every coefficient by `d`, which must divide the content.
    pub fn divide_exact(&mut self, d: i64) {
        debug_assert!(d != 0 && self.content() % d == 0);
        for c in self.terms.values_mut() {
            *c /= d;
        }
    }

    /// Coprime `(a, b)` with `b > 0` and `b * self = a * other`, if `self` and `other` are nonzero
    /// and proportional.
    pub fn proportion(&self, other: &Self) -> Option<(i64, i64)> {
        let (m, &d) = other.terms.iter().next()?;
        let c = self.coefficient(m);
        if c == 0 {
            return None;
        }
        let g = gcd(c, d);
        let (a, b) = if d < 0 { (-c / g, -d / g) } else { (c / g, d / g) };

        // Compared in i128, where products of two coefficients cannot overflow.
        let proportional = self.terms.len() == other.terms.len()
            && self.terms.iter().all(|(m, &x)| {
                i128::from(b) * i128::from(x) == i128::from(a) * i128::from(other.coefficient(m))
            });
        proportional.then_some((a, b))
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl fmt::Display for PbwElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (m, &c)) in self.terms.iter().enumerate() {
            match (i, c < 0) {
                (0, false) => (),
                (0, true) => write!(f, "-")?,
                (_, false) => write!(f, " + ")?,
                (_, true) => write!(f, " - ")?,
            }
            write!(f, "{}", c.abs())?;
            for g in m {
                write!(f, " x{g}")?;
            }
        }
        Ok(())
    }
}

/// Arithmetic in the universal enveloping algebra of a Lie algebra.
///
/// Products are brought into normal order (non-decreasing basis indices) by repeatedly applying
/// `x_a x_b = x_b x_a + [x_a, x_b]`. The normal forms of `x_g * m` for a generator `g` and a
/// normal ordered monomial `m` are memoized, so the structure should be reused for related
/// computations. Coefficients that leave `i64` are reported as [`AlgebraError::Overflow`].
pub struct PbwAlgebra<'a, L: LieAlgebra> {
    algebra: &'a L,
    cache: FxHashMap<(usize, Monomial), PbwElement>,
}

impl<'a, L: LieAlgebra> PbwAlgebra<'a, L> {
    pub fn new(algebra: &'a L) -> Self {
        Self {
            algebra,
            cache: FxHashMap::default(),
        }
    }

    pub fn algebra(&self) -> &'a L {
        self.algebra
    }

    /// The normal form of `x_g * m` for a normal ordered monomial `m`.
    pub fn left_multiply_monomial(
        &mut self,
        g: usize,
        m: &[usize],
    ) -> Result<PbwElement, AlgebraError> {
        match m.first() {
            Some(&first) if g > first => (),
            _ => {
                let mut product = Vec::with_capacity(m.len() + 1);
                product.push(g);
                product.extend_from_slice(m);
                return Ok(PbwElement::monomial(product));
            }
        }

        let key = (g, m.to_vec());
        if let Some(result) = self.cache.get(&key) {
            return Ok(result.clone());
        }

        // x_g x_first rest = x_first (x_g rest) + [x_g, x_first] rest
        let (first, rest) = (m[0], &m[1..]);
        let inner = self.left_multiply_monomial(g, rest)?;
        let mut result = self.left_multiply(first, &inner)?;
        for &(k, c) in self.algebra.bracket(g, first) {
            let term = self.left_multiply_monomial(k, rest)?;
            result.add_scaled(&term, c)?;
        }

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    pub fn left_multiply(&mut self, g: usize, x: &PbwElement) -> Result<PbwElement, AlgebraError> {
        let mut result = PbwElement::zero();
        for (m, c) in x.iter() {
            let product = self.left_multiply_monomial(g, m)?;
            result.add_scaled(&product, c)?;
        }
        Ok(result)
    }

    /// The normal form of `a * b`.
    pub fn multiply(&mut self, a: &PbwElement, b: &PbwElement) -> Result<PbwElement, AlgebraError> {
        let mut result = PbwElement::zero();
        for (m, c) in a.iter() {
            let mut product = b.clone();
            for &g in m.iter().rev() {
                product = self.left_multiply(g, &product)?;
            }
            result.add_scaled(&product, c)?;
        }
        Ok(result)
    }

    /// The weight of a monomial, as the sum of the weights of its generators.
    pub fn weight_of(&self, m: &[usize]) -> Weight {
        let mut weight = vec![0; self.algebra.rank()];
        for &g in m {
            for (w, x) in weight.iter_mut().zip(self.algebra.weight(g)) {
                *w += x;
            }
        }
        weight
    }

    /// Act by the basis element `x` on the vector `u v_λ` of the Verma module `M(λ)`. Elements of
    /// `M(λ)` are written as elements of `U(n⁻)` applied to the highest weight vector `v_λ`, so
    /// `u` must only involve negative root vectors.
    pub fn act_on_verma(
        &mut self,
        x: usize,
        lambda: &[i32],
        u: &PbwElement,
    ) -> Result<PbwElement, AlgebraError> {
        let mut result = PbwElement::zero();
        for (m, c) in u.iter() {
            let image = self.act_on_verma_monomial(x, lambda, m)?;
            result.add_scaled(&image, c)?;
        }
        Ok(result)
    }

    fn act_on_verma_monomial(
        &mut self,
        x: usize,
        lambda: &[i32],
        m: &[usize],
    ) -> Result<PbwElement, AlgebraError> {
        match self.algebra.kind(x) {
            BasisKind::Negative => self.left_multiply_monomial(x, m),
            BasisKind::Cartan => {
                let weight: Weight = self
                    .weight_of(m)
                    .iter()
                    .zip(lambda)
                    .map(|(a, b)| a + b)
                    .collect();
                let mut result = PbwElement::monomial(m.to_vec());
                result.scale(self.algebra.cartan_eval(x, &weight))?;
                Ok(result)
            }
            BasisKind::Positive => {
                let Some((&first, rest)) = m.split_first() else {
                    return Ok(PbwElement::zero());
                };
                // x (y rest) v = y (x rest v) + [x, y] rest v
                let inner = self.act_on_verma_monomial(x, lambda, rest)?;
                let mut result = self.left_multiply(first, &inner)?;
                for &(k, c) in self.algebra.bracket(x, first) {
                    let term = self.act_on_verma_monomial(k, lambda, rest)?;
                    result.add_scaled(&term, c)?;
                }
                Ok(result)
            }
        }
    }

    /// All normal ordered monomials in the negative root vectors of the given weight.
    pub fn monomials_of_weight(&self, weight: &[i32]) -> Vec<Monomial> {
        let negative: Vec<usize> = self.algebra.basis_of_kind(BasisKind::Negative);
        let remaining: Weight = weight.iter().map(|c| -c).collect();
        let mut result = Vec::new();
        self.collect_monomials(&negative, 0, remaining, &mut vec![], &mut result);
        result
    }

    fn collect_monomials(
        &self,
        generators: &[usize],
        start: usize,
        remaining: Weight,
        current: &mut Monomial,
        result: &mut Vec<Monomial>,
    ) {
        if remaining.iter().all(|&c| c == 0) {
            result.push(current.clone());
            return;
        }
        for (i, &g) in generators.iter().enumerate().skip(start) {
            // Negative root vectors have weight -β, so taking one lowers `remaining` by β.
            let next: Weight = remaining
                .iter()
                .zip(self.algebra.weight(g))
                .map(|(r, w)| r + w)
                .collect();
            if next.iter().all(|&c| c >= 0) {
                current.push(g);
                self.collect_monomials(generators, i, next, current, result);
                current.pop();
            }
        }
    }

    /// The singular vector of weight `lambda + weight` in the Verma module `M(λ)`, i.e. the
    /// element `u ∈ U(n⁻)` of the given weight such that every simple root vector kills `u v_λ`.
    ///
    /// The space of such vectors must be one dimensional, which is the case whenever
    /// `lambda + weight` is obtained from `lambda` by a reflection that shortens it in the dot
    /// action. The result is primitive with positive leading coefficient.
    pub fn singular_vector(
        &mut self,
        lambda: &[i32],
        weight: &[i32],
    ) -> Result<PbwElement, AlgebraError> {
        let columns = self.monomials_of_weight(weight);
        let raising: Vec<usize> = (0..self.algebra.rank())
            .filter_map(|i| self.algebra.simple_raising(i))
            .collect();

        let mut row_index: FxHashMap<(usize, Monomial), usize> = FxHashMap::default();
        let mut entries = Vec::new();
        for (column, m) in columns.iter().enumerate() {
            let u = PbwElement::monomial(m.clone());
            for (i, &e) in raising.iter().enumerate() {
                let image = self.act_on_verma(e, lambda, &u)?;
                for (n, c) in image.iter() {
                    let next = row_index.len();
                    let row = *row_index.entry((i, n.to_vec())).or_insert(next);
                    entries.push(((row, column), c));
                }
            }
        }
        let matrix = SparseMatrix::from_entries(row_index.len(), columns.len(), entries);
        let kernel = matrix.kernel()?;

        if kernel.len() != 1 {
            return Err(AlgebraError::SingularVectorDimension {
                highest_weight: lambda.to_vec(),
                weight: weight.to_vec(),
                dimension: kernel.len(),
            });
        }
        PbwElement::from_terms(columns.into_iter().zip(kernel[0].iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use expect_test::expect;

    use super::*;
    use crate::lie_algebra::ChevalleyAlgebra;
    use crate::root_system::RootSystem;

    fn algebra(t: &str) -> ChevalleyAlgebra {
        ChevalleyAlgebra::new(Arc::new(RootSystem::new(t.parse().unwrap()))).unwrap()
    }

    #[test]
    fn test_normal_order() {
        // In A2 the negative root vectors are 3, 4, 5 with weights -α_1, -α_2, -α_1-α_2.
        let l = algebra("A2");
        let mut u = PbwAlgebra::new(&l);
        let product = u.left_multiply_monomial(4, &[3]).unwrap();
        expect!["1 x3 x4 + 1 x5"].assert_eq(&product.to_string());

        let commutator = u
            .multiply(
                &PbwElement::monomial(vec![4]),
                &PbwElement::monomial(vec![3]),
            )
            .unwrap();
        assert_eq!(commutator, product);
        // Already normal ordered products are left alone.
        assert_eq!(
            u.left_multiply_monomial(3, &[3, 4]).unwrap(),
            PbwElement::monomial(vec![3, 3, 4])
        );
    }

    #[test]
    fn test_multiplication_is_associative() {
        let l = algebra("A3");
        let mut u = PbwAlgebra::new(&l);
        let negative = l.basis_of_kind(BasisKind::Negative);
        let a = PbwElement::from_terms([(vec![negative[5]], 1), (vec![negative[1]], 2)]);
        let b = PbwElement::monomial(vec![negative[4], negative[2]]);
        let c = PbwElement::from_terms([(vec![negative[3]], -1), (vec![negative[0]], 1)]);
        let (a, c) = (a.unwrap(), c.unwrap());
        let ab = u.multiply(&a, &b).unwrap();
        let bc = u.multiply(&b, &c).unwrap();
        assert_eq!(u.multiply(&ab, &c), u.multiply(&a, &bc));
    }

    #[test]
    fn test_sl2_singular_vectors() {
        // The singular vector of M(n α / 2) of weight -(n + 1) α is f^(n+1); in root coordinates
        // only even highest weights are integral, so look at λ = 0 and λ = α.
        let l = algebra("A1");
        let mut u = PbwAlgebra::new(&l);
        assert_eq!(
            u.singular_vector(&[0], &[-1]).unwrap(),
            PbwElement::monomial(vec![1])
        );
        assert_eq!(
            u.singular_vector(&[1], &[-3]).unwrap(),
            PbwElement::monomial(vec![1, 1, 1])
        );
        assert!(matches!(
            u.singular_vector(&[1], &[-2]),
            Err(AlgebraError::SingularVectorDimension { dimension: 0, .. })
        ));
    }

    #[test]
    fn test_singular_vector_for_non_simple_reflection() {
        // In A2, s_1 · 0 = -α_1 and s_1 s_2 · 0 = s_θ s_1 · 0 = -2α_1 - α_2.
        let l = algebra("A2");
        let mut u = PbwAlgebra::new(&l);
        let lambda = [-1, 0];
        let v = u.singular_vector(&lambda, &[-1, -1]).unwrap();
        expect!["1 x3 x4 - 1 x5"].assert_eq(&v.to_string());
        for i in 0..2 {
            let e = l.simple_raising(i).unwrap();
            assert!(u.act_on_verma(e, &lambda, &v).unwrap().is_zero());
        }
    }

    #[test]
    fn test_proportion() {
        let a = PbwElement::from_terms([(vec![3, 4], 4), (vec![5], -6)]).unwrap();
        let b = PbwElement::from_terms([(vec![3, 4], -6), (vec![5], 9)]).unwrap();
        assert_eq!(a.content(), 2);
        assert_eq!(a.proportion(&b), Some((-2, 3)));
        assert_eq!(b.proportion(&a), Some((-3, 2)));
        assert_eq!(a.proportion(&PbwElement::monomial(vec![5])), None);
        assert_eq!(a.proportion(&PbwElement::zero()), None);
    }

    #[test]
    fn test_monomials_of_weight() {
        let l = algebra("A2");
        let u = PbwAlgebra::new(&l);
        assert_eq!(
            u.monomials_of_weight(&[-2, -1]),
            vec![vec![3, 3, 4], vec![3, 5]]
        );
        assert_eq!(u.monomials_of_weight(&[0, 0]), vec![Vec::<usize>::new()]);
        assert!(u.monomials_of_weight(&[1, 0]).is_empty());
    }

    #[test]
    fn test_overflow() {
        let mut x = PbwElement::monomial(vec![3]);
        x.scale(i64::MAX).unwrap();
        assert_eq!(x.clone().scale(2), Err(AlgebraError::Overflow));
        assert_eq!(x.add_term(vec![3], 1), Err(AlgebraError::Overflow));

        // h f = f h + [h, f] = f h - 2f in sl2.
        let l = algebra("A1");
        let mut u = PbwAlgebra::new(&l);
        let mut f = PbwElement::monomial(vec![1]);
        f.scale(i64::MAX / 2 + 2).unwrap();
        assert_eq!(u.left_multiply(2, &f), Err(AlgebraError::Overflow));
    }
}

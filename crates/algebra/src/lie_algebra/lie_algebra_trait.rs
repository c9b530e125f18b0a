use crate::root_system::RootSystem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasisKind {
    /// A root vector of a positive root.
    Positive,
    /// A root vector of a negative root.
    Negative,
    /// An element of the Cartan subalgebra.
    Cartan,
}

/// A semisimple Lie algebra over the rationals with a chosen basis adapted to the root
/// decomposition: every basis element is either a root vector or lies in the Cartan subalgebra.
///
/// Basis elements are referred to by their index in `0..self.dimension()`, and elements in
/// general are sparse lists of `(index, coefficient)` pairs sorted by index. Structure constants
/// are integers, which is the case for any Chevalley basis.
///
/// Weights are written in simple root coordinates, matching [`RootSystem`]. The weight of a root
/// vector is its root and the weight of a Cartan element is zero.
pub trait LieAlgebra: Send + Sync + 'static {
    fn root_system(&self) -> &RootSystem;

    fn dimension(&self) -> usize;

    fn kind(&self, index: usize) -> BasisKind;

    fn weight(&self, index: usize) -> &[i32];

    /// The bracket `[x_i, x_j]` in terms of the basis. The result is sorted by index and contains
    /// no zero coefficients.
    fn bracket(&self, i: usize, j: usize) -> &[(usize, i64)];

    /// The basis element paired with `index` under the invariant form. This swaps the root vectors
    /// of `α` and `-α` and fixes the Cartan elements.
    fn dual(&self, index: usize) -> usize;

    /// The eigenvalue of the Cartan element `index` on vectors of the given weight.
    fn cartan_eval(&self, index: usize, weight: &[i32]) -> i64;

    /// The basis index of the root vector of `root`, if `root` is a root.
    fn root_index(&self, root: &[i32]) -> Option<usize>;

    fn rank(&self) -> usize {
        self.root_system().rank()
    }

    fn basis_of_kind(&self, kind: BasisKind) -> Vec<usize> {
        (0..self.dimension())
            .filter(|&i| self.kind(i) == kind)
            .collect()
    }

    /// The root vector of the `i`th simple root.
    fn simple_raising(&self, i: usize) -> Option<usize> {
        self.root_index(&self.root_system().simple_root(i))
    }
}

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::root_system::RootSystem;
use crate::Weight;

/// A finite Coxeter group presented by its simple generators.
///
/// This is everything the Bruhat graph needs to know about a group: how to multiply, which
/// elements are the simple generators and the reflections, and how many elements there are in
/// total. Lengths are not part of the interface, since they come out of the breadth-first
/// enumeration of the group.
pub trait CoxeterGroup {
    type Element: Clone + Eq + Hash + Debug + Send + Sync;

    fn identity(&self) -> Self::Element;

    /// The simple generators, in order.
    fn generators(&self) -> &[Self::Element];

    /// All reflections, i.e. all conjugates of the simple generators. The order determines the
    /// order in which arrows are discovered.
    fn reflections(&self) -> &[Self::Element];

    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;

    fn order(&self) -> usize;

    fn rank(&self) -> usize {
        self.generators().len()
    }
}

/// An element of a Weyl group, stored as the matrix of its action on the root lattice in simple
/// root coordinates. Column `j` is the image of `α_j`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeylElement(Box<[i32]>);

impl WeylElement {
    fn entry(&self, rank: usize, i: usize, j: usize) -> i32 {
        self.0[i * rank + j]
    }
}

pub struct WeylGroup {
    root_system: Arc<RootSystem>,
    generators: Vec<WeylElement>,
    reflections: Vec<WeylElement>,
    two_rho: Weight,
}

impl WeylGroup {
    pub fn new(root_system: Arc<RootSystem>) -> Self {
        let rank = root_system.rank();
        let generators = (0..rank)
            .map(|i| Self::reflection_matrix(&root_system, &root_system.simple_root(i)))
            .collect();
        let reflections = root_system
            .positive_roots()
            .iter()
            .map(|root| Self::reflection_matrix(&root_system, root))
            .collect();
        let two_rho = root_system.two_rho();

        Self {
            root_system,
            generators,
            reflections,
            two_rho,
        }
    }

    /// The matrix of `s_α: x ↦ x - <x, α^∨> α`.
    fn reflection_matrix(root_system: &RootSystem, root: &[i32]) -> WeylElement {
        let rank = root_system.rank();
        let mut matrix = vec![0; rank * rank];
        for j in 0..rank {
            let pairing = root_system.coroot_pairing(&root_system.simple_root(j), root);
            for i in 0..rank {
                let delta = i32::from(i == j);
                matrix[i * rank + j] = delta - pairing * root[i];
            }
        }
        WeylElement(matrix.into_boxed_slice())
    }

    pub fn root_system(&self) -> &Arc<RootSystem> {
        &self.root_system
    }

    /// The linear action `wμ`.
    pub fn act(&self, w: &WeylElement, weight: &[i32]) -> Weight {
        let rank = self.root_system.rank();
        (0..rank)
            .map(|i| (0..rank).map(|j| w.entry(rank, i, j) * weight[j]).sum())
            .collect()
    }

    /// The dot action `w·μ = w(μ + ρ) - ρ`. Since `wρ - ρ` lies in the root lattice, this is
    /// computed as `wμ + (w(2ρ) - 2ρ) / 2` without leaving the integers.
    pub fn dot_action(&self, w: &WeylElement, weight: &[i32]) -> Weight {
        let moved = self.act(w, weight);
        let shifted_rho = self.act(w, &self.two_rho);
        moved
            .into_iter()
            .zip(shifted_rho.iter().zip(&self.two_rho))
            .map(|(m, (s, r))| m + (s - r) / 2)
            .collect()
    }
}

impl CoxeterGroup for WeylGroup {
    type Element = WeylElement;

    fn identity(&self) -> WeylElement {
        let rank = self.root_system.rank();
        let mut matrix = vec![0; rank * rank];
        for i in 0..rank {
            matrix[i * rank + i] = 1;
        }
        WeylElement(matrix.into_boxed_slice())
    }

    fn generators(&self) -> &[WeylElement] {
        &self.generators
    }

    fn reflections(&self) -> &[WeylElement] {
        &self.reflections
    }

    fn multiply(&self, a: &WeylElement, b: &WeylElement) -> WeylElement {
        let rank = self.root_system.rank();
        let mut matrix = vec![0; rank * rank];
        for i in 0..rank {
            for k in 0..rank {
                let x = a.entry(rank, i, k);
                if x == 0 {
                    continue;
                }
                for j in 0..rank {
                    matrix[i * rank + j] += x * b.entry(rank, k, j);
                }
            }
        }
        WeylElement(matrix.into_boxed_slice())
    }

    fn order(&self) -> usize {
        self.root_system.cartan_type().weyl_group_order()
    }
}

use linalg::SparseMatrix;
use rustc_hash::FxHashMap;

use super::ModuleError;
use crate::pbw::PbwElement;

/// Sparse structure constants of an action: `(generator, element) -> [(target, coefficient)]`,
/// everything indexed by the basis of the ambient Lie algebra. Missing keys act by zero.
pub type ActionTable = FxHashMap<(usize, usize), Vec<(usize, i64)>>;

/// A module whose basis is a subset of the basis of a Lie algebra, acted on by the span of
/// another subset of basis elements.
#[derive(Clone, Debug)]
pub struct ModuleComponent {
    basis: Vec<usize>,
    acting: Vec<usize>,
    action: ActionTable,
}

impl ModuleComponent {
    pub fn new(mut basis: Vec<usize>, mut acting: Vec<usize>, action: ActionTable) -> Self {
        basis.sort_unstable();
        acting.sort_unstable();
        Self {
            basis,
            acting,
            action,
        }
    }

    /// The basis, as sorted indices into the basis of the Lie algebra.
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    /// The basis of the acting subalgebra.
    pub fn acting(&self) -> &[usize] {
        &self.acting
    }

    pub fn dimension(&self) -> usize {
        self.basis.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.basis.binary_search(&index).is_ok()
    }

    fn position(&self, index: usize) -> Option<usize> {
        self.basis.binary_search(&index).ok()
    }

    /// The image of a basis element under a generator. Generators outside the acting subalgebra
    /// act by zero.
    pub fn act(&self, generator: usize, element: usize) -> &[(usize, i64)] {
        self.action
            .get(&(generator, element))
            .map_or(&[], Vec::as_slice)
    }

    /// The image of a sparse vector under a generator. The result is sorted by index.
    pub fn action_on_vector(
        &self,
        generator: usize,
        vector: &[(usize, i64)],
    ) -> Result<Vec<(usize, i64)>, ModuleError> {
        let mut result: FxHashMap<usize, i64> = FxHashMap::default();
        for &(element, c) in vector {
            for &(target, d) in self.act(generator, element) {
                add_product(result.entry(target).or_insert(0), c, d)?;
            }
        }
        let mut result: Vec<_> = result.into_iter().filter(|&(_, c)| c != 0).collect();
        result.sort_unstable();
        Ok(result)
    }

    /// The matrix of a PBW element acting on this component. Row `i` is the image of the `i`th
    /// basis element, written in terms of the basis.
    pub fn pbw_action_matrix(&self, u: &PbwElement) -> Result<SparseMatrix, ModuleError> {
        let n = self.dimension();
        let mut entries = Vec::new();
        for (row, &element) in self.basis.iter().enumerate() {
            let mut image: FxHashMap<usize, i64> = FxHashMap::default();
            for (monomial, c) in u.iter() {
                let mut vector = vec![(element, c)];
                for &g in monomial.iter().rev() {
                    vector = self.action_on_vector(g, &vector)?;
                }
                for (target, d) in vector {
                    add_product(image.entry(target).or_insert(0), 1, d)?;
                }
            }
            entries.extend(image.into_iter().filter_map(|(target, c)| {
                Some(((row, self.position(target)?), c))
            }));
        }
        Ok(SparseMatrix::from_entries(n, n, entries))
    }
}

/// `*total += a * b`, failing instead of wrapping.
fn add_product(total: &mut i64, a: i64, b: i64) -> Result<(), ModuleError> {
    *total = a
        .checked_mul(b)
        .and_then(|p| total.checked_add(p))
        .ok_or(ModuleError::Overflow)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::lie_algebra::ChevalleyAlgebra;
    use crate::module::{
        ActionKind, CompositeModule, ModuleComponentFactory, Slot, SlotKind, Subalgebra,
    };
    use crate::root_system::RootSystem;

    /// On a single tensor slot the matrix agrees with the action on weight blocks.
    #[test]
    fn test_pbw_action_matrix() {
        let root_system = Arc::new(RootSystem::new("A2".parse().unwrap()));
        let algebra = Arc::new(ChevalleyAlgebra::new(root_system).unwrap());
        let factory = ModuleComponentFactory::new(Arc::clone(&algebra));
        let component = factory
            .build_component(Subalgebra::G, ActionKind::Adjoint, &[], Subalgebra::G)
            .unwrap();
        // The singular vector of weight -α_1 - α_2 in M(s_1 · 0).
        let u = PbwElement::from_terms([(vec![3, 4], 1), (vec![5], -1)]).unwrap();
        let matrix = component.pbw_action_matrix(&u).unwrap();
        assert_eq!((matrix.rows(), matrix.columns()), (8, 8));

        let module = CompositeModule::new(
            factory.weights(),
            vec![component.clone()],
            &[vec![Slot::new(0, 1, SlotKind::Tensor)]],
        )
        .unwrap();
        let mut expected: FxHashMap<(usize, usize), i64> = FxHashMap::default();
        for weight in module.weights() {
            let block = &module.weight_space(weight).unwrap().blocks()[0];
            let action = module.act_on_block(&u, block).unwrap();
            if action.is_empty() {
                continue;
            }
            let shifted = [weight[0] - 1, weight[1] - 1];
            let target = &module.weight_space(&shifted).unwrap().blocks()[0];
            for (source, hash, c) in action.iter() {
                let x = usize::from(block.row(source)[0]);
                let y = usize::from(target.row(target.position(hash).unwrap())[0]);
                let key = (component.position(x).unwrap(), component.position(y).unwrap());
                expected.insert(key, c);
            }
        }

        let actual: FxHashMap<(usize, usize), i64> = (0..matrix.rows())
            .flat_map(|i| matrix.row(i).iter().map(move |&(j, c)| ((i, j), c)))
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(matrix.nnz(), 5);
    }
}

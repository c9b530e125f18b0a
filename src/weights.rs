use std::sync::Arc;

use algebra::{CoxeterGroup, Weight, WeylElement, WeylGroup};

use crate::{BggError, BggGraph};

/// The dot action of a Weyl group on weights, with the group elements numbered as the vertices
/// of its [`BggGraph`].
pub struct WeightSet {
    group: Arc<WeylGroup>,
    elements: Vec<WeylElement>,
    lengths: Vec<usize>,
}

impl WeightSet {
    pub fn new(group: Arc<WeylGroup>, graph: &BggGraph<WeylGroup>) -> Self {
        Self {
            group,
            elements: graph.elements().to_vec(),
            lengths: (0..graph.vertex_count()).map(|v| graph.length(v)).collect(),
        }
    }

    pub fn group(&self) -> &Arc<WeylGroup> {
        &self.group
    }

    /// `w·μ` where `w` is the element at vertex `v`.
    pub fn dot_action(&self, v: usize, weight: &[i32]) -> Weight {
        self.group.dot_action(&self.elements[v], weight)
    }

    /// `w·μ` for every vertex `w`.
    pub fn vertex_weights(&self, weight: &[i32]) -> Vec<Weight> {
        self.elements
            .iter()
            .map(|w| self.group.dot_action(w, weight))
            .collect()
    }

    /// Whether `μ + ρ` lies on no reflecting hyperplane, i.e. the dot orbit of `μ` is free.
    pub fn is_regular(&self, weight: &[i32]) -> bool {
        let root_system = self.group.root_system();
        let shifted: Weight = weight
            .iter()
            .zip(root_system.two_rho())
            .map(|(w, r)| 2 * w + r)
            .collect();
        root_system
            .positive_roots()
            .iter()
            .all(|root| root_system.coroot_pairing(&shifted, root) != 0)
    }

    pub fn is_dominant(&self, weight: &[i32]) -> bool {
        self.group.root_system().is_dominant(weight)
    }

    /// The dominant weight in the dot orbit of `weight`, together with the length of the element
    /// taking it there. This is the first element in order of enumeration whose dot image is
    /// dominant.
    pub fn make_dominant(&self, weight: &[i32]) -> Result<(Weight, usize), BggError> {
        self.elements
            .iter()
            .zip(&self.lengths)
            .map(|(w, &l)| (self.group.dot_action(w, weight), l))
            .find(|(image, _)| self.is_dominant(image))
            .ok_or_else(|| BggError::NotRegular(weight.to_vec()))
    }

    /// For every regular weight, its dominant representative and the length of the Weyl group
    /// element relating the two. Weights that are not regular are dropped, since they do not
    /// contribute to cohomology.
    pub fn compute_weights<'a>(
        &self,
        weights: impl IntoIterator<Item = &'a Weight>,
    ) -> Result<Vec<(Weight, Weight, usize)>, BggError> {
        weights
            .into_iter()
            .filter(|weight| self.is_regular(weight))
            .map(|weight| {
                let (dominant, length) = self.make_dominant(weight)?;
                Ok((weight.clone(), dominant, length))
            })
            .collect()
    }

    pub fn max_length(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0)
    }

    pub fn rank(&self) -> usize {
        self.group.rank()
    }
}

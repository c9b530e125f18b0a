use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use algebra::module::CompositeModule;
use algebra::{LieAlgebra, PbwElement, Weight, WeylGroup};
use dashmap::DashMap;
#[cfg(feature = "concurrent")]
use rayon::prelude::*;

use crate::differential::Differential;
use crate::maps::compute_maps;
use crate::{BggError, BggGraph, WeightSet};

/// The cohomology of the BGG complex of a composite module.
///
/// By the BGG resolution, the cohomology of `n⁻` with coefficients in the module is computed
/// one dominant weight `μ` at a time by the complex whose term in degree `i` is
/// `⊕_(ℓ(w) = i) V_(w·μ)`. A module weight of dot-length `i` contributes to degree `i` only.
pub struct BggCohomology<L: LieAlgebra> {
    algebra: Arc<L>,
    pub(crate) graph: BggGraph<WeylGroup>,
    pub(crate) weights: WeightSet,
    pub(crate) module: Arc<CompositeModule>,
    /// `(weight, dominant representative, length)` for every regular module weight.
    regular: Vec<(Weight, Weight, usize)>,
    maps: DashMap<Weight, Arc<Vec<PbwElement>>>,
    pub(crate) differentials: DashMap<(Weight, usize), Arc<Differential>>,
}

impl<L: LieAlgebra> BggCohomology<L> {
    #[tracing::instrument(skip_all, fields(dimension = module.total_dimension()))]
    pub fn new(algebra: Arc<L>, module: Arc<CompositeModule>) -> Result<Self, BggError> {
        let group = Arc::new(WeylGroup::new(Arc::new(algebra.root_system().clone())));
        let graph = BggGraph::new(&*group)?;
        let weights = WeightSet::new(group, &graph);
        let regular = weights.compute_weights(module.weights())?;
        tracing::info!(
            weights = module.weights().count(),
            regular = regular.len(),
            "set up BGG complex"
        );
        Ok(Self {
            algebra,
            graph,
            weights,
            module,
            regular,
            maps: DashMap::new(),
            differentials: DashMap::new(),
        })
    }

    pub fn algebra(&self) -> &Arc<L> {
        &self.algebra
    }

    pub fn graph(&self) -> &BggGraph<WeylGroup> {
        &self.graph
    }

    pub fn weight_set(&self) -> &WeightSet {
        &self.weights
    }

    pub fn module(&self) -> &Arc<CompositeModule> {
        &self.module
    }

    /// The regular module weights with their dominant representatives and dot-lengths.
    pub fn regular_weights(&self) -> &[(Weight, Weight, usize)] {
        &self.regular
    }

    /// The maps between Verma modules for the dominant weight `mu`, indexed by arrow.
    pub fn maps(&self, mu: &[i32]) -> Result<Arc<Vec<PbwElement>>, BggError> {
        if let Some(maps) = self.maps.get(mu) {
            return Ok(Arc::clone(&maps));
        }
        let maps = Arc::new(compute_maps(&*self.algebra, &self.graph, &self.weights, mu)?);
        Ok(Arc::clone(self.maps.entry(mu.to_vec()).or_insert(maps).value()))
    }

    /// The multiplicity of the dominant weight `mu` in degree `degree` of the cohomology.
    #[tracing::instrument(skip(self))]
    pub fn cohomology_component(&self, mu: &[i32], degree: usize) -> Result<usize, BggError> {
        let d = self.compute_differential(mu, degree)?;
        let previous = match degree.checked_sub(1) {
            Some(i) => self.compute_differential(mu, i)?.rank(),
            None => 0,
        };
        d.source_dimension()
            .checked_sub(d.rank() + previous)
            .ok_or_else(|| BggError::NotAComplex {
                weight: mu.to_vec(),
                degree: degree.saturating_sub(1),
            })
    }

    /// The cohomology in degree `degree`, as pairs of a dominant weight and its multiplicity.
    /// Only nonzero multiplicities are listed, sorted by multiplicity and then by weight.
    #[tracing::instrument(skip(self))]
    pub fn cohomology(&self, degree: usize) -> Result<Vec<(Weight, usize)>, BggError> {
        let mut lengths: BTreeMap<&Weight, BTreeSet<usize>> = BTreeMap::new();
        for (_, dominant, length) in &self.regular {
            lengths.entry(dominant).or_default().insert(*length);
        }

        let mut result: BTreeMap<Weight, usize> = BTreeMap::new();
        let mut to_compute: BTreeSet<&Weight> = BTreeSet::new();
        for (weight, dominant, _) in self.regular.iter().filter(|r| r.2 == degree) {
            let neighbours = &lengths[dominant];
            let isolated = !(neighbours.contains(&(degree + 1))
                || degree.checked_sub(1).is_some_and(|i| neighbours.contains(&i)));
            if isolated {
                *result.entry(dominant.clone()).or_default() += self.module.dimension(weight);
            } else {
                to_compute.insert(dominant);
            }
        }
        tracing::debug!(
            isolated = result.len(),
            computed = to_compute.len(),
            "collected weights"
        );

        let to_compute: Vec<&Weight> = to_compute.into_iter().collect();
        #[cfg(feature = "concurrent")]
        let iter = to_compute.into_par_iter();
        #[cfg(not(feature = "concurrent"))]
        let iter = to_compute.into_iter();
        let computed = iter
            .map(|mu| Ok((mu.clone(), self.cohomology_component(mu, degree)?)))
            .collect::<Result<Vec<_>, BggError>>()?;
        for (mu, multiplicity) in computed {
            *result.entry(mu).or_default() += multiplicity;
        }

        let mut result: Vec<(Weight, usize)> = result.into_iter().filter(|&(_, m)| m > 0).collect();
        result.sort_by(|(w1, m1), (w2, m2)| m1.cmp(m2).then_with(|| w1.cmp(w2)));
        Ok(result)
    }

    /// The cohomology in every degree from 0 to the length of the longest element.
    pub fn cohomology_all(&self) -> Result<Vec<Vec<(Weight, usize)>>, BggError> {
        (0..=self.graph.max_length())
            .map(|degree| self.cohomology(degree))
            .collect()
    }

    /// Check that the complex squares to zero at every dominant weight the module sees.
    pub fn check_all(&self) -> Result<(), BggError> {
        let dominant: BTreeSet<&Weight> = self.regular.iter().map(|r| &r.1).collect();
        for mu in dominant {
            self.check_complex(mu)?;
        }
        Ok(())
    }
}

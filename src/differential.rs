//! Assembly of the differentials of the BGG complex.
//!
//! The term of degree `i` of the complex at a dominant weight `μ` is the direct sum of the weight
//! spaces `V_(w·μ)` over the vertices `w` of length `i`, and the differential sends
//! `v ∈ V_(w·μ)` to `Σ sign(w → w') u_(w → w') v`. Basis elements of the source are addressed by
//! their row within a weight block and basis elements of the target by their hash, so the target
//! space is never enumerated.

use std::collections::BTreeMap;
use std::sync::Arc;

use algebra::LieAlgebra;
use linalg::SparseMatrix;

use crate::{BggCohomology, BggError};

/// A basis element of a term of the complex: row `row` of the block of summand `summand` in the
/// weight space at vertex `vertex`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey {
    pub vertex: usize,
    pub summand: usize,
    pub row: usize,
}

/// A basis element of a term of the complex, identified by its hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetKey {
    pub vertex: usize,
    pub summand: usize,
    pub hash: u64,
}

/// The differential `d_i` at a fixed dominant weight.
///
/// Row `r` of the matrix is the image of `sources[r]`, in the basis `targets`. Basis elements
/// with zero image have no row, and target basis elements that are never hit have no column,
/// which does not change the rank.
#[derive(Clone, Debug)]
pub struct Differential {
    sources: Vec<SourceKey>,
    targets: Vec<TargetKey>,
    matrix: SparseMatrix,
    source_dimension: usize,
    rank: usize,
}

impl Differential {
    pub fn sources(&self) -> &[SourceKey] {
        &self.sources
    }

    pub fn targets(&self) -> &[TargetKey] {
        &self.targets
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    /// The dimension of the term of the complex the differential starts from, including the
    /// basis elements with zero image.
    pub fn source_dimension(&self) -> usize {
        self.source_dimension
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The matrix row of a source basis element, if its image is nonzero.
    pub fn row_of(&self, key: &SourceKey) -> Option<usize> {
        self.sources.binary_search(key).ok()
    }
}

impl<L: LieAlgebra> BggCohomology<L> {
    /// The differential leaving degree `degree` at the dominant weight `mu`. Results are cached.
    #[tracing::instrument(skip(self))]
    pub fn compute_differential(
        &self,
        mu: &[i32],
        degree: usize,
    ) -> Result<Arc<Differential>, BggError> {
        let key = (mu.to_vec(), degree);
        if let Some(d) = self.differentials.get(&key) {
            return Ok(Arc::clone(&d));
        }

        let maps = self.maps(mu)?;
        let vertex_weights = self.weights.vertex_weights(mu);
        let module = &self.module;

        let mut rows: BTreeMap<SourceKey, Vec<(TargetKey, i64)>> = BTreeMap::new();
        let mut source_dimension = 0;
        for &vertex in self.graph.column(degree) {
            let Some(space) = module.weight_space(&vertex_weights[vertex]) else {
                continue;
            };
            source_dimension += space.dimension();
            for &arrow in self.graph.outgoing(vertex) {
                let target = self.graph.arrows()[arrow].1;
                let sign = self.graph.sign(arrow);
                for block in space.blocks() {
                    let action = module.act_on_block(&maps[arrow], block)?;
                    for (row, hash, c) in action.iter() {
                        let source = SourceKey {
                            vertex,
                            summand: block.summand(),
                            row,
                        };
                        let target = TargetKey {
                            vertex: target,
                            summand: block.summand(),
                            hash,
                        };
                        rows.entry(source).or_default().push((target, sign * c));
                    }
                }
            }
        }

        let mut targets: Vec<TargetKey> = rows.values().flatten().map(|&(t, _)| t).collect();
        targets.sort_unstable();
        targets.dedup();

        let (sources, rows): (Vec<SourceKey>, Vec<Vec<(usize, i64)>>) = rows
            .into_iter()
            .map(|(source, row)| {
                let row = row
                    .into_iter()
                    .filter_map(|(t, c)| Some((targets.binary_search(&t).ok()?, c)))
                    .collect();
                (source, row)
            })
            .unzip();
        let matrix = SparseMatrix::from_rows(targets.len(), rows);
        let rank = matrix.rank()?;

        tracing::debug!(
            rows = matrix.rows(),
            columns = matrix.columns(),
            nnz = matrix.nnz(),
            source_dimension,
            rank,
            "assembled differential"
        );

        let d = Arc::new(Differential {
            sources,
            targets,
            matrix,
            source_dimension,
            rank,
        });
        Ok(Arc::clone(self.differentials.entry(key).or_insert(d).value()))
    }

    /// Check numerically that `d_(i+1) ∘ d_i = 0` in every degree at the dominant weight `mu`.
    #[tracing::instrument(skip(self))]
    pub fn check_complex(&self, mu: &[i32]) -> Result<(), BggError> {
        let vertex_weights = self.weights.vertex_weights(mu);
        for degree in 0..self.graph.max_length().saturating_sub(1) {
            let first = self.compute_differential(mu, degree)?;
            let second = self.compute_differential(mu, degree + 1)?;

            // Reindex d_(i+1) by the columns of d_i, so that the composite is a matrix product.
            let mut rows = Vec::with_capacity(first.targets().len());
            for target in first.targets() {
                let weight = &vertex_weights[target.vertex];
                let position = self
                    .module
                    .weight_space(weight)
                    .and_then(|space| space.block(target.summand))
                    .and_then(|block| block.position(target.hash))
                    .ok_or_else(|| BggError::MissingBasisElement {
                        weight: weight.clone(),
                        summand: target.summand,
                        hash: target.hash,
                    })?;
                let source = SourceKey {
                    vertex: target.vertex,
                    summand: target.summand,
                    row: position,
                };
                rows.push(
                    second
                        .row_of(&source)
                        .map_or_else(Vec::new, |r| second.matrix().row(r).to_vec()),
                );
            }
            let reindexed = SparseMatrix::from_rows(second.matrix().columns(), rows);
            if !first.matrix().mul(&reindexed)?.is_zero() {
                return Err(BggError::NotAComplex {
                    weight: mu.to_vec(),
                    degree,
                });
            }
        }
        tracing::debug!(?mu, "checked d ∘ d = 0");
        Ok(())
    }
}

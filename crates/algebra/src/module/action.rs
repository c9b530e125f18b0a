use std::collections::hash_map::Entry;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use super::composite::{SlotGroup, Summand};
use super::{CompositeModule, ModuleError, SlotKind, WeightBlock};
use crate::pbw::PbwElement;

/// The image of every basis element of a [`WeightBlock`] under a PBW element.
///
/// The image of row `sources[k]` has coefficient `coefficients[k]` on the basis element of the
/// same summand with hash `hashes[k]`. Entries are sorted by `(source, hash)` and coefficients
/// are nonzero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockAction {
    pub summand: usize,
    pub sources: Vec<usize>,
    pub hashes: Vec<u64>,
    pub coefficients: Vec<i64>,
}

impl BlockAction {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u64, i64)> + '_ {
        self.sources
            .iter()
            .zip(&self.hashes)
            .zip(&self.coefficients)
            .map(|((&s, &h), &c)| (s, h, c))
    }
}

#[derive(Clone, Debug)]
struct Term {
    source: usize,
    row: Vec<u16>,
    hash: u64,
    coefficient: i64,
}

impl CompositeModule {
    /// Act by `u` on every basis element of `block`.
    pub fn act_on_block(
        &self,
        u: &PbwElement,
        block: &WeightBlock,
    ) -> Result<BlockAction, ModuleError> {
        let summand = &self.summands[block.summand()];
        let mut totals: FxHashMap<(usize, u64), i64> = FxHashMap::default();

        for (monomial, c) in u.iter() {
            let mut terms: Vec<Term> = (0..block.len())
                .map(|source| Term {
                    source,
                    row: block.row(source).to_vec(),
                    hash: block.hash(source),
                    coefficient: c,
                })
                .collect();
            for &g in monomial.iter().rev() {
                if terms.is_empty() {
                    break;
                }
                terms = self.apply_generator(summand, g, &terms)?;
            }
            for term in terms {
                let total = totals.entry((term.source, term.hash)).or_insert(0);
                *total = total
                    .checked_add(term.coefficient)
                    .ok_or(ModuleError::Overflow)?;
            }
        }

        let mut entries: Vec<_> = totals.into_iter().filter(|&(_, c)| c != 0).collect();
        entries.sort_unstable_by_key(|&(key, _)| key);

        let mut result = BlockAction {
            summand: block.summand(),
            ..Default::default()
        };
        for ((source, hash), c) in entries {
            result.sources.push(source);
            result.hashes.push(hash);
            result.coefficients.push(c);
        }
        Ok(result)
    }

    /// Apply one generator to a list of terms, acting as a derivation on every column.
    fn apply_generator(
        &self,
        summand: &Summand,
        generator: usize,
        terms: &[Term],
    ) -> Result<Vec<Term>, ModuleError> {
        let mut result: Vec<Term> = Vec::new();
        let mut index: FxHashMap<(usize, u64), usize> = FxHashMap::default();
        let mut order: Vec<usize> = (0..terms.len()).collect();

        for group in &summand.groups {
            let table = self.generator_action(generator, group.component);
            for column in group.columns.clone() {
                order.sort_unstable_by_key(|&t| terms[t].row[column]);
                for (old, run) in &order.iter().group_by(|&&t| terms[t].row[column]) {
                    let images = &table[usize::from(old)];
                    if images.is_empty() {
                        continue;
                    }
                    for &t in run {
                        let term = &terms[t];
                        for &(new, a) in images {
                            let Some((row, sign)) = replace(group, &term.row, column, new) else {
                                continue;
                            };
                            let delta = self.powers[usize::from(new)]
                                .wrapping_sub(self.powers[usize::from(old)]);
                            let hash = term.hash.wrapping_add(group.prime.wrapping_mul(delta));
                            let coefficient = (sign * a)
                                .checked_mul(term.coefficient)
                                .ok_or(ModuleError::Overflow)?;
                            match index.entry((term.source, hash)) {
                                Entry::Occupied(e) => {
                                    let existing = &mut result[*e.get()].coefficient;
                                    *existing = existing
                                        .checked_add(coefficient)
                                        .ok_or(ModuleError::Overflow)?;
                                }
                                Entry::Vacant(e) => {
                                    e.insert(result.len());
                                    result.push(Term {
                                        source: term.source,
                                        row,
                                        hash,
                                        coefficient,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        result.retain(|t| t.coefficient != 0);
        Ok(result)
    }
}

/// Replace the entry of `row` in `column` by `new` and restore the canonical order of the group
/// containing it. Returns the new row together with the sign of the reordering, or `None` if the
/// result vanishes.
fn replace(group: &SlotGroup, row: &[u16], column: usize, new: u16) -> Option<(Vec<u16>, i64)> {
    let columns = group.columns.clone();
    let mut result = row.to_vec();
    let sign = match group.kind {
        SlotKind::Tensor | SlotKind::Symmetric => 1,
        SlotKind::Exterior => {
            let position = column - columns.start;
            let mut smaller = 0;
            for (k, &x) in row[columns.clone()].iter().enumerate() {
                if k == position {
                    continue;
                }
                if x == new {
                    return None;
                }
                if x < new {
                    smaller += 1;
                }
            }
            if (position + smaller) % 2 == 0 {
                1
            } else {
                -1
            }
        }
    };
    result[column] = new;
    if group.kind != SlotKind::Tensor {
        result[columns].sort_unstable();
    }
    Some((result, sign))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::lie_algebra::{ChevalleyAlgebra, LieAlgebra};
    use crate::module::{ActionKind, ModuleComponentFactory, Slot, Subalgebra};
    use crate::root_system::RootSystem;

    fn setup(
        t: &str,
        components: &[(Subalgebra, ActionKind, Subalgebra)],
        descriptors: &[Vec<Slot>],
    ) -> (Arc<ChevalleyAlgebra>, CompositeModule) {
        let root_system = Arc::new(RootSystem::new(t.parse().unwrap()));
        let algebra = Arc::new(ChevalleyAlgebra::new(root_system).unwrap());
        let f = ModuleComponentFactory::new(Arc::clone(&algebra));
        let components = components
            .iter()
            .map(|&(s, k, a)| f.build_component(s, k, &[], a).unwrap())
            .collect();
        let module = CompositeModule::new(f.weights(), components, descriptors).unwrap();
        (algebra, module)
    }

    /// Expand a block action into a map `(source, target row) -> coefficient`, checking that every
    /// hash lands on a basis element of the expected weight.
    fn expand(
        module: &CompositeModule,
        action: &BlockAction,
        target: &[i32],
    ) -> FxHashMap<(usize, usize), i64> {
        let block = module
            .weight_space(target)
            .and_then(|s| s.block(action.summand));
        action
            .iter()
            .map(|(s, h, c)| {
                let row = block.and_then(|b| b.position(h)).unwrap();
                ((s, row), c)
            })
            .collect()
    }

    #[test]
    fn test_identity() {
        use SlotKind::*;
        let (_, m) = setup(
            "A2",
            &[
                (Subalgebra::G, ActionKind::Adjoint, Subalgebra::N),
                (Subalgebra::U, ActionKind::Coadjoint, Subalgebra::B),
            ],
            &[
                vec![Slot::new(0, 2, Exterior), Slot::new(1, 1, Symmetric)],
                vec![Slot::new(1, 2, Tensor)],
            ],
        );
        let one = PbwElement::one();
        for weight in m.weights() {
            for block in m.weight_space(weight).unwrap().blocks() {
                let action = m.act_on_block(&one, block).unwrap();
                assert_eq!(action.sources, (0..block.len()).collect::<Vec<_>>());
                assert_eq!(action.hashes, block.hashes());
                assert!(action.coefficients.iter().all(|&c| c == 1));
            }
        }
    }

    #[test]
    fn test_sl2_adjoint() {
        // f e = [f, e] = h and f h = [f, h] = 2f
        let (l, m) = setup(
            "A1",
            &[(Subalgebra::G, ActionKind::Adjoint, Subalgebra::N)],
            &[vec![Slot::new(0, 1, SlotKind::Tensor)]],
        );
        let f = PbwElement::monomial(vec![1]);
        let top = m.weight_space(&[1]).unwrap();
        let action = m.act_on_block(&f, &top.blocks()[0]).unwrap();
        let image = expand(&m, &action, &[0]);
        assert_eq!(image.len(), 1);
        assert_eq!(image[&(0, 0)], l.bracket(1, 0)[0].1);

        let ff = PbwElement::monomial(vec![1, 1]);
        let action = m.act_on_block(&ff, &top.blocks()[0]).unwrap();
        let image = expand(&m, &action, &[-1]);
        // [f, [f, e]] = [f, h] = 2f
        assert_eq!(image[&(0, 0)], 2);
    }

    #[test]
    fn test_overflow() {
        let (_, m) = setup(
            "A1",
            &[(Subalgebra::G, ActionKind::Adjoint, Subalgebra::N)],
            &[vec![Slot::new(0, 1, SlotKind::Tensor)]],
        );
        let top = &m.weight_space(&[1]).unwrap().blocks()[0];
        // f f e = [f, h] = 2f
        let mut ff = PbwElement::monomial(vec![1, 1]);
        ff.scale(i64::MAX / 2 + 2).unwrap();
        assert_eq!(m.act_on_block(&ff, top), Err(ModuleError::Overflow));
    }

    #[test]
    fn test_exterior_square_vanishes() {
        // f acting on e ∧ h in Λ²(sl2): f e = h and f h = 2f, so f(e ∧ h) = h ∧ h + e ∧ 2f, and
        // the first term must vanish.
        let (_, m) = setup(
            "A1",
            &[(Subalgebra::G, ActionKind::Adjoint, Subalgebra::N)],
            &[vec![Slot::new(0, 2, SlotKind::Exterior)]],
        );
        let block = &m.weight_space(&[1]).unwrap().blocks()[0];
        assert_eq!(block.row(0), &[0, 2]);
        let action = m.act_on_block(&PbwElement::monomial(vec![1]), block).unwrap();
        let image = expand(&m, &action, &[0]);
        let target = m.weight_space(&[0]).unwrap().blocks()[0].row(0).to_vec();
        assert_eq!(target, vec![0, 1]);
        assert_eq!(image.len(), 1);
        assert_eq!(image[&(0, 0)], 2);
    }

    /// Acting by a product is acting by the factors in turn, and the action respects the bracket.
    #[test]
    fn test_representation() {
        use SlotKind::*;
        let (l, m) = setup(
            "A2",
            &[(Subalgebra::G, ActionKind::Adjoint, Subalgebra::G)],
            &[vec![Slot::new(0, 2, Exterior), Slot::new(0, 1, Tensor)]],
        );
        let weight = vec![0, 0];
        let block = &m.weight_space(&weight).unwrap().blocks()[0];
        let positive = l.basis_of_kind(crate::BasisKind::Positive);
        let negative = l.basis_of_kind(crate::BasisKind::Negative);
        for &x in &positive {
            for &y in &negative {
                let target: Vec<i32> = l
                    .weight(x)
                    .iter()
                    .zip(l.weight(y))
                    .map(|(a, b)| a + b)
                    .collect();
                if m.weight_space(&target).is_none() {
                    continue;
                }
                let xy = m.act_on_block(&PbwElement::monomial(vec![x, y]), block).unwrap();
                let yx = m.act_on_block(&PbwElement::monomial(vec![y, x]), block).unwrap();
                let bracket =
                    PbwElement::from_terms(l.bracket(x, y).iter().map(|&(k, c)| (vec![k], c)))
                        .unwrap();
                let mut commutator = PbwElement::monomial(vec![x, y]);
                commutator.add_term(vec![y, x], -1).unwrap();
                let lhs = m.act_on_block(&commutator, block).unwrap();
                let rhs = m.act_on_block(&bracket, block).unwrap();
                assert_eq!(lhs, rhs, "x = {x}, y = {y}");

                let mut sum = expand(&m, &xy, &target);
                for (key, c) in expand(&m, &yx, &target) {
                    *sum.entry(key).or_insert(0) -= c;
                }
                sum.retain(|_, c| *c != 0);
                assert_eq!(sum, expand(&m, &rhs, &target));
            }
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{ModuleComponent, ModuleError};
use crate::Weight;

const HASH_BASE: u64 = 33;
const HASH_PRIME: u64 = 7919;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    #[serde(rename = "tensor")]
    Tensor,
    #[serde(rename = "sym")]
    Symmetric,
    #[serde(rename = "wedge")]
    Exterior,
}

impl FromStr for SlotKind {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tensor" => Ok(Self::Tensor),
            "sym" => Ok(Self::Symmetric),
            "wedge" => Ok(Self::Exterior),
            _ => Err(ModuleError::UnknownSlotKind(s.to_owned())),
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Tensor => "tensor",
            Self::Symmetric => "sym",
            Self::Exterior => "wedge",
        };
        write!(f, "{name}")
    }
}

/// A tensor factor of a summand: the `power`th tensor, symmetric or exterior power of a
/// component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    pub component: usize,
    pub power: usize,
    pub kind: SlotKind,
}

impl Slot {
    pub fn new(component: usize, power: usize, kind: SlotKind) -> Self {
        Self {
            component,
            power,
            kind,
        }
    }
}

/// A run of columns of a summand whose entries are permuted together. Symmetric and exterior
/// powers form one group; a tensor power of degree `k` forms `k` groups of one column each.
#[derive(Clone, Debug)]
pub(super) struct SlotGroup {
    pub(super) component: usize,
    pub(super) kind: SlotKind,
    pub(super) columns: Range<usize>,
    pub(super) prime: u64,
}

#[derive(Clone, Debug)]
pub(super) struct Summand {
    pub(super) groups: Vec<SlotGroup>,
    pub(super) width: usize,
}

/// The basis elements of one summand inside one weight space.
///
/// A basis element is a row of `width` indices into the basis of the Lie algebra, sorted within
/// every symmetric or exterior group. Rows are stored contiguously and ordered by hash.
#[derive(Clone, Debug)]
pub struct WeightBlock {
    summand: usize,
    width: usize,
    rows: Vec<u16>,
    hashes: Vec<u64>,
}

impl WeightBlock {
    pub fn summand(&self) -> usize {
        self.summand
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn row(&self, index: usize) -> &[u16] {
        &self.rows[index * self.width..(index + 1) * self.width]
    }

    pub fn hash(&self, index: usize) -> u64 {
        self.hashes[index]
    }

    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    /// The row with the given hash.
    pub fn position(&self, hash: u64) -> Option<usize> {
        self.hashes.binary_search(&hash).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct WeightSpace {
    blocks: Vec<WeightBlock>,
}

impl WeightSpace {
    /// The nonempty blocks, in order of summand.
    pub fn blocks(&self) -> &[WeightBlock] {
        &self.blocks
    }

    pub fn block(&self, summand: usize) -> Option<&WeightBlock> {
        self.blocks.iter().find(|b| b.summand == summand)
    }

    pub fn dimension(&self) -> usize {
        self.blocks.iter().map(WeightBlock::len).sum()
    }
}

/// `table[x]` is the image of the Lie algebra basis element `x` under a fixed generator.
pub type GeneratorTable = Arc<[Vec<(u16, i64)>]>;

/// A direct sum of tensor products of tensor, symmetric and exterior powers of
/// [`ModuleComponent`]s.
///
/// Every basis element is assigned the hash
/// ```text
/// Σ_groups 7919^(g + 1) Σ_(columns in group) 33^(index)
/// ```
/// in wrapping `u64` arithmetic, where `g` is the ordinal of the group within the summand. This
/// is invariant under permutations within a group and changes by `7919^(g + 1) (33^new - 33^old)`
/// when one entry is replaced, which is what the PBW action engine relies on. Hashes are only
/// required to be distinct between basis elements of the same summand and weight, and by default
/// this is checked during construction at the cost of one pass over every weight space.
pub struct CompositeModule {
    pub(super) weights: Vec<Weight>,
    pub(super) components: Vec<ModuleComponent>,
    pub(super) summands: Vec<Summand>,
    pub(super) powers: Vec<u64>,
    spaces: BTreeMap<Weight, WeightSpace>,
    tables: DashMap<(usize, usize), GeneratorTable>,
}

impl CompositeModule {
    /// Construct the module. `weights[x]` is the weight of the basis element `x` of the Lie
    /// algebra, and each entry of `descriptors` describes one direct summand.
    pub fn new(
        weights: Vec<Weight>,
        components: Vec<ModuleComponent>,
        descriptors: &[Vec<Slot>],
    ) -> Result<Self, ModuleError> {
        Self::with_collision_check(weights, components, descriptors, true)
    }

    pub fn with_collision_check(
        weights: Vec<Weight>,
        components: Vec<ModuleComponent>,
        descriptors: &[Vec<Slot>],
        check_collisions: bool,
    ) -> Result<Self, ModuleError> {
        if weights.len() > usize::from(u16::MAX) {
            return Err(ModuleError::AmbientTooLarge(weights.len()));
        }
        let powers: Vec<u64> =
            std::iter::successors(Some(1u64), |p| Some(p.wrapping_mul(HASH_BASE)))
                .take(weights.len())
                .collect();

        let summands = descriptors
            .iter()
            .map(|slots| Self::summand(slots, components.len()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut module = Self {
            weights,
            components,
            summands,
            powers,
            spaces: BTreeMap::new(),
            tables: DashMap::new(),
        };
        module.spaces = module.compute_weight_spaces(check_collisions)?;

        let total = module.total_dimension();
        let max_index = module
            .components
            .iter()
            .filter_map(|c| c.basis().last())
            .max()
            .copied()
            .unwrap_or(0);
        if max_index > 5 * total {
            tracing::warn!(
                max_index,
                total,
                "basis indices are sparse compared to the size of the module"
            );
        }
        tracing::info!(
            dimension = total,
            weights = module.spaces.len(),
            summands = module.summands.len(),
            "constructed composite module"
        );
        Ok(module)
    }

    fn summand(slots: &[Slot], component_count: usize) -> Result<Summand, ModuleError> {
        let mut groups = Vec::new();
        let mut width = 0;
        for slot in slots {
            if slot.component >= component_count {
                return Err(ModuleError::UnknownComponent {
                    index: slot.component,
                    count: component_count,
                });
            }
            let sizes = match (slot.kind, slot.power) {
                (_, 0) => vec![],
                (SlotKind::Tensor, p) => vec![1; p],
                (_, p) => vec![p],
            };
            for size in sizes {
                let ordinal = u32::try_from(groups.len() + 1).unwrap_or(u32::MAX);
                groups.push(SlotGroup {
                    component: slot.component,
                    kind: slot.kind,
                    columns: width..width + size,
                    prime: HASH_PRIME.wrapping_pow(ordinal),
                });
                width += size;
            }
        }
        Ok(Summand { groups, width })
    }

    fn group_basis(&self, group: &SlotGroup) -> Vec<Vec<u16>> {
        // Indices were checked to fit in u16 at construction.
        let basis = self.components[group.component]
            .basis()
            .iter()
            .map(|&x| x as u16);
        let size = group.columns.len();
        match group.kind {
            SlotKind::Tensor => basis.map(|x| vec![x]).collect(),
            SlotKind::Symmetric => basis.combinations_with_replacement(size).collect(),
            SlotKind::Exterior => basis.combinations(size).collect(),
        }
    }

    fn compute_weight_spaces(
        &self,
        check_collisions: bool,
    ) -> Result<BTreeMap<Weight, WeightSpace>, ModuleError> {
        let rank = self.weights.first().map_or(0, Vec::len);
        let mut spaces: BTreeMap<Weight, WeightSpace> = BTreeMap::new();

        for (index, summand) in self.summands.iter().enumerate() {
            let rows = summand
                .groups
                .iter()
                .fold(vec![vec![]], |rows: Vec<Vec<u16>>, group| {
                    let basis = self.group_basis(group);
                    rows.iter()
                        .cartesian_product(&basis)
                        .map(|(row, part)| [row.as_slice(), part.as_slice()].concat())
                        .collect()
                });

            let mut by_weight: BTreeMap<Weight, Vec<(u64, Vec<u16>)>> = BTreeMap::new();
            for row in rows {
                let mut weight = vec![0; rank];
                for &x in &row {
                    for (w, c) in weight.iter_mut().zip(&self.weights[usize::from(x)]) {
                        *w += c;
                    }
                }
                let hash = self.hash_row(index, &row);
                by_weight.entry(weight).or_default().push((hash, row));
            }

            for (weight, mut elements) in by_weight {
                elements.sort_unstable_by_key(|(hash, _)| *hash);
                if check_collisions {
                    check_distinct(&elements, &weight, index)?;
                }
                tracing::trace!(summand = index, ?weight, size = elements.len());
                let (hashes, rows): (Vec<u64>, Vec<Vec<u16>>) = elements.into_iter().unzip();
                spaces.entry(weight).or_default().blocks.push(WeightBlock {
                    summand: index,
                    width: summand.width,
                    rows: rows.concat(),
                    hashes,
                });
            }
        }
        Ok(spaces)
    }

    /// The hash of a row of the given summand.
    pub fn hash_row(&self, summand: usize, row: &[u16]) -> u64 {
        self.summands[summand]
            .groups
            .iter()
            .map(|group| {
                row[group.columns.clone()]
                    .iter()
                    .fold(0u64, |acc, &x| acc.wrapping_add(self.powers[usize::from(x)]))
                    .wrapping_mul(group.prime)
            })
            .fold(0, u64::wrapping_add)
    }

    /// The action of `generator` on the Lie algebra basis elements of `component`, as a table
    /// indexed by Lie algebra basis element. Tables are computed once and shared.
    pub fn generator_action(&self, generator: usize, component: usize) -> GeneratorTable {
        if let Some(table) = self.tables.get(&(generator, component)) {
            return Arc::clone(&table);
        }
        let c = &self.components[component];
        let table: GeneratorTable = (0..self.weights.len())
            .map(|x| {
                c.act(generator, x)
                    .iter()
                    .map(|&(y, coefficient)| (y as u16, coefficient))
                    .collect()
            })
            .collect();
        Arc::clone(
            self.tables
                .entry((generator, component))
                .or_insert(table)
                .value(),
        )
    }

    pub fn components(&self) -> &[ModuleComponent] {
        &self.components
    }

    pub fn summand_count(&self) -> usize {
        self.summands.len()
    }

    /// The weights of the Lie algebra basis elements.
    pub fn ambient_weights(&self) -> &[Weight] {
        &self.weights
    }

    /// The weights with nonzero weight spaces, in increasing order.
    pub fn weights(&self) -> impl Iterator<Item = &Weight> + '_ {
        self.spaces.keys()
    }

    pub fn weight_space(&self, weight: &[i32]) -> Option<&WeightSpace> {
        self.spaces.get(weight)
    }

    pub fn dimension(&self, weight: &[i32]) -> usize {
        self.weight_space(weight).map_or(0, WeightSpace::dimension)
    }

    pub fn total_dimension(&self) -> usize {
        self.spaces.values().map(WeightSpace::dimension).sum()
    }

    /// The dimension of every weight space.
    pub fn character(&self) -> FxHashMap<Weight, usize> {
        self.spaces
            .iter()
            .map(|(w, s)| (w.clone(), s.dimension()))
            .collect()
    }
}

/// `elements` must be sorted by hash.
fn check_distinct(
    elements: &[(u64, Vec<u16>)],
    weight: &[i32],
    summand: usize,
) -> Result<(), ModuleError> {
    if elements.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(ModuleError::HashCollision {
            weight: weight.to_vec(),
            summand,
        });
    }
    Ok(())
}

#[cfg(feature = "proptest")]
pub mod arbitrary {
    use proptest::prelude::*;

    use super::*;

    pub const MAX_COMPONENTS: usize = 3;
    pub const MAX_POWER: usize = 2;
    pub const MAX_SLOTS: usize = 2;
    pub const MAX_SUMMANDS: usize = 2;

    #[derive(Debug, Clone)]
    pub struct SlotArbParams {
        pub component: BoxedStrategy<usize>,
        pub power: BoxedStrategy<usize>,
    }

    impl Default for SlotArbParams {
        fn default() -> Self {
            Self {
                component: (0..MAX_COMPONENTS).boxed(),
                power: (0..=MAX_POWER).boxed(),
            }
        }
    }

    impl Arbitrary for Slot {
        type Parameters = SlotArbParams;
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
            let kind = prop_oneof![
                Just(SlotKind::Tensor),
                Just(SlotKind::Symmetric),
                Just(SlotKind::Exterior),
            ];
            (args.component, args.power, kind)
                .prop_map(|(component, power, kind)| Self::new(component, power, kind))
                .boxed()
        }
    }

    /// Descriptors of a module with up to [`MAX_SUMMANDS`] summands of up to [`MAX_SLOTS`] slots.
    pub fn arb_descriptors(args: SlotArbParams) -> impl Strategy<Value = Vec<Vec<Slot>>> {
        let slot = Slot::arbitrary_with(args);
        proptest::collection::vec(
            proptest::collection::vec(slot, 0..=MAX_SLOTS),
            1..=MAX_SUMMANDS,
        )
    }
}

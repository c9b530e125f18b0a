//! Weight modules over subalgebras of a [`LieAlgebra`](crate::LieAlgebra).
//!
//! Atomic [`ModuleComponent`]s are subspaces of the Lie algebra itself, acted on by a subalgebra
//! through the adjoint or coadjoint action. They are produced by the
//! [`ModuleComponentFactory`]. A [`CompositeModule`] is a direct sum of tensor products of
//! tensor, symmetric and exterior powers of components, and its basis elements are addressed by
//! hashes so that PBW elements can act without looking basis elements up.

mod action;
mod component;
mod composite;
mod factory;

pub use action::BlockAction;
pub use component::{ActionTable, ModuleComponent};
pub use composite::{CompositeModule, GeneratorTable, Slot, SlotKind, WeightBlock, WeightSpace};
pub use factory::{ActionKind, ModuleComponentFactory, Subalgebra};

#[cfg(feature = "proptest")]
pub use composite::arbitrary;

use crate::Weight;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    #[error(
        "subspace is not closed under the action: [x_{generator}, x_{element}] has a component \
         along x_{outside}"
    )]
    ClosureViolation {
        generator: usize,
        element: usize,
        outside: usize,
    },
    #[error("unknown subalgebra {0:?}, expected one of g, n, u, b, p")]
    UnknownSubalgebra(String),
    #[error("unknown action kind {0:?}, expected ad or coad")]
    UnknownActionKind(String),
    #[error("unknown slot kind {0:?}, expected tensor, sym or wedge")]
    UnknownSlotKind(String),
    #[error("module refers to component {index} but only {count} components were given")]
    UnknownComponent { index: usize, count: usize },
    #[error("simple root index {index} out of range for rank {rank}")]
    InvalidSubset { index: usize, rank: usize },
    #[error("two basis elements of summand {summand} in weight space {weight:?} share a hash")]
    HashCollision { weight: Weight, summand: usize },
    #[error("Lie algebra of dimension {0} is too large to index basis elements with u16")]
    AmbientTooLarge(usize),
    #[error("integer overflow while acting on the module")]
    Overflow,
}

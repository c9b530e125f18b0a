//! Cohomology of the Bernstein–Gelfand–Gelfand complex of a composite weight module.
//!
//! The pieces are
//!  - [`bgg_graph`]: the Bruhat graph of a Weyl group, with signs making every square
//!    anticommute;
//!  - [`weights`]: the dot action, regularity and dominant representatives;
//!  - [`maps`]: the maps between Verma modules attached to the arrows of the graph;
//!  - [`differential`]: the differentials of the complex as sparse integer matrices;
//!  - [`cohomology`]: ranks of differentials assembled into cohomology.
//!
//! The modules themselves come from [`algebra::module`], and [`utils`] builds everything from a
//! JSON configuration.

#![allow(clippy::type_complexity)]
#![allow(clippy::implicit_hasher)]
#![warn(clippy::default_trait_access)]
#![warn(clippy::if_not_else)]
#![warn(clippy::needless_continue)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::explicit_into_iter_loop)]

pub mod bgg_graph;
pub mod cohomology;
pub mod differential;
pub mod maps;
pub mod utils;
pub mod weights;

pub use bgg_graph::BggGraph;
pub use cohomology::BggCohomology;
pub use differential::{Differential, SourceKey, TargetKey};
pub use weights::WeightSet;

use algebra::module::ModuleError;
use algebra::{AlgebraError, Weight};
use linalg::LinalgError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BggError {
    #[error("enumerated {found} group elements but the group has order {order}")]
    EnumerationStalled { found: usize, order: usize },
    #[error("conflicting signs for the arrow {tail} -> {head}")]
    SignConflict { tail: usize, head: usize },
    #[error("the square {0:?} does not anticommute")]
    SquareSign((usize, usize, usize, usize)),
    #[error("the square {0:?} of Verma module maps does not commute")]
    SquareMaps((usize, usize, usize, usize)),
    #[error("weight {0:?} is not regular for the dot action")]
    NotRegular(Weight),
    #[error("weight {0:?} is not dominant")]
    NotDominant(Weight),
    #[error("no basis element with hash {hash} in summand {summand} of weight space {weight:?}")]
    MissingBasisElement {
        weight: Weight,
        summand: usize,
        hash: u64,
    },
    #[error("d ∘ d is nonzero in degree {degree} at dominant weight {weight:?}")]
    NotAComplex { weight: Weight, degree: usize },
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

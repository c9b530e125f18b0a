//! Lie theoretic input of the BGG complex: root systems and Weyl groups, integral bases of the
//! simple Lie algebras, PBW arithmetic in their universal enveloping algebras, and the
//! composite weight modules the complex is built from.

#![deny(clippy::use_self)]

pub mod lie_algebra;
pub mod module;
pub mod pbw;
pub mod root_system;
pub mod weyl_group;

pub use lie_algebra::{BasisKind, ChevalleyAlgebra, LieAlgebra};
pub use pbw::{PbwAlgebra, PbwElement};
pub use root_system::{CartanType, RootSystem};
pub use weyl_group::{CoxeterGroup, WeylElement, WeylGroup};

use linalg::LinalgError;

/// An integral weight in simple root coordinates.
pub type Weight = Vec<i32>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    #[error("unknown Cartan type {0:?}")]
    UnknownCartanType(String),
    #[error("the diagram automorphism of {unfolded} does not fold onto type {folded}")]
    Folding {
        folded: CartanType,
        unfolded: CartanType,
    },
    #[error(
        "singular vectors of weight {weight:?} in the Verma module of highest weight \
         {highest_weight:?} form a space of dimension {dimension}, expected 1"
    )]
    SingularVectorDimension {
        highest_weight: Weight,
        weight: Weight,
        dimension: usize,
    },
    #[error("integer overflow in PBW arithmetic")]
    Overflow,
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

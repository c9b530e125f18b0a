mod chevalley_algebra;
mod folding;
mod lie_algebra_trait;

pub use chevalley_algebra::ChevalleyAlgebra;
pub use lie_algebra_trait::{BasisKind, LieAlgebra};

//! Exact linear algebra over the integers.
//!
//! Everything here is exact: ranks and kernels are computed by fraction-free elimination with
//! `i128` intermediates, and rows are divided by their content after every step to keep the
//! entries small. If an entry does not fit back into an `i64`, the computation fails with
//! [`LinalgError::Overflow`] instead of returning a wrong answer.

mod arith;
pub mod matrix;

pub use matrix::SparseMatrix;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
    #[error("integer overflow during exact elimination")]
    Overflow,
    #[error("cannot multiply a matrix with {left} columns by a matrix with {right} rows")]
    DimensionMismatch { left: usize, right: usize },
}

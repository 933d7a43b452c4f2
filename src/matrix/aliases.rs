//! Element-type aliases for [`DenseMatrix`].

use super::DenseMatrix;

/// Single-precision dense matrix, the element type of every public
/// decomposition input and output.
pub type Matrix = DenseMatrix<f32>;

/// Double-precision working buffer used inside the eigenvalue and SVD
/// iterations. Never handed to callers.
pub(crate) type WorkMatrix = DenseMatrix<f64>;

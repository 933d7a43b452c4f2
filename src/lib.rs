//! # linfact
//!
//! Dense matrix decompositions over single-precision matrices: LU,
//! Cholesky, QR, eigenvalue, and singular value decomposition.
//!
//! ## Quick start
//!
//! ```
//! use linfact::Matrix;
//!
//! // Solve a linear system AX = B
//! let a = Matrix::from_rows(3, 3, &[
//!     2.0, 1.0, -1.0,
//!     -3.0, -1.0, 2.0,
//!     -2.0, 1.0, 2.0,
//! ]);
//! let b = Matrix::column_vector(&[8.0, -11.0, -3.0]);
//! let x = a.solve(&b).unwrap(); // x = [2, 3, -1]
//! assert!((x[(0, 0)] - 2.0).abs() < 1e-5);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`]: Heap-allocated `DenseMatrix<T>` with column-major
//!   storage and runtime dimensions. [`Matrix`] is the `f32` alias every
//!   decomposition consumes and returns. Indexing, transpose, sub-matrix
//!   extraction, arithmetic, symmetry and squareness checks.
//!
//! - [`linalg`]: The decompositions. Each constructor factorizes eagerly
//!   from a clone of its input and returns an immutable result; accessors
//!   materialize fresh matrices.
//!   - [`LuDecomposition`]: partial pivoting; `solve`, `determinant`, `inverse`.
//!   - [`CholeskyDecomposition`]: `A = L·Lᵗ` for symmetric positive-definite `A`.
//!   - [`QrDecomposition`]: Householder, `rows ≥ columns`; least-squares `solve`.
//!   - [`EigenvalueDecomposition`]: symmetric (tridiagonal QL) or general
//!     (Hessenberg + real Schur) path, chosen once at construction.
//!   - [`SingularValueDecomposition`]: Golub-Kahan bidiagonalization with
//!     implicit-shift QR; any shape.
//!
//! - [`math`]: [`math::hypotenuse`] and the shared tolerance constants.
//!
//! - [`traits`]: Element trait hierarchy:
//!   - [`Scalar`]: all matrix elements (`Copy + PartialEq + Debug + Num`)
//!   - [`FloatScalar`]: real floats, used by the generic in-place routines
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access for algorithms
//!
//! ## Precision
//!
//! LU, Cholesky, and QR compute in `f32`. The eigenvalue and SVD
//! iterations widen their input to `f64`, iterate, and narrow back to
//! `f32` only when a result is queried.
//!
//! ## Logging
//!
//! Numerical failures and iteration counts are reported through the
//! [`log`](https://docs.rs/log) facade at `debug` and `trace` level.

pub mod linalg;
pub mod math;
pub mod matrix;
pub mod traits;

pub use linalg::{
    CholeskyDecomposition, EigenvalueDecomposition, LinalgError, LuDecomposition,
    QrDecomposition, SingularValueDecomposition,
};
pub use matrix::{DenseMatrix, Matrix};
pub use num_complex::Complex;
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

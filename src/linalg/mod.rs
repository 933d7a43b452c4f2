pub(crate) mod cholesky;
pub(crate) mod eigen;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod svd;

pub use cholesky::{cholesky_in_place, CholeskyDecomposition};
pub use eigen::{EigenPath, EigenvalueDecomposition};
pub use lu::{lu_in_place, lu_solve_in_place, LuDecomposition};
pub use qr::{qr_in_place, QrDecomposition};
pub use svd::SingularValueDecomposition;

use thiserror::Error;

/// Result type alias for fallible decomposition operations.
pub type Result<T> = core::result::Result<T, LinalgError>;

/// Errors from the decompositions and their solvers.
///
/// Structural and argument errors are reported before any computation
/// starts; numerical errors are reported at the point of detection. No
/// partial result is ever returned alongside an error.
///
/// ```
/// use linfact::Matrix;
/// use linfact::linalg::{LinalgError, CholeskyDecomposition};
///
/// let singular = Matrix::from_rows(2, 2, &[1.0, 2.0, 2.0, 4.0]);
/// let lu = singular.lu().unwrap();
/// assert!(lu.is_singular());
/// assert_eq!(lu.solve(&Matrix::identity(2)).unwrap_err(), LinalgError::Singular);
///
/// let not_pd = Matrix::from_rows(2, 2, &[1.0, 5.0, 5.0, 1.0]);
/// assert_eq!(
///     CholeskyDecomposition::new(&not_pd).unwrap_err(),
///     LinalgError::NotPositiveDefinite,
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinalgError {
    /// Operation requires a square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Operation requires a symmetric matrix.
    #[error("matrix must be symmetric")]
    NotSymmetric,

    /// QR requires at least as many rows as columns.
    #[error("matrix must have rows >= columns, got {rows}x{cols}")]
    WideMatrix { rows: usize, cols: usize },

    /// Right-hand side row count does not match the factorized matrix.
    #[error("dimension mismatch: expected {expected} rows, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Argument is malformed in a way not covered by the other variants.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Cholesky met a non-positive pivot.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    /// LU factor has an exactly-zero pivot.
    #[error("matrix is singular")]
    Singular,

    /// QR factor has an exactly-zero diagonal entry in R.
    #[error("matrix is rank deficient")]
    RankDeficient,
}

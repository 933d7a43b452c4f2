use crate::linalg::{LinalgError, Result};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::Matrix;

// ---------------------------------------------------------------------------
// In-place kernels
// ---------------------------------------------------------------------------

/// Cholesky decomposition in place: A = L · Lᵗ.
///
/// Row-oriented: for row `i` and each column `j ≥ i`,
/// `sum = A[i][j] − Σ_{k<i} L[i][k]·L[j][k]`; the diagonal takes
/// `sqrt(sum)` and the entries below it `sum / L[i][i]`.
///
/// Only the upper triangle of `a` is read. On return the lower triangle
/// (including the diagonal) holds L and the strict upper triangle is zeroed.
///
/// Returns an error as soon as a diagonal `sum` is not strictly positive.
pub fn cholesky_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<()> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "Cholesky decomposition requires a square matrix");

    for i in 0..n {
        for j in i..n {
            // L[j][k] for k < i lives below the diagonal, already final
            let mut sum = *a.get(i, j);
            for k in 0..i {
                sum = sum - *a.get(i, k) * *a.get(j, k);
            }
            if i == j {
                if sum <= T::zero() {
                    log::debug!("Cholesky: non-positive pivot {:?} at row {}", sum, i);
                    return Err(LinalgError::NotPositiveDefinite);
                }
                *a.get_mut(i, i) = sum.sqrt();
            } else {
                *a.get_mut(j, i) = sum / *a.get(i, i);
            }
        }
    }

    for j in 1..n {
        for i in 0..j {
            *a.get_mut(i, j) = T::zero();
        }
    }

    Ok(())
}

/// Solve L·x = b by forward substitution, where L is lower triangular.
#[inline]
fn forward_substitute<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - *l.get(i, j) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Solve Lᵗ·x = b by back substitution, where L is lower triangular.
#[inline]
fn back_substitute_lt<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum = sum - *l.get(j, i) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

fn check_symmetric(a: &Matrix) -> Result<()> {
    if !a.is_square() {
        return Err(LinalgError::NotSquare {
            rows: a.nrows(),
            cols: a.ncols(),
        });
    }
    if !a.is_symmetric() {
        return Err(LinalgError::NotSymmetric);
    }
    Ok(())
}

fn substitute(l: &Matrix, b: &[f32]) -> Vec<f32> {
    let n = l.nrows();
    let mut y = vec![0.0; n];
    let mut x = vec![0.0; n];
    forward_substitute(l, b, &mut y);
    back_substitute_lt(l, &y, &mut x);
    x
}

// ---------------------------------------------------------------------------
// CholeskyDecomposition
// ---------------------------------------------------------------------------

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// # Example
///
/// ```
/// use linfact::{CholeskyDecomposition, Matrix};
///
/// let a = Matrix::from_rows(3, 3, &[
///     4.0, 12.0, -16.0,
///     12.0, 37.0, -43.0,
///     -16.0, -43.0, 98.0,
/// ]);
/// let chol = CholeskyDecomposition::new(&a).unwrap();
/// let expected = Matrix::from_rows(3, 3, &[
///     2.0, 0.0, 0.0,
///     6.0, 1.0, 0.0,
///     -8.0, 5.0, 3.0,
/// ]);
/// assert!(chol.left_factor().max_abs_diff(&expected) < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct CholeskyDecomposition {
    /// Lower triangular factor L (A = L·Lᵗ).
    l: Matrix,
    dimension: usize,
}

impl CholeskyDecomposition {
    /// Decompose a symmetric positive-definite matrix.
    ///
    /// Fails with `NotSquare`/`NotSymmetric` before doing any work, and
    /// with `NotPositiveDefinite` if a pivot turns out non-positive.
    pub fn new(a: &Matrix) -> Result<Self> {
        let l = Self::quick_decompose(a)?;
        Ok(Self {
            dimension: l.nrows(),
            l,
        })
    }

    /// Factor `a` and return L alone, without building a decomposition.
    pub fn quick_decompose(a: &Matrix) -> Result<Matrix> {
        check_symmetric(a)?;
        let mut l = a.clone();
        cholesky_in_place(&mut l)?;
        Ok(l)
    }

    /// Solve `A·x = b` for a single right-hand side in one call.
    ///
    /// ```
    /// use linfact::{CholeskyDecomposition, Matrix};
    /// let a = Matrix::from_rows(2, 2, &[4.0, 2.0, 2.0, 3.0]);
    /// let x = CholeskyDecomposition::quick_solve_linear_equation(&a, &[8.0, 7.0]).unwrap();
    /// assert!((x[0] - 1.25).abs() < 1e-5);
    /// assert!((x[1] - 1.5).abs() < 1e-5);
    /// ```
    pub fn quick_solve_linear_equation(a: &Matrix, b: &[f32]) -> Result<Vec<f32>> {
        let l = Self::quick_decompose(a)?;
        if b.len() != l.nrows() {
            return Err(LinalgError::DimensionMismatch {
                expected: l.nrows(),
                got: b.len(),
            });
        }
        Ok(substitute(&l, b))
    }

    /// Order of the factorized matrix.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The lower triangular factor L.
    ///
    /// Borrows the decomposition's own buffer.
    #[inline]
    pub fn left_factor(&self) -> &Matrix {
        &self.l
    }

    /// The upper triangular factor Lᵗ, freshly built.
    pub fn right_factor(&self) -> Matrix {
        self.l.transpose()
    }

    /// Solve `A·x = b` where `b` is a single column.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        if b.ncols() != 1 {
            return Err(LinalgError::InvalidArgument(
                "right-hand side must have exactly one column",
            ));
        }
        if b.nrows() != self.dimension {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dimension,
                got: b.nrows(),
            });
        }
        Ok(Matrix::column_vector(&substitute(&self.l, b.as_slice())))
    }

    /// Determinant: `(Π L[i][i])²`.
    pub fn determinant(&self) -> f32 {
        let prod = (0..self.dimension).fold(1.0_f32, |p, i| p * self.l[(i, i)]);
        prod * prod
    }
}

/// Convenience methods on matrices.
impl Matrix {
    /// Cholesky decomposition (`A = L·Lᵗ`).
    pub fn cholesky(&self) -> Result<CholeskyDecomposition> {
        CholeskyDecomposition::new(self)
    }
}

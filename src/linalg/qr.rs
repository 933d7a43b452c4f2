use crate::linalg::{LinalgError, Result};
use crate::math::hypotenuse;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::Matrix;

/// Householder QR decomposition in place.
///
/// On return, `a` contains the packed factorization:
/// - Strict upper triangle: R (its diagonal is written to `diagonal`)
/// - Lower trapezoid (including the diagonal): the Householder vectors,
///   scaled so that `v[k] = 1 + |a[k][k]| / ‖a[k.., k]‖`
///
/// `diagonal[k]` receives the negated, sign-matched column norm. A column
/// whose remaining norm is exactly zero is left untouched and produces a
/// zero diagonal entry.
///
/// Works on rectangular matrices with `rows >= cols`.
pub fn qr_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>, diagonal: &mut [T]) {
    let m = a.nrows();
    let n = a.ncols();
    assert!(m >= n, "QR decomposition requires rows >= cols");
    assert_eq!(diagonal.len(), n, "diagonal length must equal cols");

    for k in 0..n {
        // 2-norm of the k-th sub-column without under/overflow
        let mut nrm = T::zero();
        for i in k..m {
            nrm = hypotenuse(nrm, *a.get(i, k));
        }

        if nrm != T::zero() {
            if *a.get(k, k) < T::zero() {
                nrm = -nrm;
            }
            for i in k..m {
                *a.get_mut(i, k) = *a.get(i, k) / nrm;
            }
            *a.get_mut(k, k) = *a.get(k, k) + T::one();

            // Apply the reflector to the trailing columns
            for j in (k + 1)..n {
                let mut s = T::zero();
                for i in k..m {
                    s = s + *a.get(i, k) * *a.get(i, j);
                }
                s = -s / *a.get(k, k);
                for i in k..m {
                    *a.get_mut(i, j) = *a.get(i, j) + s * *a.get(i, k);
                }
            }
        }
        diagonal[k] = -nrm;
    }
}

/// Replay the stored reflectors on the columns of `x`: `x ← Qᵗ·x`.
fn apply_qt<T: FloatScalar>(qr: &impl MatrixRef<T>, x: &mut impl MatrixMut<T>) {
    let m = qr.nrows();
    let n = qr.ncols();
    for k in 0..n {
        let vkk = *qr.get(k, k);
        if vkk == T::zero() {
            continue;
        }
        for j in 0..x.ncols() {
            let mut s = T::zero();
            for i in k..m {
                s = s + *qr.get(i, k) * *x.get(i, j);
            }
            s = -s / vkk;
            for i in k..m {
                *x.get_mut(i, j) = *x.get(i, j) + s * *qr.get(i, k);
            }
        }
    }
}

/// QR decomposition `A = Q·R` of a matrix with at least as many rows as
/// columns.
///
/// Q is `rows × cols` with orthonormal columns (the economy form); R is
/// `cols × cols` upper triangular. `solve` returns the least-squares
/// solution of overdetermined systems.
///
/// # Example
///
/// ```
/// use linfact::{Matrix, QrDecomposition};
///
/// // Least-squares fit: y = c0 + c1*x to points (0,1), (1,2), (2,4)
/// let a = Matrix::from_rows(3, 2, &[
///     1.0, 0.0,
///     1.0, 1.0,
///     1.0, 2.0,
/// ]);
/// let b = Matrix::column_vector(&[1.0, 2.0, 4.0]);
/// let x = QrDecomposition::new(&a).unwrap().solve(&b).unwrap();
/// assert!((x[(0, 0)] - 5.0 / 6.0).abs() < 1e-5);
/// assert!((x[(1, 0)] - 1.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    qr: Matrix,
    diagonal: Vec<f32>,
}

impl QrDecomposition {
    /// Decompose a matrix. Returns `WideMatrix` if `rows < cols`.
    ///
    /// Rank deficiency does not fail construction; check
    /// [`is_full_rank`](Self::is_full_rank) or let [`solve`](Self::solve)
    /// report it.
    pub fn new(a: &Matrix) -> Result<Self> {
        if a.nrows() < a.ncols() {
            return Err(LinalgError::WideMatrix {
                rows: a.nrows(),
                cols: a.ncols(),
            });
        }
        let mut qr = a.clone();
        let mut diagonal = vec![0.0; a.ncols()];
        qr_in_place(&mut qr, &mut diagonal);
        Ok(Self { qr, diagonal })
    }

    /// True when every diagonal entry of R is nonzero.
    pub fn is_full_rank(&self) -> bool {
        self.diagonal.iter().all(|&d| d != 0.0)
    }

    /// Lower trapezoidal matrix whose columns are the Householder vectors.
    pub fn householder_vectors(&self) -> Matrix {
        Matrix::from_fn(self.qr.nrows(), self.qr.ncols(), |i, j| {
            if i >= j {
                self.qr[(i, j)]
            } else {
                0.0
            }
        })
    }

    /// The orthogonal factor Q (`rows × cols`).
    ///
    /// ```
    /// use linfact::Matrix;
    /// let a = Matrix::from_rows(3, 2, &[3.0, 1.0, 4.0, 2.0, 0.0, 5.0]);
    /// let q = a.qr().unwrap().left_factor();
    /// let qtq = &q.transpose() * &q;
    /// assert!(qtq.max_abs_diff(&Matrix::identity(2)) < 1e-5);
    /// ```
    pub fn left_factor(&self) -> Matrix {
        let m = self.qr.nrows();
        let n = self.qr.ncols();
        let mut q = Matrix::zeros(m, n);
        for k in (0..n).rev() {
            q[(k, k)] = 1.0;
            let vkk = self.qr[(k, k)];
            if vkk == 0.0 {
                continue;
            }
            for j in k..n {
                let mut s = 0.0;
                for i in k..m {
                    s += self.qr[(i, k)] * q[(i, j)];
                }
                s = -s / vkk;
                for i in k..m {
                    q[(i, j)] += s * self.qr[(i, k)];
                }
            }
        }
        q
    }

    /// The upper triangular factor R (`cols × cols`).
    pub fn right_factor(&self) -> Matrix {
        let n = self.qr.ncols();
        Matrix::from_fn(n, n, |i, j| {
            if i < j {
                self.qr[(i, j)]
            } else if i == j {
                self.diagonal[i]
            } else {
                0.0
            }
        })
    }

    /// Least-squares solution of `A·X = B`, minimizing `‖A·X − B‖`.
    ///
    /// `B` must have `rows` rows; the result has `cols` rows and as many
    /// columns as `B`.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        let m = self.qr.nrows();
        let n = self.qr.ncols();
        if b.nrows() != m {
            return Err(LinalgError::DimensionMismatch {
                expected: m,
                got: b.nrows(),
            });
        }
        if !self.is_full_rank() {
            log::debug!("QR: rank deficient {}x{} factor, cannot solve", m, n);
            return Err(LinalgError::RankDeficient);
        }

        let nx = b.ncols();
        let mut x = b.clone();
        apply_qt(&self.qr, &mut x);

        // Solve R·X = Qᵗ·B
        for k in (0..n).rev() {
            for j in 0..nx {
                x[(k, j)] /= self.diagonal[k];
            }
            for i in 0..k {
                for j in 0..nx {
                    x[(i, j)] -= x[(k, j)] * self.qr[(i, k)];
                }
            }
        }
        Ok(x.sub_matrix(0, 0, n, nx))
    }
}

/// Convenience methods on matrices.
impl Matrix {
    /// Householder QR decomposition (`rows >= cols`).
    pub fn qr(&self) -> Result<QrDecomposition> {
        QrDecomposition::new(self)
    }
}

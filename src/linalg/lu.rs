use crate::linalg::{LinalgError, QrDecomposition, Result};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::Matrix;

/// Perform LU decomposition with partial pivoting, in place.
///
/// Uses the column-oriented Crout/Doolittle ordering: for each column `j`,
/// the multipliers computed for columns `0..j` are applied first, then the
/// row with the largest remaining modulus in that column is chosen as the
/// pivot, and finally the sub-column below the pivot is divided by it.
///
/// On return, `a` contains both L and U packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// `pivots` is filled with the row permutation: row `i` of `L·U` is row
/// `pivots[i]` of the input. Returns the permutation sign (`+1` for an even
/// number of row swaps, `-1` for odd).
///
/// A column whose pivot is exactly zero is left undivided; the factor is
/// then singular, which [`LuDecomposition::is_singular`] reports.
pub fn lu_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>, pivots: &mut [usize]) -> T {
    let m = a.nrows();
    let n = a.ncols();
    assert_eq!(m, pivots.len(), "pivot slice length must match row count");

    for (i, p) in pivots.iter_mut().enumerate() {
        *p = i;
    }
    let mut sign = T::one();
    let mut col_j = vec![T::zero(); m];

    for j in 0..n {
        for (i, c) in col_j.iter_mut().enumerate() {
            *c = *a.get(i, j);
        }

        // Apply previous transformations to column j
        for i in 0..m {
            let kmax = i.min(j);
            let mut s = T::zero();
            for k in 0..kmax {
                s = s + *a.get(i, k) * col_j[k];
            }
            col_j[i] = col_j[i] - s;
            *a.get_mut(i, j) = col_j[i];
        }

        // Partial pivoting on the partially-reduced column
        let mut p = j;
        for i in (j + 1)..m {
            if col_j[i].abs() > col_j[p].abs() {
                p = i;
            }
        }
        if p != j {
            for k in 0..n {
                let tmp = *a.get(p, k);
                *a.get_mut(p, k) = *a.get(j, k);
                *a.get_mut(j, k) = tmp;
            }
            pivots.swap(p, j);
            sign = -sign;
        }

        if j < m {
            let pivot = *a.get(j, j);
            if pivot != T::zero() {
                for i in (j + 1)..m {
                    let v = *a.get(i, j) / pivot;
                    *a.get_mut(i, j) = v;
                }
            } else {
                log::debug!("LU: zero pivot in column {}", j);
            }
        }
    }

    sign
}

/// Solve `A·X = B` given the packed LU factor and permutation.
///
/// `x` must have the shape of `b`; it receives `b` with its rows permuted by
/// `pivots`, and is then overwritten with the solution by forward
/// substitution through L and back substitution through U.
///
/// The factor must be square and non-singular; this is not checked here.
pub fn lu_solve_in_place<T: FloatScalar>(
    lu: &impl MatrixRef<T>,
    pivots: &[usize],
    b: &impl MatrixRef<T>,
    x: &mut impl MatrixMut<T>,
) {
    let n = lu.ncols();
    let nx = b.ncols();
    debug_assert_eq!((x.nrows(), x.ncols()), (b.nrows(), nx));

    for (i, &p) in pivots.iter().enumerate() {
        for j in 0..nx {
            *x.get_mut(i, j) = *b.get(p, j);
        }
    }

    // Solve L*Y = B(piv,:)
    for k in 0..n {
        for i in (k + 1)..n {
            let l_ik = *lu.get(i, k);
            for j in 0..nx {
                let v = *x.get(i, j) - *x.get(k, j) * l_ik;
                *x.get_mut(i, j) = v;
            }
        }
    }

    // Solve U*X = Y
    for k in (0..n).rev() {
        let u_kk = *lu.get(k, k);
        for j in 0..nx {
            let v = *x.get(k, j) / u_kk;
            *x.get_mut(k, j) = v;
        }
        for i in 0..k {
            let u_ik = *lu.get(i, k);
            for j in 0..nx {
                let v = *x.get(i, j) - *x.get(k, j) * u_ik;
                *x.get_mut(i, j) = v;
            }
        }
    }
}

/// LU decomposition with partial pivoting of a square matrix.
///
/// Stores the packed L/U factors, the row permutation, and its sign.
///
/// # Example
///
/// ```
/// use linfact::{LuDecomposition, Matrix};
///
/// let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
/// let lu = LuDecomposition::new(&a).unwrap();
/// assert!((lu.determinant() - (-2.0)).abs() < 1e-6);
///
/// let b = Matrix::column_vector(&[5.0, 11.0]);
/// let x = lu.solve(&b).unwrap();
/// assert!((x[(0, 0)] - 1.0).abs() < 1e-5);
/// assert!((x[(1, 0)] - 2.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Matrix,
    pivots: Vec<usize>,
    pivot_sign: f32,
}

impl LuDecomposition {
    /// Decompose a square matrix.
    ///
    /// A singular matrix still decomposes; check [`is_singular`](Self::is_singular)
    /// before solving.
    pub fn new(a: &Matrix) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::NotSquare {
                rows: a.nrows(),
                cols: a.ncols(),
            });
        }
        let mut lu = a.clone();
        let mut pivots = vec![0usize; a.nrows()];
        let pivot_sign = lu_in_place(&mut lu, &mut pivots);
        Ok(Self {
            lu,
            pivots,
            pivot_sign,
        })
    }

    /// Order of the factorized matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.lu.nrows()
    }

    /// Unit lower-triangular factor L.
    pub fn left_factor(&self) -> Matrix {
        let n = self.size();
        Matrix::from_fn(n, n, |i, j| {
            if i > j {
                self.lu[(i, j)]
            } else if i == j {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Upper-triangular factor U.
    pub fn right_factor(&self) -> Matrix {
        let n = self.size();
        Matrix::from_fn(n, n, |i, j| if i <= j { self.lu[(i, j)] } else { 0.0 })
    }

    /// Row permutation: row `i` of `L·U` is row `pivot()[i]` of the input.
    #[inline]
    pub fn pivot(&self) -> &[usize] {
        &self.pivots
    }

    /// Determinant: `pivot_sign · Π U[j][j]`.
    pub fn determinant(&self) -> f32 {
        (0..self.size()).fold(self.pivot_sign, |d, j| d * self.lu[(j, j)])
    }

    /// Whether any diagonal entry of U is exactly zero.
    pub fn is_singular(&self) -> bool {
        (0..self.size()).any(|j| self.lu[(j, j)] == 0.0)
    }

    /// Solve `A·X = B` for `X`.
    ///
    /// `b` may have any number of columns but must have as many rows as `A`.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        if b.nrows() != self.size() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.size(),
                got: b.nrows(),
            });
        }
        if self.is_singular() {
            return Err(LinalgError::Singular);
        }
        let mut x = Matrix::zeros(b.nrows(), b.ncols());
        lu_solve_in_place(&self.lu, &self.pivots, b, &mut x);
        Ok(x)
    }

    /// Inverse of the factorized matrix.
    pub fn inverse(&self) -> Result<Matrix> {
        self.solve(&Matrix::identity(self.size()))
    }
}

/// Convenience methods on matrices.
impl Matrix {
    /// LU decomposition with partial pivoting.
    pub fn lu(&self) -> Result<LuDecomposition> {
        LuDecomposition::new(self)
    }

    /// Solve `A·X = B`.
    ///
    /// Square `A` is solved exactly through LU; a tall `A` is solved in the
    /// least-squares sense through QR.
    ///
    /// ```
    /// use linfact::Matrix;
    /// // Fit y = c0 + c1*x to (0,1), (1,2), (2,4)
    /// let a = Matrix::from_rows(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
    /// let b = Matrix::column_vector(&[1.0, 2.0, 4.0]);
    /// let x = a.solve(&b).unwrap();
    /// assert!((x[(0, 0)] - 5.0 / 6.0).abs() < 1e-5);
    /// assert!((x[(1, 0)] - 1.5).abs() < 1e-5);
    /// ```
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        if self.is_square() {
            self.lu()?.solve(b)
        } else {
            QrDecomposition::new(self)?.solve(b)
        }
    }

    /// Determinant via LU. Errors if the matrix is not square.
    pub fn determinant(&self) -> Result<f32> {
        Ok(self.lu()?.determinant())
    }

    /// Inverse via LU. Errors if the matrix is not square or is singular.
    ///
    /// ```
    /// use linfact::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[4.0, 7.0, 2.0, 6.0]);
    /// let id = &a * &a.inverse().unwrap();
    /// assert!(id.max_abs_diff(&Matrix::identity(2)) < 1e-5);
    /// ```
    pub fn inverse(&self) -> Result<Matrix> {
        self.lu()?.inverse()
    }
}

use core::fmt;

use num_traits::{Float, NumCast};

use crate::traits::{FloatScalar, Scalar};

use super::DenseMatrix;

// ── Structure ───────────────────────────────────────────────────────

impl<T: Scalar> DenseMatrix<T> {
    /// Return a new matrix with rows and columns swapped.
    ///
    /// ```
    /// use linfact::Matrix;
    /// let m = Matrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// let t = m.transpose();
    /// assert_eq!((t.nrows(), t.ncols()), (3, 2));
    /// assert_eq!(t[(2, 1)], 6.0);
    /// ```
    pub fn transpose(&self) -> Self {
        DenseMatrix::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Whether the matrix is square and exactly equal to its transpose.
    ///
    /// The comparison is exact; no tolerance is applied.
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        for j in 0..self.ncols {
            for i in (j + 1)..self.nrows {
                if self[(i, j)] != self[(j, i)] {
                    return false;
                }
            }
        }
        true
    }

    /// Copy of column `j` as a `Vec`.
    pub fn column(&self, j: usize) -> Vec<T> {
        assert!(j < self.ncols, "column {} out of bounds for {} columns", j, self.ncols);
        self.data[j * self.nrows..(j + 1) * self.nrows].to_vec()
    }

    /// Swap two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.ncols {
            self.data.swap(j * self.nrows + a, j * self.nrows + b);
        }
    }

    /// Swap two columns in place.
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for i in 0..self.nrows {
            self.data.swap(a * self.nrows + i, b * self.nrows + i);
        }
    }
}

// ── Map / precision ─────────────────────────────────────────────────

impl<T: Copy> DenseMatrix<T> {
    /// Apply a function to every element, producing a new matrix.
    pub fn map<U>(&self, f: impl Fn(T) -> U) -> DenseMatrix<U> {
        DenseMatrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: FloatScalar> DenseMatrix<T> {
    /// Convert every element to another float type.
    ///
    /// Widening `f32 -> f64` is exact. Narrowing `f64 -> f32` rounds to
    /// nearest; values outside the `f32` range become infinite.
    ///
    /// ```
    /// use linfact::Matrix;
    /// let m = Matrix::from_rows(1, 2, &[0.5, -2.0]);
    /// let wide = m.cast::<f64>();
    /// assert_eq!(wide[(0, 1)], -2.0_f64);
    /// ```
    pub fn cast<U: FloatScalar>(&self) -> DenseMatrix<U> {
        self.map(|x| <U as NumCast>::from(x).unwrap_or_else(U::nan))
    }

    /// Frobenius norm `sqrt(Σ a_ij²)`.
    pub fn frobenius_norm(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| acc + x * x)
            .sqrt()
    }

    /// Largest absolute element-wise difference from `other`.
    ///
    /// Panics if the shapes differ.
    pub fn max_abs_diff(&self, other: &Self) -> T {
        assert_eq!(
            (self.nrows, self.ncols),
            (other.nrows, other.ncols),
            "dimension mismatch: {}x{} vs {}x{}",
            self.nrows,
            self.ncols,
            other.nrows,
            other.ncols,
        );
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (&a, &b)| Float::max(acc, (a - b).abs()))
    }
}

// ── Display ─────────────────────────────────────────────────────────

impl<T: fmt::Display> fmt::Display for DenseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.nrows {
            write!(f, "[")?;
            for j in 0..self.ncols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                let x = &self.data[j * self.nrows + i];
                match f.precision() {
                    Some(p) => write!(f, "{:.*}", p, x)?,
                    None => write!(f, "{}", x)?,
                }
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

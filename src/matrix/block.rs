use crate::traits::Scalar;

use super::DenseMatrix;

impl<T: Scalar> DenseMatrix<T> {
    /// Extract an independent sub-matrix.
    ///
    /// Bounds are half-open: the block covers rows `row_start..row_end` and
    /// columns `col_start..col_end`, so its shape is
    /// `(row_end - row_start) x (col_end - col_start)`.
    ///
    /// Panics if the block extends beyond the matrix bounds or an end
    /// precedes its start.
    ///
    /// ```
    /// use linfact::Matrix;
    /// let m = Matrix::from_fn(3, 3, |i, j| (i * 3 + j) as f32);
    /// let b = m.sub_matrix(1, 1, 3, 3);
    /// assert_eq!((b.nrows(), b.ncols()), (2, 2));
    /// assert_eq!(b[(0, 0)], 4.0);
    /// assert_eq!(b[(1, 1)], 8.0);
    /// ```
    pub fn sub_matrix(
        &self,
        row_start: usize,
        col_start: usize,
        row_end: usize,
        col_end: usize,
    ) -> Self {
        assert!(
            row_start <= row_end
                && col_start <= col_end
                && row_end <= self.nrows
                && col_end <= self.ncols,
            "sub-matrix rows {}..{} cols {}..{} out of bounds for {}x{} matrix",
            row_start,
            row_end,
            col_start,
            col_end,
            self.nrows,
            self.ncols,
        );
        DenseMatrix::from_fn(row_end - row_start, col_end - col_start, |r, c| {
            self[(row_start + r, col_start + c)]
        })
    }

    /// Write `src` into self with its top-left corner at `(i, j)`.
    ///
    /// Panics if the block extends beyond the matrix bounds.
    pub fn set_sub_matrix(&mut self, i: usize, j: usize, src: &DenseMatrix<T>) {
        assert!(
            i + src.nrows <= self.nrows && j + src.ncols <= self.ncols,
            "set_sub_matrix ({},{}) size {}x{} out of bounds for {}x{} matrix",
            i,
            j,
            src.nrows,
            src.ncols,
            self.nrows,
            self.ncols,
        );
        for r in 0..src.nrows {
            for c in 0..src.ncols {
                self[(i + r, j + c)] = src[(r, c)];
            }
        }
    }
}

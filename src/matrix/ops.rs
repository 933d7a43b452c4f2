use core::ops::{Add, Mul, Neg, Sub};

use crate::traits::Scalar;

use super::DenseMatrix;

// ── Element-wise addition / subtraction ─────────────────────────────

impl<T: Scalar> DenseMatrix<T> {
    fn zip_with(&self, rhs: &DenseMatrix<T>, op: &str, f: impl Fn(T, T) -> T) -> DenseMatrix<T> {
        assert_eq!(
            (self.nrows, self.ncols),
            (rhs.nrows, rhs.ncols),
            "dimension mismatch: {}x{} {} {}x{}",
            self.nrows,
            self.ncols,
            op,
            rhs.nrows,
            rhs.ncols,
        );
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        DenseMatrix {
            data,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Add<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn add(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        self.zip_with(rhs, "+", |a, b| a + b)
    }
}

impl<T: Scalar> Add for DenseMatrix<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        &self + &rhs
    }
}

impl<T: Scalar> Sub<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn sub(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        self.zip_with(rhs, "-", |a, b| a - b)
    }
}

impl<T: Scalar> Sub for DenseMatrix<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        &self - &rhs
    }
}

impl<T: Scalar + Neg<Output = T>> Neg for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn neg(self) -> DenseMatrix<T> {
        self.map(|x| -x)
    }
}

// ── Matrix multiply ─────────────────────────────────────────────────

impl<T: Scalar> Mul<&DenseMatrix<T>> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    /// Matrix product. Panics if `self.ncols() != rhs.nrows()`.
    fn mul(self, rhs: &DenseMatrix<T>) -> DenseMatrix<T> {
        assert_eq!(
            self.ncols, rhs.nrows,
            "dimension mismatch: {}x{} * {}x{}",
            self.nrows, self.ncols, rhs.nrows, rhs.ncols,
        );
        let m = self.nrows;
        let n = rhs.ncols;
        let mut out = DenseMatrix::zeros(m, n);
        // j-k-i order walks both column-major operands contiguously
        for j in 0..n {
            for k in 0..self.ncols {
                let b_kj = rhs.data[j * rhs.nrows + k];
                if b_kj == T::zero() {
                    continue;
                }
                let a_col = &self.data[k * m..(k + 1) * m];
                let out_col = &mut out.data[j * m..(j + 1) * m];
                for (o, &a) in out_col.iter_mut().zip(a_col) {
                    *o = *o + a * b_kj;
                }
            }
        }
        out
    }
}

impl<T: Scalar> Mul for DenseMatrix<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        &self * &rhs
    }
}

// ── Scalar multiply ─────────────────────────────────────────────────

impl<T: Scalar> Mul<T> for &DenseMatrix<T> {
    type Output = DenseMatrix<T>;

    fn mul(self, rhs: T) -> DenseMatrix<T> {
        self.map(|x| x * rhs)
    }
}

impl<T: Scalar> Mul<T> for DenseMatrix<T> {
    type Output = Self;

    fn mul(mut self, rhs: T) -> Self {
        for x in self.data.iter_mut() {
            *x = *x * rhs;
        }
        self
    }
}

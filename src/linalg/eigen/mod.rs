mod general;
mod symmetric;

use num_complex::Complex;

use crate::linalg::{LinalgError, Result};
use crate::matrix::WorkMatrix;
use crate::Matrix;

use general::GeneralSolver;
use symmetric::SymmetricSolver;

/// Which algorithm an [`EigenvalueDecomposition`] ran.
///
/// Chosen once at construction from an exact symmetry test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EigenPath {
    /// Householder tridiagonalization followed by implicit QL.
    Symmetric,
    /// Hessenberg reduction followed by double-shift QR to real Schur form.
    General,
}

/// Raw result of an eigen solve, in working precision.
#[derive(Debug)]
pub(crate) struct Eigensystem {
    pub(crate) real: Vec<f64>,
    pub(crate) imag: Vec<f64>,
    pub(crate) vectors: WorkMatrix,
}

/// A workspace that consumes a working copy of the input and produces its
/// eigensystem.
pub(crate) trait Eigensolver {
    fn solve(self) -> Eigensystem;
}

/// Eigenvalues and eigenvectors of a real square matrix.
///
/// If `A` is symmetric, then `A = V·D·Vᵗ` where `D` is diagonal with the
/// eigenvalues in ascending order and `V` is orthogonal.
///
/// Otherwise `A·V = V·D` where `D` is block diagonal: real eigenvalues
/// occupy 1×1 blocks and each complex pair `λ ± iμ` the 2×2 block
/// `[[λ, μ], [−μ, λ]]`. The matching columns of `V` hold the real and
/// imaginary parts of the eigenvector. `V` may be badly conditioned or
/// even singular.
///
/// Iteration runs in `f64` on a widened copy of the input; results are
/// narrowed to `f32` when queried.
///
/// # Example
///
/// ```
/// use linfact::{EigenvalueDecomposition, Matrix};
///
/// let a = Matrix::from_rows(2, 2, &[2.0, 1.0, 1.0, 2.0]);
/// let eig = EigenvalueDecomposition::new(&a).unwrap();
/// let vals = eig.real_eigenvalues();
/// assert!((vals[0] - 1.0).abs() < 1e-6);
/// assert!((vals[1] - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct EigenvalueDecomposition {
    size: usize,
    path: EigenPath,
    real_eigenvalues: Vec<f64>,
    imag_eigenvalues: Vec<f64>,
    eigenvectors: WorkMatrix,
}

impl EigenvalueDecomposition {
    /// Decompose a square matrix. Returns `NotSquare` otherwise.
    pub fn new(a: &Matrix) -> Result<Self> {
        if !a.is_square() {
            return Err(LinalgError::NotSquare {
                rows: a.nrows(),
                cols: a.ncols(),
            });
        }
        let size = a.nrows();
        let path = if a.is_symmetric() {
            EigenPath::Symmetric
        } else {
            EigenPath::General
        };

        if size == 0 {
            return Ok(Self {
                size,
                path,
                real_eigenvalues: Vec::new(),
                imag_eigenvalues: Vec::new(),
                eigenvectors: WorkMatrix::zeros(0, 0),
            });
        }

        let work = a.cast::<f64>();
        let system = match path {
            EigenPath::Symmetric => SymmetricSolver::new(work).solve(),
            EigenPath::General => GeneralSolver::new(work).solve(),
        };

        Ok(Self {
            size,
            path,
            real_eigenvalues: system.real,
            imag_eigenvalues: system.imag,
            eigenvectors: system.vectors,
        })
    }

    /// Order of the decomposed matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the symmetric path was taken.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.path == EigenPath::Symmetric
    }

    /// The algorithm that produced this decomposition.
    #[inline]
    pub fn path(&self) -> EigenPath {
        self.path
    }

    /// Eigenvalues as complex numbers.
    ///
    /// ```
    /// use linfact::{Complex, Matrix};
    /// // 90° rotation: eigenvalues ±i
    /// let r = Matrix::from_rows(2, 2, &[0.0, -1.0, 1.0, 0.0]);
    /// let mut vals = r.eigen().unwrap().eigenvalues();
    /// vals.sort_by(|a, b| a.im.total_cmp(&b.im));
    /// assert_eq!(vals, vec![Complex::new(0.0, -1.0), Complex::new(0.0, 1.0)]);
    /// ```
    pub fn eigenvalues(&self) -> Vec<Complex<f32>> {
        self.real_eigenvalues
            .iter()
            .zip(&self.imag_eigenvalues)
            .map(|(&re, &im)| Complex::new(re as f32, im as f32))
            .collect()
    }

    /// Real parts of the eigenvalues.
    pub fn real_eigenvalues(&self) -> Vec<f32> {
        self.real_eigenvalues.iter().map(|&x| x as f32).collect()
    }

    /// Imaginary parts of the eigenvalues.
    pub fn imag_eigenvalues(&self) -> Vec<f32> {
        self.imag_eigenvalues.iter().map(|&x| x as f32).collect()
    }

    /// Block diagonal eigenvalue matrix `D`.
    pub fn diagonal_eigenvalues(&self) -> Matrix {
        let n = self.size;
        let mut d = Matrix::zeros(n, n);
        for i in 0..n {
            let im = self.imag_eigenvalues[i] as f32;
            d[(i, i)] = self.real_eigenvalues[i] as f32;
            if im > 0.0 {
                d[(i, i + 1)] = im;
            } else if im < 0.0 {
                d[(i, i - 1)] = im;
            }
        }
        d
    }

    /// Eigenvector matrix `V`, one eigenvector (or real/imaginary part)
    /// per column.
    pub fn eigenvector_matrix(&self) -> Matrix {
        self.eigenvectors.cast::<f32>()
    }
}

/// Convenience methods on matrices.
impl Matrix {
    /// Eigenvalue decomposition of a square matrix.
    pub fn eigen(&self) -> Result<EigenvalueDecomposition> {
        EigenvalueDecomposition::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f32, b: f32, tol: f32, msg: &str) {
        assert!(
            (a - b).abs() < tol,
            "{}: {} vs {} (diff {})",
            msg,
            a,
            b,
            (a - b).abs()
        );
    }

    #[test]
    fn symmetric_ascending_and_orthogonal() {
        let a = Matrix::from_rows(3, 3, &[4.0, 1.0, -2.0, 1.0, 2.0, 0.0, -2.0, 0.0, 3.0]);
        let eig = a.eigen().unwrap();
        assert!(eig.is_symmetric());
        assert_eq!(eig.path(), EigenPath::Symmetric);
        assert_eq!(eig.size(), 3);

        let vals = eig.real_eigenvalues();
        assert!(vals.windows(2).all(|w| w[0] <= w[1]), "not ascending: {:?}", vals);
        assert!(eig.imag_eigenvalues().iter().all(|&x| x == 0.0));

        let v = eig.eigenvector_matrix();
        assert!((&v.transpose() * &v).max_abs_diff(&Matrix::identity(3)) < 1e-5);

        // A·V = V·D
        let av = &a * &v;
        let vd = &v * &eig.diagonal_eigenvalues();
        assert!(av.max_abs_diff(&vd) < 1e-4);

        // trace is preserved
        let sum: f32 = vals.iter().sum();
        assert_near(sum, 9.0, 1e-4, "trace");
    }

    #[test]
    fn symmetric_diagonal_input() {
        let a = Matrix::from_diagonal(&[3.0, -1.0, 2.0]);
        let vals = a.eigen().unwrap().real_eigenvalues();
        assert_eq!(vals, vec![-1.0, 2.0, 3.0]);
    }

    #[test]
    fn rotation_has_imaginary_pair() {
        let r = Matrix::from_rows(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let eig = r.eigen().unwrap();
        assert!(!eig.is_symmetric());
        let re = eig.real_eigenvalues();
        let im = eig.imag_eigenvalues();
        assert_near(re[0], 0.0, 1e-6, "re0");
        assert_near(re[1], 0.0, 1e-6, "re1");
        assert_near(im[0], 1.0, 1e-6, "im0");
        assert_near(im[1], -1.0, 1e-6, "im1");

        let d = eig.diagonal_eigenvalues();
        assert_near(d[(0, 1)], 1.0, 1e-6, "D01");
        assert_near(d[(1, 0)], -1.0, 1e-6, "D10");

        let v = eig.eigenvector_matrix();
        assert!((&r * &v).max_abs_diff(&(&v * &d)) < 1e-5);
    }

    #[test]
    fn general_real_eigenvalues() {
        let a = Matrix::from_rows(2, 2, &[4.0, 1.0, 2.0, 3.0]);
        let eig = a.eigen().unwrap();
        let mut vals = eig.real_eigenvalues();
        vals.sort_by(f32::total_cmp);
        assert_near(vals[0], 2.0, 1e-5, "lambda0");
        assert_near(vals[1], 5.0, 1e-5, "lambda1");
        assert!(eig.imag_eigenvalues().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn general_satisfies_av_eq_vd() {
        let a = Matrix::from_rows(
            4,
            4,
            &[
                1.0, 2.0, 0.0, -1.0, //
                -3.0, 1.0, 4.0, 0.5, //
                0.0, -2.0, 2.0, 1.0, //
                1.5, 0.0, -1.0, 3.0,
            ],
        );
        let eig = a.eigen().unwrap();
        let v = eig.eigenvector_matrix();
        let d = eig.diagonal_eigenvalues();
        let diff = (&a * &v).max_abs_diff(&(&v * &d));
        let tol = 1e-5 * (1.0 + a.frobenius_norm() * v.frobenius_norm());
        assert!(diff < tol, "A·V − V·D = {} (tol {})", diff, tol);

        let trace: f32 = eig.real_eigenvalues().iter().sum();
        assert_near(trace, 7.0, 1e-3, "trace");
    }

    #[test]
    fn one_by_one() {
        let eig = Matrix::from_rows(1, 1, &[-7.5]).eigen().unwrap();
        assert_eq!(eig.real_eigenvalues(), vec![-7.5]);
        assert_eq!(eig.eigenvector_matrix()[(0, 0)].abs(), 1.0);
    }

    #[test]
    fn empty() {
        let eig = Matrix::zeros(0, 0).eigen().unwrap();
        assert_eq!(eig.size(), 0);
        assert!(eig.eigenvalues().is_empty());
    }

    #[test]
    fn not_square() {
        assert_eq!(
            Matrix::zeros(2, 3).eigen().unwrap_err(),
            LinalgError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn accessors_idempotent() {
        let eig = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]).eigen().unwrap();
        assert_eq!(eig.eigenvector_matrix(), eig.eigenvector_matrix());
        assert_eq!(eig.eigenvalues(), eig.eigenvalues());
    }
}

use crate::math::{hypotenuse, EPSILON};
use crate::matrix::WorkMatrix;

use super::{Eigensolver, Eigensystem};

/// Workspace for the symmetric path.
///
/// `v` starts as the input and ends as the orthogonal eigenvector matrix;
/// `d` and `e` carry the tridiagonal form between the two phases and `d`
/// ends as the eigenvalues.
pub(crate) struct SymmetricSolver {
    n: usize,
    d: Vec<f64>,
    e: Vec<f64>,
    v: WorkMatrix,
}

impl SymmetricSolver {
    pub(crate) fn new(a: WorkMatrix) -> Self {
        let n = a.nrows();
        Self {
            n,
            d: vec![0.0; n],
            e: vec![0.0; n],
            v: a,
        }
    }

    /// Householder reduction to symmetric tridiagonal form (EISPACK tred2).
    ///
    /// Leaves the diagonal in `d`, the subdiagonal in `e[1..]`, and the
    /// accumulated orthogonal transform in `v`.
    fn reduce_householder_to_tridiagonal(&mut self) {
        let n = self.n;
        let (d, e, v) = (&mut self.d, &mut self.e, &mut self.v);

        for j in 0..n {
            d[j] = v[(n - 1, j)];
        }

        for i in (1..n).rev() {
            // Scale to avoid under/overflow
            let scale: f64 = d[..i].iter().map(|x| x.abs()).sum();
            let mut h = 0.0;

            if scale == 0.0 {
                e[i] = d[i - 1];
                for j in 0..i {
                    d[j] = v[(i - 1, j)];
                    v[(i, j)] = 0.0;
                    v[(j, i)] = 0.0;
                }
            } else {
                // Generate the Householder vector
                for k in 0..i {
                    d[k] /= scale;
                    h += d[k] * d[k];
                }
                let mut f = d[i - 1];
                let mut g = h.sqrt();
                if f > 0.0 {
                    g = -g;
                }
                e[i] = scale * g;
                h -= f * g;
                d[i - 1] = f - g;
                for x in e[..i].iter_mut() {
                    *x = 0.0;
                }

                // Apply the similarity transform to the remaining columns
                for j in 0..i {
                    f = d[j];
                    v[(j, i)] = f;
                    g = e[j] + v[(j, j)] * f;
                    for k in (j + 1)..i {
                        g += v[(k, j)] * d[k];
                        e[k] += v[(k, j)] * f;
                    }
                    e[j] = g;
                }
                f = 0.0;
                for j in 0..i {
                    e[j] /= h;
                    f += e[j] * d[j];
                }
                let hh = f / (h + h);
                for j in 0..i {
                    e[j] -= hh * d[j];
                }
                for j in 0..i {
                    f = d[j];
                    g = e[j];
                    for k in j..i {
                        v[(k, j)] -= f * e[k] + g * d[k];
                    }
                    d[j] = v[(i - 1, j)];
                    v[(i, j)] = 0.0;
                }
            }
            d[i] = h;
        }

        // Accumulate transformations
        for i in 0..(n - 1) {
            v[(n - 1, i)] = v[(i, i)];
            v[(i, i)] = 1.0;
            let h = d[i + 1];
            if h != 0.0 {
                for k in 0..=i {
                    d[k] = v[(k, i + 1)] / h;
                }
                for j in 0..=i {
                    let mut g = 0.0;
                    for k in 0..=i {
                        g += v[(k, i + 1)] * v[(k, j)];
                    }
                    for k in 0..=i {
                        v[(k, j)] -= g * d[k];
                    }
                }
            }
            for k in 0..=i {
                v[(k, i + 1)] = 0.0;
            }
        }
        for j in 0..n {
            d[j] = v[(n - 1, j)];
            v[(n - 1, j)] = 0.0;
        }
        v[(n - 1, n - 1)] = 1.0;
        e[0] = 0.0;
    }

    /// Implicit-shift QL on the tridiagonal form (EISPACK tql2), then an
    /// ascending sort of the eigenvalues with their vectors.
    ///
    /// Returns the number of QL sweeps performed.
    fn tridiagonal_ql(&mut self) -> usize {
        let n = self.n;
        let (d, e, v) = (&mut self.d, &mut self.e, &mut self.v);

        for i in 1..n {
            e[i - 1] = e[i];
        }
        e[n - 1] = 0.0;

        let mut sweeps = 0;
        let mut f = 0.0;
        let mut tst1: f64 = 0.0;
        for l in 0..n {
            // Find a small subdiagonal element
            tst1 = tst1.max(d[l].abs() + e[l].abs());
            let mut m = l;
            while m < n {
                if e[m].abs() <= EPSILON * tst1 {
                    break;
                }
                m += 1;
            }

            // If m == l, d[l] is already an eigenvalue; otherwise iterate
            if m > l {
                loop {
                    sweeps += 1;

                    // Compute the implicit shift
                    let mut g = d[l];
                    let mut p = (d[l + 1] - g) / (2.0 * e[l]);
                    let mut r = hypotenuse(p, 1.0);
                    if p < 0.0 {
                        r = -r;
                    }
                    d[l] = e[l] / (p + r);
                    d[l + 1] = e[l] * (p + r);
                    let dl1 = d[l + 1];
                    let mut h = g - d[l];
                    for x in d[(l + 2)..n].iter_mut() {
                        *x -= h;
                    }
                    f += h;

                    // Implicit QL transformation
                    p = d[m];
                    let mut c = 1.0;
                    let mut c2 = c;
                    let mut c3 = c;
                    let el1 = e[l + 1];
                    let mut s = 0.0;
                    let mut s2 = 0.0;
                    for i in (l..m).rev() {
                        c3 = c2;
                        c2 = c;
                        s2 = s;
                        g = c * e[i];
                        h = c * p;
                        r = hypotenuse(p, e[i]);
                        e[i + 1] = s * r;
                        s = e[i] / r;
                        c = p / r;
                        p = c * d[i] - s * g;
                        d[i + 1] = h + s * (c * g + s * d[i]);

                        // Accumulate transformation
                        for k in 0..n {
                            h = v[(k, i + 1)];
                            v[(k, i + 1)] = s * v[(k, i)] + c * h;
                            v[(k, i)] = c * v[(k, i)] - s * h;
                        }
                    }
                    p = -s * s2 * c3 * el1 * e[l] / dl1;
                    e[l] = s * p;
                    d[l] = c * p;

                    if e[l].abs() <= EPSILON * tst1 {
                        break;
                    }
                }
            }
            d[l] += f;
            e[l] = 0.0;
        }

        // Selection sort, ascending
        for i in 0..n.saturating_sub(1) {
            let mut k = i;
            let mut p = d[i];
            for (j, &dj) in d.iter().enumerate().skip(i + 1) {
                if dj < p {
                    k = j;
                    p = dj;
                }
            }
            if k != i {
                d[k] = d[i];
                d[i] = p;
                v.swap_cols(i, k);
            }
        }

        sweeps
    }
}

impl Eigensolver for SymmetricSolver {
    fn solve(mut self) -> Eigensystem {
        self.reduce_householder_to_tridiagonal();
        let sweeps = self.tridiagonal_ql();
        log::trace!("symmetric eigen: {} QL sweeps for n = {}", sweeps, self.n);
        Eigensystem {
            imag: vec![0.0; self.n],
            real: self.d,
            vectors: self.v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tridiagonal_preserves_similarity() {
        let a = WorkMatrix::from_rows(
            4,
            4,
            &[
                4.0, 1.0, -2.0, 2.0, //
                1.0, 2.0, 0.0, 1.0, //
                -2.0, 0.0, 3.0, -2.0, //
                2.0, 1.0, -2.0, -1.0,
            ],
        );
        let mut ws = SymmetricSolver::new(a.clone());
        ws.reduce_householder_to_tridiagonal();

        // Build T from d and e[1..], then check Vᵗ·A·V = T
        let mut t = WorkMatrix::from_diagonal(&ws.d);
        for i in 1..4 {
            t[(i, i - 1)] = ws.e[i];
            t[(i - 1, i)] = ws.e[i];
        }
        let vt_a_v = &(&ws.v.transpose() * &a) * &ws.v;
        assert!(vt_a_v.max_abs_diff(&t) < 1e-12);
        assert_eq!(ws.e[0], 0.0);
    }

    #[test]
    fn ql_yields_eigenpairs() {
        let a = WorkMatrix::from_rows(3, 3, &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        let sys = SymmetricSolver::new(a.clone()).solve();
        // Eigenvalues of the 1D Laplacian: 2 - √2, 2, 2 + √2
        let s2 = 2.0_f64.sqrt();
        let expected = [2.0 - s2, 2.0, 2.0 + s2];
        for (got, want) in sys.real.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{} vs {}", got, want);
        }
        for k in 0..3 {
            let vk = sys.vectors.sub_matrix(0, k, 3, k + 1);
            let av = &a * &vk;
            let lv = &vk * sys.real[k];
            assert!(av.max_abs_diff(&lv) < 1e-12);
        }
    }
}

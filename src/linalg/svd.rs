use crate::math::{hypotenuse, EPSILON, TINY};
use crate::matrix::WorkMatrix;
use crate::Matrix;

const WANT_U: bool = true;
const WANT_V: bool = true;

/// Apply the plane rotation `(cs, sn)` to columns `j` and `k` of `m`:
/// `col_j ← cs·col_j + sn·col_k`, `col_k ← −sn·col_j + cs·col_k`.
#[inline]
fn rotate_columns(m: &mut WorkMatrix, j: usize, k: usize, cs: f64, sn: f64) {
    for i in 0..m.nrows() {
        let t = cs * m[(i, j)] + sn * m[(i, k)];
        m[(i, k)] = -sn * m[(i, j)] + cs * m[(i, k)];
        m[(i, j)] = t;
    }
}

// ── Golub-Kahan bidiagonalization ───────────────────────────────────

/// Working state of one SVD run on an `m × n` matrix with `m >= n`.
///
/// After [`reduce_to_bidiagonal`](Self::reduce_to_bidiagonal), `s` holds
/// the diagonal and `e` the superdiagonal of `Uᵗ·A·V`. After
/// [`main_iteration_loop`](Self::main_iteration_loop), `s` holds the
/// singular values in descending order.
struct BidiagonalWorkspace {
    m: usize,
    n: usize,
    a: WorkMatrix,
    s: Vec<f64>,
    e: Vec<f64>,
    work: Vec<f64>,
    u: WorkMatrix,
    v: WorkMatrix,
}

impl BidiagonalWorkspace {
    fn new(a: WorkMatrix) -> Self {
        let (m, n) = (a.nrows(), a.ncols());
        debug_assert!(m >= n);
        Self {
            m,
            n,
            a,
            s: vec![0.0; n],
            e: vec![0.0; n],
            work: vec![0.0; m],
            u: WorkMatrix::zeros(m, n),
            v: WorkMatrix::zeros(n, n),
        }
    }

    /// Householder bidiagonalization, alternating left and right
    /// reflections, then explicit accumulation of U and V.
    fn reduce_to_bidiagonal(&mut self) {
        let (m, n) = (self.m, self.n);
        let Self {
            a, s, e, work, u, v, ..
        } = self;

        let nct = (m - 1).min(n);
        let nrt = n.saturating_sub(2).min(m);
        for k in 0..nct.max(nrt) {
            if k < nct {
                // Left reflection: zero a[k+1.., k], leaving s[k] on the diagonal
                s[k] = 0.0;
                for i in k..m {
                    s[k] = hypotenuse(s[k], a[(i, k)]);
                }
                if s[k] != 0.0 {
                    if a[(k, k)] < 0.0 {
                        s[k] = -s[k];
                    }
                    for i in k..m {
                        a[(i, k)] /= s[k];
                    }
                    a[(k, k)] += 1.0;
                }
                s[k] = -s[k];
            }
            for j in (k + 1)..n {
                if k < nct && s[k] != 0.0 {
                    let mut t = 0.0;
                    for i in k..m {
                        t += a[(i, k)] * a[(i, j)];
                    }
                    t = -t / a[(k, k)];
                    for i in k..m {
                        a[(i, j)] += t * a[(i, k)];
                    }
                }
                // Row k of the trailing block, used for the right reflection
                e[j] = a[(k, j)];
            }
            if WANT_U && k < nct {
                for i in k..m {
                    u[(i, k)] = a[(i, k)];
                }
            }
            if k < nrt {
                // Right reflection: zero e[k+2..], leaving e[k] on the superdiagonal
                e[k] = 0.0;
                for i in (k + 1)..n {
                    e[k] = hypotenuse(e[k], e[i]);
                }
                if e[k] != 0.0 {
                    if e[k + 1] < 0.0 {
                        e[k] = -e[k];
                    }
                    let ek = e[k];
                    for x in e[(k + 1)..n].iter_mut() {
                        *x /= ek;
                    }
                    e[k + 1] += 1.0;
                }
                e[k] = -e[k];
                if k + 1 < m && e[k] != 0.0 {
                    for x in work[(k + 1)..m].iter_mut() {
                        *x = 0.0;
                    }
                    for j in (k + 1)..n {
                        for i in (k + 1)..m {
                            work[i] += e[j] * a[(i, j)];
                        }
                    }
                    for j in (k + 1)..n {
                        let t = -e[j] / e[k + 1];
                        for i in (k + 1)..m {
                            a[(i, j)] += t * work[i];
                        }
                    }
                }
                if WANT_V {
                    for i in (k + 1)..n {
                        v[(i, k)] = e[i];
                    }
                }
            }
        }

        // Final bidiagonal entries
        let p = n;
        if nct < n {
            s[nct] = a[(nct, nct)];
        }
        if nrt + 1 < p {
            e[nrt] = a[(nrt, p - 1)];
        }
        e[p - 1] = 0.0;

        if WANT_U {
            for j in nct..n {
                for i in 0..m {
                    u[(i, j)] = 0.0;
                }
                u[(j, j)] = 1.0;
            }
            for k in (0..nct).rev() {
                if s[k] != 0.0 {
                    for j in (k + 1)..n {
                        let mut t = 0.0;
                        for i in k..m {
                            t += u[(i, k)] * u[(i, j)];
                        }
                        t = -t / u[(k, k)];
                        for i in k..m {
                            u[(i, j)] += t * u[(i, k)];
                        }
                    }
                    for i in k..m {
                        u[(i, k)] = -u[(i, k)];
                    }
                    u[(k, k)] += 1.0;
                    for i in 0..k {
                        u[(i, k)] = 0.0;
                    }
                } else {
                    for i in 0..m {
                        u[(i, k)] = 0.0;
                    }
                    u[(k, k)] = 1.0;
                }
            }
        }

        if WANT_V {
            for k in (0..n).rev() {
                if k < nrt && e[k] != 0.0 {
                    for j in (k + 1)..n {
                        let mut t = 0.0;
                        for i in (k + 1)..n {
                            t += v[(i, k)] * v[(i, j)];
                        }
                        t = -t / v[(k + 1, k)];
                        for i in (k + 1)..n {
                            v[(i, j)] += t * v[(i, k)];
                        }
                    }
                }
                for i in 0..n {
                    v[(i, k)] = 0.0;
                }
                v[(k, k)] = 1.0;
            }
        }
    }

    // ── Implicit-shift QR on the bidiagonal ─────────────────────────

    /// Drive the superdiagonal to zero, one deflation or QR step at a time.
    ///
    /// Each pass inspects the trailing unreduced block `s[k..p]` and
    /// handles one of four cases:
    /// 1. `s[p-1]` negligible: chase `e[p-2]` out with rotations on V
    /// 2. `s[k]` negligible: split, with rotations on U
    /// 3. no negligible entries: one shifted QR step
    /// 4. `e[p-2]` negligible: `s[p-1]` converged; fix its sign and order
    ///
    /// Returns the number of QR steps taken.
    fn main_iteration_loop(&mut self) -> usize {
        let (m, n) = (self.m, self.n);
        let Self { s, e, u, v, .. } = self;

        let mut order = n;
        let last = n - 1;
        let mut steps = 0;

        while order > 0 {
            let p = order;

            // Largest k < p-1 with negligible e[k], or -1
            let mut k = p as isize - 2;
            while k >= 0 {
                let ku = k as usize;
                if e[ku].abs() <= TINY + EPSILON * (s[ku].abs() + s[ku + 1].abs()) {
                    e[ku] = 0.0;
                    break;
                }
                k -= 1;
            }

            let kase;
            if k == p as isize - 2 {
                kase = 4;
            } else {
                let mut ks = p as isize - 1;
                while ks > k {
                    let ksu = ks as usize;
                    let t = e[ksu].abs() + if ks != k + 1 { e[ksu - 1].abs() } else { 0.0 };
                    if s[ksu].abs() <= TINY + EPSILON * t {
                        s[ksu] = 0.0;
                        break;
                    }
                    ks -= 1;
                }
                if ks == k {
                    kase = 3;
                } else if ks == p as isize - 1 {
                    kase = 1;
                } else {
                    kase = 2;
                    k = ks;
                }
            }
            let k = (k + 1) as usize;

            match kase {
                1 => {
                    let mut f = e[p - 2];
                    e[p - 2] = 0.0;
                    for j in (k..=(p - 2)).rev() {
                        let t = hypotenuse(s[j], f);
                        let cs = s[j] / t;
                        let sn = f / t;
                        s[j] = t;
                        if j != k {
                            f = -sn * e[j - 1];
                            e[j - 1] *= cs;
                        }
                        if WANT_V {
                            rotate_columns(v, j, p - 1, cs, sn);
                        }
                    }
                }
                2 => {
                    let mut f = e[k - 1];
                    e[k - 1] = 0.0;
                    for j in k..p {
                        let t = hypotenuse(s[j], f);
                        let cs = s[j] / t;
                        let sn = f / t;
                        s[j] = t;
                        f = -sn * e[j];
                        e[j] *= cs;
                        if WANT_U {
                            rotate_columns(u, j, k - 1, cs, sn);
                        }
                    }
                }
                3 => {
                    // Scale to avoid overflow in the shift
                    let scale = s[p - 1]
                        .abs()
                        .max(s[p - 2].abs())
                        .max(e[p - 2].abs())
                        .max(s[k].abs())
                        .max(e[k].abs());
                    let sp = s[p - 1] / scale;
                    let spm1 = s[p - 2] / scale;
                    let epm1 = e[p - 2] / scale;
                    let sk = s[k] / scale;
                    let ek = e[k] / scale;
                    let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                    let c = (sp * epm1) * (sp * epm1);
                    let mut shift = 0.0;
                    if b != 0.0 || c != 0.0 {
                        shift = (b * b + c).sqrt();
                        if b < 0.0 {
                            shift = -shift;
                        }
                        shift = c / (b + shift);
                    }
                    let mut f = (sk + sp) * (sk - sp) + shift;
                    let mut g = sk * ek;

                    // Chase the bulge
                    for j in k..(p - 1) {
                        let mut t = hypotenuse(f, g);
                        let mut cs = f / t;
                        let mut sn = g / t;
                        if j != k {
                            e[j - 1] = t;
                        }
                        f = cs * s[j] + sn * e[j];
                        e[j] = cs * e[j] - sn * s[j];
                        g = sn * s[j + 1];
                        s[j + 1] *= cs;
                        if WANT_V {
                            rotate_columns(v, j, j + 1, cs, sn);
                        }
                        t = hypotenuse(f, g);
                        cs = f / t;
                        sn = g / t;
                        s[j] = t;
                        f = cs * e[j] + sn * s[j + 1];
                        s[j + 1] = -sn * e[j] + cs * s[j + 1];
                        g = sn * e[j + 1];
                        e[j + 1] *= cs;
                        if WANT_U && j < m - 1 {
                            rotate_columns(u, j, j + 1, cs, sn);
                        }
                    }
                    e[p - 2] = f;
                    steps += 1;
                }
                _ => {
                    // Make the singular value non-negative
                    let mut k = k;
                    if s[k] <= 0.0 {
                        s[k] = if s[k] < 0.0 { -s[k] } else { 0.0 };
                        if WANT_V {
                            for i in 0..=last {
                                v[(i, k)] = -v[(i, k)];
                            }
                        }
                    }
                    // Bubble into descending order
                    while k < last {
                        if s[k] >= s[k + 1] {
                            break;
                        }
                        s.swap(k, k + 1);
                        if WANT_V && k < n - 1 {
                            v.swap_cols(k, k + 1);
                        }
                        if WANT_U && k < m - 1 {
                            u.swap_cols(k, k + 1);
                        }
                        k += 1;
                    }
                    order -= 1;
                }
            }
        }

        steps
    }
}

// ── SingularValueDecomposition ──────────────────────────────────────

/// Singular value decomposition `A = U·S·Vᵗ` of a matrix of any shape.
///
/// For an `r × c` matrix with `k = min(r, c)`, U is `r × k` with
/// orthonormal columns, S is `k × k` diagonal with the singular values in
/// descending order, and V is `c × k` with orthonormal columns.
///
/// The computation never fails. It runs in `f64` on a widened copy of the
/// input; results are narrowed to `f32` when queried.
///
/// # Example
///
/// ```
/// use linfact::{Matrix, SingularValueDecomposition};
///
/// let a = Matrix::from_rows(3, 2, &[
///     1.0, 0.0,
///     0.0, 2.0,
///     0.0, 0.0,
/// ]);
/// let svd = SingularValueDecomposition::new(&a);
/// assert_eq!(svd.singular_values(), vec![2.0, 1.0]);
/// assert_eq!(svd.rank(), 2);
/// assert_eq!(svd.condition(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct SingularValueDecomposition {
    factor_u: WorkMatrix,
    factor_v: WorkMatrix,
    values: Vec<f64>,
    row_count: usize,
    column_count: usize,
    transposed: bool,
}

impl SingularValueDecomposition {
    /// Decompose a matrix.
    ///
    /// A wide matrix (`rows < cols`) is decomposed through its transpose
    /// and the factors are swapped back.
    pub fn new(a: &Matrix) -> Self {
        let transposed = a.nrows() < a.ncols();
        let work = if transposed {
            a.transpose().cast::<f64>()
        } else {
            a.cast::<f64>()
        };
        let (row_count, column_count) = (work.nrows(), work.ncols());

        if column_count == 0 {
            let (u, v) = (WorkMatrix::zeros(row_count, 0), WorkMatrix::zeros(0, 0));
            let (factor_u, factor_v) = if transposed { (v, u) } else { (u, v) };
            return Self {
                factor_u,
                factor_v,
                values: Vec::new(),
                row_count,
                column_count,
                transposed,
            };
        }

        let mut ws = BidiagonalWorkspace::new(work);
        ws.reduce_to_bidiagonal();
        let steps = ws.main_iteration_loop();
        log::trace!(
            "SVD: {} QR steps for {}x{}",
            steps,
            row_count,
            column_count
        );

        let (factor_u, factor_v) = if transposed {
            (ws.v, ws.u)
        } else {
            (ws.u, ws.v)
        };
        Self {
            factor_u,
            factor_v,
            values: ws.s,
            row_count,
            column_count,
            transposed,
        }
    }

    /// Whether the input was wide and decomposed through its transpose.
    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Two-norm: the largest singular value.
    pub fn norm2(&self) -> f32 {
        self.values.first().copied().unwrap_or(0.0) as f32
    }

    /// Two-norm condition number: `σ_max / σ_min`.
    ///
    /// Infinite for a rank-deficient matrix.
    pub fn condition(&self) -> f32 {
        match (self.values.first(), self.values.last()) {
            (Some(&max), Some(&min)) => (max / min) as f32,
            _ => 0.0,
        }
    }

    /// Effective numerical rank.
    ///
    /// Counts singular values above `max(rows, cols) · σ_max · EPSILON`.
    pub fn rank(&self) -> usize {
        let largest = self.values.first().copied().unwrap_or(0.0);
        let tol = self.row_count.max(self.column_count) as f64 * largest * EPSILON;
        self.count_above(tol)
    }

    /// Number of singular values strictly greater than `tolerance`.
    pub fn rank_with_tolerance(&self, tolerance: f32) -> usize {
        self.count_above(f64::from(tolerance))
    }

    fn count_above(&self, tol: f64) -> usize {
        self.values.iter().filter(|&&x| x > tol).count()
    }

    /// Singular values in descending order.
    pub fn singular_values(&self) -> Vec<f32> {
        self.values.iter().map(|&x| x as f32).collect()
    }

    /// Singular values on the diagonal of a square matrix `S`.
    pub fn diagonal_singular_values(&self) -> Matrix {
        Matrix::from_diagonal(&self.singular_values())
    }

    /// Left singular vectors `U`, one per column.
    pub fn left_singular_vectors(&self) -> Matrix {
        self.factor_u.cast::<f32>()
    }

    /// Right singular vectors `V`, one per column.
    pub fn right_singular_vectors(&self) -> Matrix {
        self.factor_v.cast::<f32>()
    }
}

/// Convenience methods on matrices.
impl Matrix {
    /// Singular value decomposition (any shape).
    pub fn svd(&self) -> SingularValueDecomposition {
        SingularValueDecomposition::new(self)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

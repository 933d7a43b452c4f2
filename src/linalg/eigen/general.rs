use crate::math::EPSILON;
use crate::matrix::WorkMatrix;

use super::{Eigensolver, Eigensystem};

/// Scaled complex division `(xr + i·xi) / (yr + i·yi)`.
fn divide(xr: f64, xi: f64, yr: f64, yi: f64) -> (f64, f64) {
    if yr.abs() > yi.abs() {
        let r = yi / yr;
        let d = yr + r * yi;
        ((xr + r * xi) / d, (xi - r * xr) / d)
    } else {
        let r = yr / yi;
        let d = yi + r * yr;
        ((r * xr + xi) / d, (r * xi - xr) / d)
    }
}

/// Workspace for the nonsymmetric path.
///
/// `h` holds the Hessenberg form, then the real Schur form, then the
/// triangular eigenvector coefficients. `ort` is Householder scratch for
/// the Hessenberg reduction.
pub(crate) struct GeneralSolver {
    n: usize,
    d: Vec<f64>,
    e: Vec<f64>,
    h: WorkMatrix,
    v: WorkMatrix,
    ort: Vec<f64>,
}

impl GeneralSolver {
    pub(crate) fn new(a: WorkMatrix) -> Self {
        let n = a.nrows();
        Self {
            n,
            d: vec![0.0; n],
            e: vec![0.0; n],
            h: a,
            v: WorkMatrix::identity(n),
            ort: vec![0.0; n],
        }
    }

    /// Orthogonal similarity reduction to upper Hessenberg form
    /// (EISPACK orthes), accumulating the transform into `v`.
    fn reduce_to_hessenberg(&mut self) {
        let n = self.n;
        let high = n - 1;
        let (h, v, ort) = (&mut self.h, &mut self.v, &mut self.ort);

        for m in 1..high {
            let scale: f64 = (m..=high).map(|i| h[(i, m - 1)].abs()).sum();
            if scale == 0.0 {
                continue;
            }

            // Compute the Householder transformation
            let mut hh = 0.0;
            for i in (m..=high).rev() {
                ort[i] = h[(i, m - 1)] / scale;
                hh += ort[i] * ort[i];
            }
            let mut g = hh.sqrt();
            if ort[m] > 0.0 {
                g = -g;
            }
            hh -= ort[m] * g;
            ort[m] -= g;

            // H = (I - u·uᵗ/h) · H · (I - u·uᵗ/h)
            for j in m..n {
                let mut f = 0.0;
                for i in (m..=high).rev() {
                    f += ort[i] * h[(i, j)];
                }
                f /= hh;
                for i in m..=high {
                    h[(i, j)] -= f * ort[i];
                }
            }
            for i in 0..=high {
                let mut f = 0.0;
                for j in (m..=high).rev() {
                    f += ort[j] * h[(i, j)];
                }
                f /= hh;
                for j in m..=high {
                    h[(i, j)] -= f * ort[j];
                }
            }
            ort[m] *= scale;
            h[(m, m - 1)] = scale * g;
        }

        // Accumulate transformations
        for m in (1..high).rev() {
            if h[(m, m - 1)] == 0.0 {
                continue;
            }
            for i in (m + 1)..=high {
                ort[i] = h[(i, m - 1)];
            }
            for j in m..=high {
                let mut g = 0.0;
                for i in m..=high {
                    g += ort[i] * v[(i, j)];
                }
                // Double division avoids possible underflow
                g = (g / ort[m]) / h[(m, m - 1)];
                for i in m..=high {
                    v[(i, j)] += g * ort[i];
                }
            }
        }
    }

    /// Double-shift QR from Hessenberg to real Schur form (EISPACK hqr2),
    /// followed by back-substitution for the eigenvectors.
    ///
    /// Returns the number of QR steps performed.
    fn reduce_hessenberg_to_schur(&mut self) -> usize {
        let nn = self.n;
        let high = nn - 1;
        let (d, e, h, v) = (&mut self.d, &mut self.e, &mut self.h, &mut self.v);

        let mut exshift = 0.0;
        let (mut r, mut s, mut z) = (0.0_f64, 0.0_f64, 0.0_f64);
        let (mut p, mut q, mut w, mut x, mut y): (f64, f64, f64, f64, f64);

        // Matrix norm over the Hessenberg band
        let mut norm = 0.0;
        for i in 0..nn {
            for j in i.saturating_sub(1)..nn {
                norm += h[(i, j)].abs();
            }
        }

        let mut steps = 0;
        let mut iter = 0;
        // Rows 0..top are still active
        let mut top = nn;
        while top > 0 {
            let n = top - 1;

            // Look for a single small subdiagonal element
            let mut l = n;
            while l > 0 {
                s = h[(l - 1, l - 1)].abs() + h[(l, l)].abs();
                if s == 0.0 {
                    s = norm;
                }
                if h[(l, l - 1)].abs() < EPSILON * s {
                    break;
                }
                l -= 1;
            }

            if l == n {
                // One root found
                h[(n, n)] += exshift;
                d[n] = h[(n, n)];
                e[n] = 0.0;
                top -= 1;
                iter = 0;
            } else if l + 1 == n {
                // Two roots found
                w = h[(n, n - 1)] * h[(n - 1, n)];
                p = (h[(n - 1, n - 1)] - h[(n, n)]) / 2.0;
                q = p * p + w;
                z = q.abs().sqrt();
                h[(n, n)] += exshift;
                h[(n - 1, n - 1)] += exshift;
                x = h[(n, n)];

                if q >= 0.0 {
                    // Real pair
                    z = if p >= 0.0 { p + z } else { p - z };
                    d[n - 1] = x + z;
                    d[n] = d[n - 1];
                    if z != 0.0 {
                        d[n] = x - w / z;
                    }
                    e[n - 1] = 0.0;
                    e[n] = 0.0;
                    x = h[(n, n - 1)];
                    s = x.abs() + z.abs();
                    p = x / s;
                    q = z / s;
                    r = (p * p + q * q).sqrt();
                    p /= r;
                    q /= r;

                    // Row modification
                    for j in (n - 1)..nn {
                        z = h[(n - 1, j)];
                        h[(n - 1, j)] = q * z + p * h[(n, j)];
                        h[(n, j)] = q * h[(n, j)] - p * z;
                    }
                    // Column modification
                    for i in 0..=n {
                        z = h[(i, n - 1)];
                        h[(i, n - 1)] = q * z + p * h[(i, n)];
                        h[(i, n)] = q * h[(i, n)] - p * z;
                    }
                    // Accumulate transformations
                    for i in 0..=high {
                        z = v[(i, n - 1)];
                        v[(i, n - 1)] = q * z + p * v[(i, n)];
                        v[(i, n)] = q * v[(i, n)] - p * z;
                    }
                } else {
                    // Complex pair
                    d[n - 1] = x + p;
                    d[n] = x + p;
                    e[n - 1] = z;
                    e[n] = -z;
                }
                top -= 2;
                iter = 0;
            } else {
                // No convergence yet; form the shift
                x = h[(n, n)];
                y = h[(n - 1, n - 1)];
                w = h[(n, n - 1)] * h[(n - 1, n)];

                // Wilkinson's ad hoc shift
                if iter == 10 {
                    exshift += x;
                    for i in 0..=n {
                        h[(i, i)] -= x;
                    }
                    s = h[(n, n - 1)].abs() + h[(n - 1, n - 2)].abs();
                    x = 0.75 * s;
                    y = x;
                    w = -0.4375 * s * s;
                }

                // MATLAB's ad hoc shift
                if iter == 30 {
                    s = (y - x) / 2.0;
                    s = s * s + w;
                    if s > 0.0 {
                        s = s.sqrt();
                        if y < x {
                            s = -s;
                        }
                        s = x - w / ((y - x) / 2.0 + s);
                        for i in 0..=n {
                            h[(i, i)] -= s;
                        }
                        exshift += s;
                        x = 0.964;
                        y = x;
                        w = x;
                    }
                }

                iter += 1;
                steps += 1;

                // Look for two consecutive small subdiagonal elements
                let mut m = n - 2;
                loop {
                    z = h[(m, m)];
                    r = x - z;
                    s = y - z;
                    p = (r * s - w) / h[(m + 1, m)] + h[(m, m + 1)];
                    q = h[(m + 1, m + 1)] - z - r - s;
                    r = h[(m + 2, m + 1)];
                    s = p.abs() + q.abs() + r.abs();
                    p /= s;
                    q /= s;
                    r /= s;
                    if m == l {
                        break;
                    }
                    if h[(m, m - 1)].abs() * (q.abs() + r.abs())
                        < EPSILON
                            * (p.abs()
                                * (h[(m - 1, m - 1)].abs() + z.abs() + h[(m + 1, m + 1)].abs()))
                    {
                        break;
                    }
                    m -= 1;
                }

                for i in (m + 2)..=n {
                    h[(i, i - 2)] = 0.0;
                    if i > m + 2 {
                        h[(i, i - 3)] = 0.0;
                    }
                }

                // Double QR step on rows l..=n and columns m..=n
                for k in m..n {
                    let notlast = k != n - 1;
                    if k != m {
                        p = h[(k, k - 1)];
                        q = h[(k + 1, k - 1)];
                        r = if notlast { h[(k + 2, k - 1)] } else { 0.0 };
                        x = p.abs() + q.abs() + r.abs();
                        if x == 0.0 {
                            continue;
                        }
                        p /= x;
                        q /= x;
                        r /= x;
                    }

                    s = (p * p + q * q + r * r).sqrt();
                    if p < 0.0 {
                        s = -s;
                    }
                    if s == 0.0 {
                        continue;
                    }
                    if k != m {
                        h[(k, k - 1)] = -s * x;
                    } else if l != m {
                        h[(k, k - 1)] = -h[(k, k - 1)];
                    }
                    p += s;
                    x = p / s;
                    y = q / s;
                    z = r / s;
                    q /= p;
                    r /= p;

                    // Row modification
                    for j in k..nn {
                        p = h[(k, j)] + q * h[(k + 1, j)];
                        if notlast {
                            p += r * h[(k + 2, j)];
                            h[(k + 2, j)] -= p * z;
                        }
                        h[(k, j)] -= p * x;
                        h[(k + 1, j)] -= p * y;
                    }
                    // Column modification
                    for i in 0..=n.min(k + 3) {
                        p = x * h[(i, k)] + y * h[(i, k + 1)];
                        if notlast {
                            p += z * h[(i, k + 2)];
                            h[(i, k + 2)] -= p * r;
                        }
                        h[(i, k)] -= p;
                        h[(i, k + 1)] -= p * q;
                    }
                    // Accumulate transformations
                    for i in 0..=high {
                        p = x * v[(i, k)] + y * v[(i, k + 1)];
                        if notlast {
                            p += z * v[(i, k + 2)];
                            v[(i, k + 2)] -= p * r;
                        }
                        v[(i, k)] -= p;
                        v[(i, k + 1)] -= p * q;
                    }
                }
            }
        }

        if norm == 0.0 {
            return steps;
        }

        // Back-substitute to find vectors of the upper triangular form
        for n in (0..nn).rev() {
            p = d[n];
            q = e[n];

            if q == 0.0 {
                // Real vector
                let mut l = n;
                h[(n, n)] = 1.0;
                for i in (0..n).rev() {
                    w = h[(i, i)] - p;
                    r = 0.0;
                    for j in l..=n {
                        r += h[(i, j)] * h[(j, n)];
                    }
                    if e[i] < 0.0 {
                        z = w;
                        s = r;
                        continue;
                    }
                    l = i;
                    if e[i] == 0.0 {
                        h[(i, n)] = if w != 0.0 { -r / w } else { -r / (EPSILON * norm) };
                    } else {
                        // Solve the real 2x2 system
                        x = h[(i, i + 1)];
                        y = h[(i + 1, i)];
                        q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                        let t = (x * s - z * r) / q;
                        h[(i, n)] = t;
                        h[(i + 1, n)] = if x.abs() > z.abs() {
                            (-r - w * t) / x
                        } else {
                            (-s - y * t) / z
                        };
                    }

                    // Overflow control
                    let t = h[(i, n)].abs();
                    if (EPSILON * t) * t > 1.0 {
                        for j in i..=n {
                            h[(j, n)] /= t;
                        }
                    }
                }
            } else if q < 0.0 {
                // Complex vector; the last component is chosen imaginary
                // so the system is triangular
                let mut l = n - 1;
                if h[(n, n - 1)].abs() > h[(n - 1, n)].abs() {
                    h[(n - 1, n - 1)] = q / h[(n, n - 1)];
                    h[(n - 1, n)] = -(h[(n, n)] - p) / h[(n, n - 1)];
                } else {
                    let (cr, ci) = divide(0.0, -h[(n - 1, n)], h[(n - 1, n - 1)] - p, q);
                    h[(n - 1, n - 1)] = cr;
                    h[(n - 1, n)] = ci;
                }
                h[(n, n - 1)] = 0.0;
                h[(n, n)] = 1.0;

                for i in (0..n - 1).rev() {
                    let mut ra = 0.0;
                    let mut sa = 0.0;
                    for j in l..=n {
                        ra += h[(i, j)] * h[(j, n - 1)];
                        sa += h[(i, j)] * h[(j, n)];
                    }
                    w = h[(i, i)] - p;

                    if e[i] < 0.0 {
                        z = w;
                        r = ra;
                        s = sa;
                        continue;
                    }
                    l = i;
                    if e[i] == 0.0 {
                        let (cr, ci) = divide(-ra, -sa, w, q);
                        h[(i, n - 1)] = cr;
                        h[(i, n)] = ci;
                    } else {
                        // Solve the complex 2x2 system
                        x = h[(i, i + 1)];
                        y = h[(i + 1, i)];
                        let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                        let vi = (d[i] - p) * 2.0 * q;
                        if vr == 0.0 && vi == 0.0 {
                            vr = EPSILON
                                * norm
                                * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                        }
                        let (cr, ci) = divide(
                            x * r - z * ra + q * sa,
                            x * s - z * sa - q * ra,
                            vr,
                            vi,
                        );
                        h[(i, n - 1)] = cr;
                        h[(i, n)] = ci;
                        if x.abs() > z.abs() + q.abs() {
                            h[(i + 1, n - 1)] = (-ra - w * h[(i, n - 1)] + q * h[(i, n)]) / x;
                            h[(i + 1, n)] = (-sa - w * h[(i, n)] - q * h[(i, n - 1)]) / x;
                        } else {
                            let (cr, ci) = divide(
                                -r - y * h[(i, n - 1)],
                                -s - y * h[(i, n)],
                                z,
                                q,
                            );
                            h[(i + 1, n - 1)] = cr;
                            h[(i + 1, n)] = ci;
                        }
                    }

                    // Overflow control
                    let t = h[(i, n - 1)].abs().max(h[(i, n)].abs());
                    if (EPSILON * t) * t > 1.0 {
                        for j in i..=n {
                            h[(j, n - 1)] /= t;
                            h[(j, n)] /= t;
                        }
                    }
                }
            }
        }

        // Back transformation to eigenvectors of the input matrix
        for j in (0..nn).rev() {
            for i in 0..=high {
                let mut acc = 0.0;
                for k in 0..=j.min(high) {
                    acc += v[(i, k)] * h[(k, j)];
                }
                v[(i, j)] = acc;
            }
        }

        steps
    }
}

impl Eigensolver for GeneralSolver {
    fn solve(mut self) -> Eigensystem {
        self.reduce_to_hessenberg();
        let steps = self.reduce_hessenberg_to_schur();
        log::trace!("general eigen: {} Schur steps for n = {}", steps, self.n);
        Eigensystem {
            real: self.d,
            imag: self.e,
            vectors: self.v,
        }
    }
}

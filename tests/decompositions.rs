use linfact::{
    CholeskyDecomposition, Complex, EigenvalueDecomposition, LinalgError, LuDecomposition, Matrix,
    QrDecomposition, SingularValueDecomposition,
};

const TOL: f32 = 1e-4;

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

fn assert_matrix_near(a: &Matrix, b: &Matrix, tol: f32, msg: &str) {
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()), "{}: shape", msg);
    let diff = a.max_abs_diff(b);
    assert!(diff < tol, "{}: max diff {}\n{:.4}\nvs\n{:.4}", msg, diff, a, b);
}

fn assert_orthonormal_columns(q: &Matrix, msg: &str) {
    let qtq = &q.transpose() * q;
    assert_matrix_near(&qtq, &Matrix::identity(q.ncols()), 1e-5, msg);
}

fn sample_5x5() -> Matrix {
    Matrix::from_rows(
        5,
        5,
        &[
            2.0, -1.0, 0.0, 3.0, 1.0, //
            4.0, 1.0, -2.0, 0.0, 2.0, //
            -1.0, 3.0, 5.0, 1.0, 0.0, //
            0.0, 2.0, 1.0, -4.0, 3.0, //
            1.0, 0.0, 2.0, 1.0, 6.0,
        ],
    )
}

// ── LU ──────────────────────────────────────────────────────────────

#[test]
fn lu_reconstructs_permuted_input() {
    let a = sample_5x5();
    let lu = LuDecomposition::new(&a).unwrap();
    let lu_prod = &lu.left_factor() * &lu.right_factor();
    let pa = Matrix::from_fn(5, 5, |i, j| a[(lu.pivot()[i], j)]);
    assert_matrix_near(&lu_prod, &pa, TOL, "L·U vs P·A");
}

#[test]
fn lu_determinant_2x2() {
    let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    assert_near(a.lu().unwrap().determinant(), -2.0, 1e-6, "det");
}

#[test]
fn lu_singular() {
    let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 2.0, 4.0]);
    let lu = LuDecomposition::new(&a).unwrap();
    assert!(lu.is_singular());
    let b = Matrix::column_vector(&[1.0, 2.0]);
    assert_eq!(lu.solve(&b).unwrap_err(), LinalgError::Singular);
}

#[test]
fn lu_solve_and_inverse() {
    let a = sample_5x5();
    let b = Matrix::from_fn(5, 2, |i, j| (i + 3 * j) as f32 - 2.0);
    let x = a.solve(&b).unwrap();
    assert_matrix_near(&(&a * &x), &b, 1e-3, "A·X vs B");

    let inv = a.inverse().unwrap();
    assert_matrix_near(&(&a * &inv), &Matrix::identity(5), 1e-4, "A·A⁻¹");
}

// ── Cholesky ────────────────────────────────────────────────────────

#[test]
fn cholesky_known_factor() {
    let a = Matrix::from_rows(3, 3, &[4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0]);
    let chol = CholeskyDecomposition::new(&a).unwrap();
    let expected = Matrix::from_rows(3, 3, &[2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0]);
    assert_matrix_near(chol.left_factor(), &expected, 1e-6, "L");
    assert_matrix_near(
        &(chol.left_factor() * &chol.right_factor()),
        &a,
        1e-4,
        "L·Lᵗ",
    );
}

#[test]
fn cholesky_solve_agrees_with_lu() {
    let m = sample_5x5();
    let spd = &(&m * &m.transpose()) + &Matrix::identity(5);
    let b = Matrix::column_vector(&[1.0, -2.0, 0.5, 3.0, -1.0]);

    let x_chol = spd.cholesky().unwrap().solve(&b).unwrap();
    let x_lu = spd.lu().unwrap().solve(&b).unwrap();
    assert_matrix_near(&x_chol, &x_lu, 1e-3, "Cholesky vs LU");

    let quick = CholeskyDecomposition::quick_solve_linear_equation(&spd, b.as_slice()).unwrap();
    assert_eq!(Matrix::column_vector(&quick), x_chol);
}

#[test]
fn cholesky_rejects_non_spd() {
    let not_sym = Matrix::from_rows(2, 2, &[2.0, 1.0, 0.0, 2.0]);
    assert_eq!(
        CholeskyDecomposition::new(&not_sym).unwrap_err(),
        LinalgError::NotSymmetric
    );
    let indefinite = Matrix::from_rows(2, 2, &[1.0, 2.0, 2.0, 1.0]);
    assert_eq!(
        CholeskyDecomposition::new(&indefinite).unwrap_err(),
        LinalgError::NotPositiveDefinite
    );
}

// ── QR ──────────────────────────────────────────────────────────────

#[test]
fn qr_reconstructs_and_is_orthonormal() {
    let a = Matrix::from_fn(6, 4, |i, j| ((i * 3 + j * 5) % 7) as f32 - 3.0 + (i == j) as u8 as f32);
    let qr = QrDecomposition::new(&a).unwrap();
    assert!(qr.is_full_rank());
    let q = qr.left_factor();
    assert_orthonormal_columns(&q, "QᵗQ");
    assert_matrix_near(&(&q * &qr.right_factor()), &a, TOL, "Q·R");
}

#[test]
fn qr_solve_matches_lu_on_square() {
    let a = sample_5x5();
    let b = Matrix::column_vector(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let x_qr = a.qr().unwrap().solve(&b).unwrap();
    let x_lu = a.lu().unwrap().solve(&b).unwrap();
    assert_matrix_near(&x_qr, &x_lu, 1e-3, "QR vs LU");
}

#[test]
fn overdetermined_solve_goes_through_qr() {
    // Fit y = c0 + c1·x through (0,1), (1,2), (2,4)
    let a = Matrix::from_rows(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
    let b = Matrix::column_vector(&[1.0, 2.0, 4.0]);
    let x = a.solve(&b).unwrap();
    assert_near(x[(0, 0)], 5.0 / 6.0, 1e-5, "c0");
    assert_near(x[(1, 0)], 1.5, 1e-5, "c1");
}

// ── Eigenvalues ─────────────────────────────────────────────────────

#[test]
fn symmetric_eigenpairs() {
    let m = sample_5x5();
    let a = &m + &m.transpose();
    let eig = EigenvalueDecomposition::new(&a).unwrap();
    assert!(eig.is_symmetric());

    let vals = eig.real_eigenvalues();
    assert!(vals.windows(2).all(|w| w[0] <= w[1]), "ascending: {:?}", vals);

    let v = eig.eigenvector_matrix();
    assert_orthonormal_columns(&v, "VᵗV");
    for (k, &lambda) in vals.iter().enumerate() {
        let vk = v.sub_matrix(0, k, 5, k + 1);
        assert_matrix_near(&(&a * &vk), &(&vk * lambda), 1e-3, &format!("A·v{}", k));
    }
}

#[test]
fn general_eigen_av_eq_vd() {
    let a = sample_5x5();
    let eig = a.eigen().unwrap();
    assert!(!eig.is_symmetric());
    let v = eig.eigenvector_matrix();
    let d = eig.diagonal_eigenvalues();
    let tol = 1e-5 * (1.0 + a.frobenius_norm() * v.frobenius_norm());
    assert_matrix_near(&(&a * &v), &(&v * &d), tol, "A·V vs V·D");

    // Complex eigenvalues come in conjugate pairs
    let vals = eig.eigenvalues();
    for (i, z) in vals.iter().enumerate() {
        if z.im > 0.0 {
            assert_eq!(vals[i + 1], z.conj());
        }
    }
}

#[test]
fn rotation_eigenvalues_are_plus_minus_i() {
    let r = Matrix::from_rows(2, 2, &[0.0, -1.0, 1.0, 0.0]);
    let mut vals = r.eigen().unwrap().eigenvalues();
    vals.sort_by(|a, b| a.im.total_cmp(&b.im));
    assert_eq!(vals, vec![Complex::new(0.0, -1.0), Complex::new(0.0, 1.0)]);
}

// ── SVD ─────────────────────────────────────────────────────────────

fn check_svd(a: &Matrix) {
    let svd = SingularValueDecomposition::new(a);
    let u = svd.left_singular_vectors();
    let v = svd.right_singular_vectors();
    let s = svd.singular_values();

    assert_eq!(s.len(), a.nrows().min(a.ncols()));
    assert!(s.iter().all(|&x| x >= 0.0), "non-negative: {:?}", s);
    assert!(s.windows(2).all(|w| w[0] >= w[1]), "descending: {:?}", s);
    assert_orthonormal_columns(&u, "UᵗU");
    assert_orthonormal_columns(&v, "VᵗV");

    let usv = &(&u * &svd.diagonal_singular_values()) * &v.transpose();
    assert_matrix_near(&usv, a, 1e-4, "U·S·Vᵗ");
}

#[test]
fn svd_tall_square_wide() {
    check_svd(&sample_5x5());
    check_svd(&Matrix::from_fn(7, 3, |i, j| ((i + 2 * j) % 5) as f32 - 2.0));
    check_svd(&Matrix::from_fn(3, 7, |i, j| ((3 * i + j) % 4) as f32 - 1.5));
}

#[test]
fn svd_one_by_one() {
    let svd = Matrix::from_rows(1, 1, &[-2.5]).svd();
    assert_eq!(svd.singular_values(), vec![2.5]);
    assert_eq!(svd.rank(), 1);
}

#[test]
fn svd_norm_and_condition() {
    let a = Matrix::from_diagonal(&[3.0, -6.0, 2.0]);
    let svd = a.svd();
    assert_eq!(svd.singular_values(), vec![6.0, 3.0, 2.0]);
    assert_eq!(svd.norm2(), 6.0);
    assert_eq!(svd.condition(), 3.0);
}

// ── Cross-cutting ───────────────────────────────────────────────────

#[test]
fn one_by_one_everywhere() {
    let a = Matrix::from_rows(1, 1, &[4.0]);
    assert_eq!(a.lu().unwrap().determinant(), 4.0);
    assert_eq!(a.cholesky().unwrap().left_factor()[(0, 0)], 2.0);
    assert_eq!(a.qr().unwrap().right_factor()[(0, 0)].abs(), 4.0);
    assert_eq!(a.eigen().unwrap().real_eigenvalues(), vec![4.0]);
    assert_eq!(a.svd().singular_values(), vec![4.0]);
}

#[test]
fn decompositions_do_not_mutate_input() {
    let a = sample_5x5();
    let before = a.clone();
    let _ = a.lu();
    let _ = a.qr();
    let _ = a.eigen();
    let _ = a.svd();
    assert_eq!(a, before);
}

#[test]
fn structural_errors() {
    let wide = Matrix::zeros(2, 3);
    assert_eq!(
        wide.lu().unwrap_err(),
        LinalgError::NotSquare { rows: 2, cols: 3 }
    );
    assert_eq!(
        wide.cholesky().unwrap_err(),
        LinalgError::NotSquare { rows: 2, cols: 3 }
    );
    assert_eq!(
        wide.eigen().unwrap_err(),
        LinalgError::NotSquare { rows: 2, cols: 3 }
    );
    assert_eq!(
        wide.qr().unwrap_err(),
        LinalgError::WideMatrix { rows: 2, cols: 3 }
    );
}

#[test]
fn errors_display() {
    assert_eq!(
        LinalgError::NotSquare { rows: 2, cols: 3 }.to_string(),
        "matrix must be square, got 2x3"
    );
    assert_eq!(LinalgError::Singular.to_string(), "matrix is singular");
}

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use linfact::Matrix;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn general(n: usize) -> Matrix {
    Matrix::from_fn(n, n, |i, j| {
        ((i * 7 + j * 3) % 11) as f32 - 5.0 + if i == j { n as f32 } else { 0.0 }
    })
}

fn spd(n: usize) -> Matrix {
    let a = Matrix::from_fn(n, n, |i, j| {
        ((i + 1) * (j + 1)) as f32 / n as f32 + if i == j { 10.0 } else { 0.0 }
    });
    &a * &a.transpose()
}

fn symmetric(n: usize) -> Matrix {
    let a = general(n);
    &a + &a.transpose()
}

fn tall(rows: usize, cols: usize) -> Matrix {
    Matrix::from_fn(rows, cols, |i, j| ((i * 5 + j * 13) % 17) as f32 - 8.0)
}

const SIZES: [usize; 3] = [4, 16, 64];

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn lu(c: &mut Criterion) {
    let mut g = c.benchmark_group("lu");
    for n in SIZES {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| black_box(a).lu().unwrap())
        });
    }
    g.finish();
}

fn lu_solve(c: &mut Criterion) {
    let mut g = c.benchmark_group("lu_solve");
    for n in SIZES {
        let lu = general(n).lu().unwrap();
        let rhs = Matrix::from_fn(n, 1, |i, _| i as f32);
        g.bench_with_input(BenchmarkId::from_parameter(n), &rhs, |b, rhs| {
            b.iter(|| lu.solve(black_box(rhs)).unwrap())
        });
    }
    g.finish();
}

fn cholesky(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky");
    for n in SIZES {
        let a = spd(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| black_box(a).cholesky().unwrap())
        });
    }
    g.finish();
}

fn qr(c: &mut Criterion) {
    let mut g = c.benchmark_group("qr");
    for n in SIZES {
        let a = tall(2 * n, n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| black_box(a).qr().unwrap())
        });
    }
    g.finish();
}

fn eigen_symmetric(c: &mut Criterion) {
    let mut g = c.benchmark_group("eigen_symmetric");
    for n in SIZES {
        let a = symmetric(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| black_box(a).eigen().unwrap())
        });
    }
    g.finish();
}

fn eigen_general(c: &mut Criterion) {
    let mut g = c.benchmark_group("eigen_general");
    for n in SIZES {
        let a = general(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| black_box(a).eigen().unwrap())
        });
    }
    g.finish();
}

fn svd(c: &mut Criterion) {
    let mut g = c.benchmark_group("svd");
    for n in SIZES {
        let a = tall(2 * n, n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| black_box(a).svd())
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    lu,
    lu_solve,
    cholesky,
    qr,
    eigen_symmetric,
    eigen_general,
    svd,
);
criterion_main!(benches);

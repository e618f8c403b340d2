//! BLAS-level kernels over column-major slices
//!
//! Level 1/2/3 building blocks used throughout the pipeline. Matrix
//! arguments are raw column-major slices with an explicit leading dimension
//! so callers can address sub-blocks of a larger allocation. Vector
//! arguments are contiguous (unit stride).

use super::Trans;

/// C := alpha * A * B + beta * C, with A `m x k`, B `k x n`, C `m x n`.
#[allow(clippy::too_many_arguments)]
pub fn gemm(
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) {
    for j in 0..n {
        scale_column(&mut c[j * ldc..j * ldc + m], beta);
        for p in 0..k {
            let t = alpha * b[p + j * ldb];
            if t != 0.0 {
                let ap = &a[p * lda..p * lda + m];
                for i in 0..m {
                    c[i + j * ldc] += t * ap[i];
                }
            }
        }
    }
}

/// y := alpha * op(A) * x + beta * y, with A `m x n`.
#[allow(clippy::too_many_arguments)]
pub fn gemv(
    trans: Trans,
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    x: &[f64],
    beta: f64,
    y: &mut [f64],
) {
    match trans {
        Trans::NoTrans => {
            scale_column(&mut y[..m], beta);
            for j in 0..n {
                let t = alpha * x[j];
                if t != 0.0 {
                    let aj = &a[j * lda..j * lda + m];
                    for i in 0..m {
                        y[i] += t * aj[i];
                    }
                }
            }
        }
        Trans::Trans => {
            for j in 0..n {
                let aj = &a[j * lda..j * lda + m];
                let mut acc = 0.0;
                for i in 0..m {
                    acc += aj[i] * x[i];
                }
                y[j] = if beta == 0.0 { 0.0 } else { beta * y[j] } + alpha * acc;
            }
        }
    }
}

/// A := A + alpha * x * y^T, rank-one update of an `m x n` block.
#[allow(clippy::too_many_arguments)]
pub fn ger(m: usize, n: usize, alpha: f64, x: &[f64], y: &[f64], a: &mut [f64], lda: usize) {
    for j in 0..n {
        let t = alpha * y[j];
        if t != 0.0 {
            let aj = &mut a[j * lda..j * lda + m];
            for i in 0..m {
                aj[i] += t * x[i];
            }
        }
    }
}

/// Euclidean norm with overflow-safe scaling.
pub fn nrm2(x: &[f64]) -> f64 {
    let mut scale = 0.0f64;
    let mut ssq = 1.0f64;
    for &v in x {
        if v != 0.0 {
            let av = v.abs();
            if scale < av {
                let r = scale / av;
                ssq = 1.0 + ssq * r * r;
                scale = av;
            } else {
                let r = av / scale;
                ssq += r * r;
            }
        }
    }
    scale * ssq.sqrt()
}

/// Dot product.
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// y := alpha * x + y.
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    if alpha == 0.0 {
        return;
    }
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// y := x.
pub fn copy(x: &[f64], y: &mut [f64]) {
    y[..x.len()].copy_from_slice(x);
}

/// x := alpha * x.
pub fn scal(alpha: f64, x: &mut [f64]) {
    for v in x {
        *v *= alpha;
    }
}

/// Exchange x and y.
pub fn swap(x: &mut [f64], y: &mut [f64]) {
    for (a, b) in x.iter_mut().zip(y) {
        std::mem::swap(a, b);
    }
}

/// Plane rotation: x := c*x + s*y, y := c*y - s*x.
pub fn rot(x: &mut [f64], y: &mut [f64], c: f64, s: f64) {
    for (xi, yi) in x.iter_mut().zip(y) {
        let t = c * *xi + s * *yi;
        *yi = c * *yi - s * *xi;
        *xi = t;
    }
}

fn scale_column(c: &mut [f64], beta: f64) {
    if beta == 0.0 {
        c.fill(0.0);
    } else if beta != 1.0 {
        for v in c {
            *v *= beta;
        }
    }
}

//! Auxiliary routines: block copy, sorting, merge permutations, and
//! elementary Householder reflectors.

use crate::intercept::EigenOps;

use super::Trans;

/// Copy an `m x n` block from `a` to `b`.
pub fn lacpy(m: usize, n: usize, a: &[f64], lda: usize, b: &mut [f64], ldb: usize) {
    for j in 0..n {
        let src = &a[j * lda..j * lda + m];
        b[j * ldb..j * ldb + m].copy_from_slice(src);
    }
}

/// Sort `d` into ascending order.
pub fn lasrt(d: &mut [f64]) {
    d.sort_unstable_by(|a, b| a.total_cmp(b));
}

/// Merge permutation for two ascending runs `a[..n1]` and `a[n1..n1 + n2]`.
///
/// Returns `perm` such that `a[perm[0]] <= a[perm[1]] <= ...` over the
/// combined range.
pub fn lamrg(a: &[f64], n1: usize, n2: usize) -> Vec<usize> {
    let mut perm = Vec::with_capacity(n1 + n2);
    let (mut i, mut j) = (0, n1);
    while i < n1 && j < n1 + n2 {
        if a[i] <= a[j] {
            perm.push(i);
            i += 1;
        } else {
            perm.push(j);
            j += 1;
        }
    }
    perm.extend(i..n1);
    perm.extend(j..n1 + n2);
    perm
}

/// Generate an elementary reflector H = I - tau * v * v^T with v[0] = 1
/// implicit, such that H * [alpha; x] = [beta; 0].
///
/// On return `alpha` holds beta, `x` holds v[1..], and the scalar tau is
/// returned. A zero `x` yields tau = 0 (H = I).
pub fn larfg<O: EigenOps>(ops: &O, alpha: &mut f64, x: &mut [f64]) -> f64 {
    let xnorm = ops.dnrm2(x);
    if xnorm == 0.0 {
        return 0.0;
    }
    let beta = -alpha.signum() * alpha.hypot(xnorm);
    let tau = (beta - *alpha) / beta;
    ops.dscal(1.0 / (*alpha - beta), x);
    *alpha = beta;
    tau
}

/// Apply H = I - tau * v * v^T from the left to the `m x n` block `c`.
///
/// `work` provides at least `n` scratch elements.
pub fn larf<O: EigenOps>(
    ops: &O,
    m: usize,
    n: usize,
    v: &[f64],
    tau: f64,
    c: &mut [f64],
    ldc: usize,
    work: &mut [f64],
) {
    if tau == 0.0 {
        return;
    }
    // w := C^T v, then C := C - tau * v * w^T
    ops.dgemv(Trans::Trans, m, n, 1.0, c, ldc, v, 0.0, &mut work[..n]);
    ops.dger(m, n, -tau, v, &work[..n], c, ldc);
}

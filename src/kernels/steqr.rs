//! QL/QR implicit-shift eigensolvers for symmetric tridiagonal matrices.
//!
//! `sterf` computes eigenvalues only; `steqr` also accumulates the plane
//! rotations into the caller's `z`, which must arrive initialized (identity
//! for eigenvectors of T itself, or a partial product to update in place).
//! Both destroy `e`.

use crate::intercept::EigenOps;

use super::KernelError;

const MAX_SWEEPS: usize = 50;

/// Eigenvalues of a symmetric tridiagonal matrix, ascending.
pub fn sterf<O: EigenOps>(ops: &O, d: &mut [f64], e: &mut [f64]) -> Result<(), KernelError> {
    let n = d.len();
    if n == 0 {
        return Ok(());
    }
    if e.len() < n - 1 {
        return Err(KernelError::IllegalArgument {
            routine: "dsterf",
            argument: "e",
        });
    }

    for l in 0..n {
        let mut iter = 0;
        loop {
            let m = split_point(d, e, l, n);
            if m == l {
                break;
            }
            iter += 1;
            if iter > MAX_SWEEPS {
                return Err(KernelError::NoConvergence {
                    routine: "dsterf",
                    iterations: MAX_SWEEPS,
                });
            }

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = g.hypot(1.0);
            g = d[m] - d[l] + e[l] / (g + r.copysign(g));
            let mut s = 1.0;
            let mut c = 1.0;
            let mut p = 0.0;
            let mut underflow = false;

            for i in (l..m).rev() {
                let f = s * e[i];
                let b = c * e[i];
                r = f.hypot(g);
                if i + 1 < e.len() {
                    e[i + 1] = r;
                }
                if r == 0.0 {
                    d[i + 1] -= p;
                    if m < e.len() {
                        e[m] = 0.0;
                    }
                    underflow = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;
            }
            if underflow {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            if m < e.len() {
                e[m] = 0.0;
            }
        }
    }

    ops.dlasrt(d);
    Ok(())
}

/// Eigenvalues and accumulated rotations: on return `d` is ascending and the
/// columns of `z` have been updated by the same orthogonal transformation.
pub fn steqr<O: EigenOps>(
    ops: &O,
    d: &mut [f64],
    e: &mut [f64],
    z: &mut [f64],
    ldz: usize,
) -> Result<(), KernelError> {
    let n = d.len();
    if n == 0 {
        return Ok(());
    }
    if e.len() < n - 1 {
        return Err(KernelError::IllegalArgument {
            routine: "dsteqr",
            argument: "e",
        });
    }
    if ldz < n || z.len() < ldz * (n - 1) + n {
        return Err(KernelError::IllegalArgument {
            routine: "dsteqr",
            argument: "z",
        });
    }

    for l in 0..n {
        let mut iter = 0;
        loop {
            let m = split_point(d, e, l, n);
            if m == l {
                break;
            }
            iter += 1;
            if iter > MAX_SWEEPS {
                return Err(KernelError::NoConvergence {
                    routine: "dsteqr",
                    iterations: MAX_SWEEPS,
                });
            }

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = g.hypot(1.0);
            g = d[m] - d[l] + e[l] / (g + r.copysign(g));
            let mut s = 1.0;
            let mut c = 1.0;
            let mut p = 0.0;
            let mut underflow = false;

            for i in (l..m).rev() {
                let f = s * e[i];
                let b = c * e[i];
                r = f.hypot(g);
                if i + 1 < e.len() {
                    e[i + 1] = r;
                }
                if r == 0.0 {
                    d[i + 1] -= p;
                    if m < e.len() {
                        e[m] = 0.0;
                    }
                    underflow = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;

                // Apply the rotation to eigenvector columns i and i+1.
                let (left, right) = z.split_at_mut((i + 1) * ldz);
                ops.drot(&mut right[..n], &mut left[i * ldz..i * ldz + n], c, s);
            }
            if underflow {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            if m < e.len() {
                e[m] = 0.0;
            }
        }
    }

    // Ascending order, carrying the columns along.
    for i in 0..n - 1 {
        let mut k = i;
        for j in i + 1..n {
            if d[j] < d[k] {
                k = j;
            }
        }
        if k != i {
            d.swap(i, k);
            let (left, right) = z.split_at_mut(k * ldz);
            ops.dswap(&mut left[i * ldz..i * ldz + n], &mut right[..n]);
        }
    }
    Ok(())
}

/// Index of the first negligible subdiagonal element at or after `l`, or the
/// end of the unreduced block.
fn split_point(d: &[f64], e: &[f64], l: usize, n: usize) -> usize {
    let mut m = l;
    while m + 1 < n {
        let dd = d[m].abs() + d[m + 1].abs();
        if e[m].abs() <= f64::EPSILON * dd {
            break;
        }
        m += 1;
    }
    m
}

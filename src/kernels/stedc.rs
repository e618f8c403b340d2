//! Divide-and-conquer eigensolver for symmetric tridiagonal matrices.
//!
//! `stedc` computes all eigenvalues and eigenvectors of T. Small problems go
//! straight to the QL/QR iteration; larger ones are torn in half by a
//! rank-one modification (`laed0`), solved recursively, and stitched back
//! together by solving the secular equation at every merge (`laed1`,
//! `laed4`). Eigenvector quality at the merge relies on the Gu-Eisenstat
//! reconstruction of the rank-one vector from the computed roots.

use crate::intercept::EigenOps;

use super::{workspace_check, KernelError, SMLSIZ};

/// Workspace requirement for [`stedc`] on a problem of order `n`.
pub fn stedc_work(n: usize) -> usize {
    (2 * n * n + 5 * n).max(1)
}

/// Eigendecomposition of the symmetric tridiagonal matrix (d, e).
///
/// On return `d` holds the eigenvalues ascending and `z` (`n x n`, leading
/// dimension `ldz`, overwritten) the eigenvectors; `e` is destroyed.
pub fn stedc<O: EigenOps>(
    ops: &O,
    d: &mut [f64],
    e: &mut [f64],
    z: &mut [f64],
    ldz: usize,
    work: &mut [f64],
    lwork: isize,
) -> Result<(), KernelError> {
    let n = d.len();
    if workspace_check("dstedc", stedc_work(n), work, lwork)? {
        return Ok(());
    }
    if n == 0 {
        return Ok(());
    }
    if e.len() < n - 1 {
        return Err(KernelError::IllegalArgument {
            routine: "dstedc",
            argument: "e",
        });
    }
    if ldz < n || z.len() < ldz * (n - 1) + n {
        return Err(KernelError::IllegalArgument {
            routine: "dstedc",
            argument: "z",
        });
    }

    for j in 0..n {
        let col = &mut z[j * ldz..j * ldz + n];
        col.fill(0.0);
        col[j] = 1.0;
    }

    if n <= SMLSIZ {
        return ops.dsteqr(d, e, z, ldz);
    }
    ops.dlaed0(d, e, z, ldz, work)
}

/// Recursive divide-and-conquer workhorse. `q` must arrive as the identity
/// (or a block-diagonal identity at recursion depth) and leaves as the
/// eigenvector matrix of the local problem.
pub fn laed0<O: EigenOps>(
    ops: &O,
    d: &mut [f64],
    e: &mut [f64],
    q: &mut [f64],
    ldq: usize,
    work: &mut [f64],
) -> Result<(), KernelError> {
    let n = d.len();
    if n <= SMLSIZ {
        return ops.dsteqr(d, e, q, ldq);
    }

    // Tear T into two half-size problems plus a rank-one correction.
    let k = n / 2;
    let rho = e[k - 1];
    d[k - 1] -= rho.abs();
    d[k] -= rho.abs();

    {
        let (d1, d2) = d.split_at_mut(k);
        let (e1, e2) = e.split_at_mut(k);
        ops.dlaed0(d1, &mut e1[..k - 1], q, ldq, work)?;
        ops.dlaed0(d2, e2, &mut q[k + k * ldq..], ldq, work)?;
    }

    ops.dlaed1(k, d, q, ldq, rho, work)
}

/// Merge two solved half-problems whose coupling was the rank-one update
/// `rho * v v^T`. `d[..k]` and `d[k..]` arrive ascending with their
/// eigenvectors in the corresponding diagonal blocks of `q`; on return the
/// whole of `d` is ascending and `q` holds the merged eigenvectors.
///
/// Workspace: `2 m^2 + 4 m` for `m = d.len()`.
pub fn laed1<O: EigenOps>(
    ops: &O,
    k: usize,
    d: &mut [f64],
    q: &mut [f64],
    ldq: usize,
    rho: f64,
    work: &mut [f64],
) -> Result<(), KernelError> {
    let m = d.len();
    if k == 0 || k >= m {
        return Err(KernelError::IllegalArgument {
            routine: "dlaed1",
            argument: "k",
        });
    }
    let needed = 2 * m * m + 4 * m;
    if work.len() < needed {
        return Err(KernelError::WorkspaceTooSmall {
            routine: "dlaed1",
            needed,
            got: work.len(),
        });
    }

    let (q2, rest) = work.split_at_mut(m * m);
    let (s, rest) = rest.split_at_mut(m * m);
    let (dlamda, rest) = rest.split_at_mut(m);
    let (zz, rest) = rest.split_at_mut(m);
    let (zhat, rest) = rest.split_at_mut(m);
    let lam = &mut rest[..m];

    // z-vector of the rank-one update in the eigenvector basis:
    // sign(rho) * last row of Q1, then first row of Q2.
    let sgn = if rho < 0.0 { -1.0 } else { 1.0 };
    for c in 0..k {
        zhat[c] = sgn * q[(k - 1) + c * ldq];
    }
    for c in k..m {
        zhat[c] = q[k + c * ldq];
    }
    let rho = rho.abs();

    // Merge the two ascending spectra, carrying z and the columns along.
    let perm = ops.dlamrg(d, k, m - k);
    for (cnew, &cold) in perm.iter().enumerate() {
        dlamda[cnew] = d[cold];
        zz[cnew] = zhat[cold];
        ops.dcopy(&q[cold * ldq..cold * ldq + m], &mut q2[cnew * m..cnew * m + m]);
    }

    if rho == 0.0 {
        // Decoupled halves: the merge is a pure permutation.
        ops.dcopy(dlamda, d);
        ops.dlacpy(m, m, q2, m, q, ldq);
        return Ok(());
    }

    // Secular equation roots; column j of `s` keeps d_i - lambda_j.
    for j in 0..m {
        lam[j] = ops.dlaed4(dlamda, zz, rho, j, &mut s[j * m..j * m + m]);
    }

    // Gu-Eisenstat: recompute the rank-one vector from the roots so the
    // eigenvectors stay numerically orthogonal.
    for i in 0..m {
        let mut prod = -s[i * m + i] / rho;
        for j in 0..m {
            if j == i {
                continue;
            }
            let den = dlamda[j] - dlamda[i];
            if den == 0.0 {
                prod = 0.0;
                break;
            }
            prod *= -s[j * m + i] / den;
        }
        zhat[i] = prod.max(0.0).sqrt().copysign(zz[i]);
    }

    // Overwrite the columns of `s` with the normalized eigenvectors of
    // D + rho * z z^T. A zero gap means the root deflated onto a pole.
    for j in 0..m {
        let col = &mut s[j * m..j * m + m];
        if let Some(i) = col.iter().position(|&gap| gap == 0.0) {
            col.fill(0.0);
            col[i] = 1.0;
        } else {
            for i in 0..m {
                col[i] = zhat[i] / col[i];
            }
            let norm = ops.dnrm2(col);
            ops.dscal(1.0 / norm, col);
        }
    }

    // Back-rotate into the original basis and store the new spectrum, which
    // interlacing already delivers in ascending order.
    ops.dgemm(m, m, m, 1.0, q2, m, s, m, 0.0, q, ldq);
    ops.dcopy(lam, d);
    Ok(())
}

/// Root `j` of the secular equation `1 + rho * sum_i z_i^2 / (d_i - x) = 0`
/// for ascending `d` and `rho > 0`.
///
/// Fills `delta[i] = d[i] - root` and returns the root, which lies in
/// `(d[j], d[j+1])`, or past `d[n-1]` for the last index. Bisection on the
/// strictly increasing secular function converges unconditionally, including
/// onto a pole when the corresponding z component vanishes.
pub fn laed4(d: &[f64], z: &[f64], rho: f64, j: usize, delta: &mut [f64]) -> f64 {
    let n = d.len();
    let znorm2: f64 = z.iter().map(|v| v * v).sum();

    let lo = d[j];
    let hi = if j + 1 < n {
        d[j + 1]
    } else {
        d[n - 1] + rho * znorm2
    };

    let lam = if hi > lo {
        let secular = |x: f64| -> f64 {
            let mut acc = 1.0;
            for i in 0..n {
                acc += rho * z[i] * z[i] / (d[i] - x);
            }
            acc
        };
        let (mut a, mut b) = (lo, hi);
        for _ in 0..200 {
            let mid = 0.5 * (a + b);
            if mid <= a || mid >= b {
                break;
            }
            if secular(mid) < 0.0 {
                a = mid;
            } else {
                b = mid;
            }
        }
        0.5 * (a + b)
    } else {
        // Degenerate bracket from duplicate poles.
        lo
    };

    for i in 0..n {
        delta[i] = d[i] - lam;
    }
    lam
}

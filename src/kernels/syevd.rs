//! Driver routine for the dense symmetric eigenproblem.
//!
//! Chains the pipeline stages: tridiagonal reduction, then either the
//! root-free QL/QR iteration (values only) or divide-and-conquer plus an
//! explicit back-transform (values and vectors).

use crate::intercept::EigenOps;
use crate::matrix::Matrix;

use super::{stedc::stedc_work, workspace_check, Jobz, KernelError};

/// Workspace requirement for [`syevd`].
pub fn syevd_work(n: usize, jobz: Jobz) -> usize {
    match jobz {
        Jobz::Values => (5 * n).max(1),
        Jobz::Vectors => (3 * n + 2 * n * n + stedc_work(n)).max(1),
    }
}

/// Eigenvalues (and optionally eigenvectors) of the symmetric matrix `a`.
///
/// On return `w` holds the eigenvalues ascending. With [`Jobz::Vectors`] the
/// columns of `a` are overwritten by the corresponding orthonormal
/// eigenvectors; with [`Jobz::Values`] `a` holds the reduction by-products
/// and should be treated as destroyed.
pub fn syevd<O: EigenOps>(
    ops: &O,
    jobz: Jobz,
    a: &mut Matrix,
    w: &mut [f64],
    work: &mut [f64],
    lwork: isize,
) -> Result<(), KernelError> {
    let n = a.rows();
    if a.cols() != n {
        return Err(KernelError::IllegalArgument {
            routine: "dsyevd",
            argument: "a",
        });
    }
    if workspace_check("dsyevd", syevd_work(n, jobz), work, lwork)? {
        return Ok(());
    }
    if w.len() < n {
        return Err(KernelError::IllegalArgument {
            routine: "dsyevd",
            argument: "w",
        });
    }
    if n == 0 {
        return Ok(());
    }
    if n == 1 {
        w[0] = a[(0, 0)];
        if jobz == Jobz::Vectors {
            a[(0, 0)] = 1.0;
        }
        return Ok(());
    }

    let (d, rest) = work.split_at_mut(n);
    let (e, rest) = rest.split_at_mut(n);
    let (tau, rest) = rest.split_at_mut(n);

    match jobz {
        Jobz::Values => {
            let stage = rest;
            let stage_len = stage.len() as isize;
            ops.dsytrd(a, d, e, tau, stage, stage_len)?;
            ops.dsterf(d, &mut e[..n - 1])?;
            ops.dcopy(d, w);
        }
        Jobz::Vectors => {
            let (q, rest) = rest.split_at_mut(n * n);
            let (z, stage) = rest.split_at_mut(n * n);
            let stage_len = stage.len() as isize;
            ops.dsytrd(a, d, e, tau, stage, stage_len)?;
            ops.dorgtr(a, tau, q, n, stage, stage_len)?;
            ops.dstedc(d, &mut e[..n - 1], z, n, stage, stage_len)?;
            // Back-transform: eigenvectors of A are Q * Z.
            ops.dgemm(n, n, n, 1.0, q, n, z, n, 0.0, a.as_mut_slice(), n);
            ops.dcopy(d, w);
        }
    }
    Ok(())
}

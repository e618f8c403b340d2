//! Eigensolver pipeline kernels
//!
//! Self-contained LAPACK-style routines for the symmetric eigenproblem:
//! tridiagonal reduction, explicit orthogonal-factor formation, QL/QR and
//! divide-and-conquer tridiagonal eigensolvers, and the BLAS-level helpers
//! they call. Every routine that makes nested routine calls takes the active
//! [`EigenOps`](crate::intercept::EigenOps) binding as its first argument and
//! dispatches through it, so an instrumented top-level call also covers the
//! helper calls it triggers.
//!
//! Workspace-taking routines honor the query convention: passing
//! [`LWORK_QUERY`] as `lwork` writes the required workspace length into
//! `work[0]` and returns without computing anything.

use thiserror::Error;

pub mod blas;
pub mod lapack_aux;
pub mod stedc;
pub mod steqr;
pub mod syevd;
pub mod tridiag;

/// Sentinel `lwork` value requesting a workspace-size query instead of a
/// computation.
pub const LWORK_QUERY: isize = -1;

/// Problems below this order skip divide-and-conquer and go straight to the
/// QL/QR iteration, matching the LAPACK crossover.
pub const SMLSIZ: usize = 25;

/// What the driver routine should compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jobz {
    /// Eigenvalues only.
    Values,
    /// Eigenvalues and eigenvectors.
    Vectors,
}

/// Transpose flag for matrix-vector kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trans {
    NoTrans,
    Trans,
}

/// Failure status reported by a pipeline routine.
///
/// The interception layer never creates, transforms, or swallows these; a
/// timed call that fails is still timed and the error reaches the caller
/// exactly as an un-instrumented call would deliver it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("{routine}: illegal value for argument {argument}")]
    IllegalArgument {
        routine: &'static str,
        argument: &'static str,
    },

    #[error("{routine}: workspace too small, need {needed} elements but got {got}")]
    WorkspaceTooSmall {
        routine: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("{routine}: eigenvalue iteration failed to converge after {iterations} sweeps")]
    NoConvergence {
        routine: &'static str,
        iterations: usize,
    },
}

/// Check the workspace contract shared by every `lwork`-taking routine.
///
/// On a query, writes `needed` into `work[0]` and reports `true` so the
/// caller can return immediately. Otherwise verifies the provided length.
pub(crate) fn workspace_check(
    routine: &'static str,
    needed: usize,
    work: &mut [f64],
    lwork: isize,
) -> Result<bool, KernelError> {
    if lwork == LWORK_QUERY {
        if work.is_empty() {
            return Err(KernelError::IllegalArgument {
                routine,
                argument: "work",
            });
        }
        work[0] = needed as f64;
        return Ok(true);
    }
    let got = (lwork.max(0) as usize).min(work.len());
    if got < needed {
        return Err(KernelError::WorkspaceTooSmall {
            routine,
            needed,
            got,
        });
    }
    Ok(false)
}

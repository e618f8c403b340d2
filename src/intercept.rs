//! Call interception for the eigensolver routine set
//!
//! Every instrumented routine is one row of the [`routine_table!`] table:
//! its method name, the report name it is timed under, its exact argument
//! list, the forwarding call to the real kernel, and (where the routine has
//! a workspace-query convention) the sentinel rule that classifies a call as
//! a dry run. The macro expands the table into the [`EigenOps`] binding
//! surface plus its two implementations, so adding a routine is a one-line
//! change and no wrapper logic is ever hand-duplicated.
//!
//! [`Direct`] forwards every call untouched. [`Timed`] brackets each compute
//! call with a monotonic clock read and reports the elapsed time to the
//! shared [`TimerRegistry`]; dry-run workspace queries are forwarded without
//! timing, since they take a far cheaper path than real computation and
//! would corrupt the per-routine averages. Kernels make their nested routine
//! calls back through the binding they were handed, so interception is total
//! for the name set: a timed `dsyevd` also times every `dgemm` it causes.
//!
//! Neither binding inspects results: return values, buffer contents, and
//! errors pass through bit-for-bit, with the registry update as the only
//! added side effect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::kernels::{self, Jobz, KernelError, Trans};
use crate::matrix::Matrix;
use crate::registry::TimerRegistry;

pub use crate::kernels::LWORK_QUERY;

/// Monotonic wall-clock bracket around a single forwarded call.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch(Instant);

impl Stopwatch {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Direct binding: every call goes straight to the kernel implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

/// Timing binding: forwards like [`Direct`] and reports each non-query call
/// to the shared registry under the routine's report name.
#[derive(Debug)]
pub struct Timed {
    registry: Arc<TimerRegistry>,
}

impl Timed {
    pub fn new(registry: Arc<TimerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TimerRegistry {
        &self.registry
    }
}

macro_rules! routine_table {
    (
        $ops:ident;
        $(
            $(#[$doc:meta])*
            fn $name:ident [$label:literal] ( $($arg:ident : $ty:ty),* $(,)? ) -> $ret:ty
                { $fwd:expr } $(, query: $query:expr)? ;
        )+
    ) => {
        /// Binding surface presented to callers of the instrumented routine
        /// set. Holding `&impl EigenOps`, calling code cannot distinguish
        /// [`Direct`] from [`Timed`] except through registry state.
        #[allow(clippy::too_many_arguments)]
        pub trait EigenOps: Sized {
            $( $(#[$doc])* fn $name(&self, $($arg: $ty),*) -> $ret; )+
        }

        #[allow(clippy::too_many_arguments, unused_variables)]
        impl EigenOps for Direct {
            $(
                fn $name(&self, $($arg: $ty),*) -> $ret {
                    let $ops = self;
                    $fwd
                }
            )+
        }

        #[allow(clippy::too_many_arguments, unused_variables)]
        impl EigenOps for Timed {
            $(
                fn $name(&self, $($arg: $ty),*) -> $ret {
                    $(
                        if $query {
                            // Workspace query: a dry run, forwarded untimed.
                            let $ops = self;
                            return $fwd;
                        }
                    )?
                    let clock = Stopwatch::start();
                    let out = {
                        let $ops = self;
                        $fwd
                    };
                    self.registry.record($label, clock.elapsed());
                    out
                }
            )+
        }

        /// Report names of every instrumented routine, in the order used to
        /// pre-seed the registry.
        pub const ROUTINE_NAMES: &[&str] = &[ $($label),+ ];
    };
}

routine_table! {
    ops;

    /// Symmetric eigenproblem driver: reduction, tridiagonal eigensolve,
    /// back-transform.
    fn dsyevd["dsyevd"](jobz: Jobz, a: &mut Matrix, w: &mut [f64], work: &mut [f64], lwork: isize)
        -> Result<(), KernelError>
        { kernels::syevd::syevd(ops, jobz, a, w, work, lwork) }, query: lwork == LWORK_QUERY;

    /// Reduce a symmetric matrix to tridiagonal form.
    fn dsytrd["dsytrd"](a: &mut Matrix, d: &mut [f64], e: &mut [f64], tau: &mut [f64], work: &mut [f64], lwork: isize)
        -> Result<(), KernelError>
        { kernels::tridiag::sytrd(ops, a, d, e, tau, work, lwork) }, query: lwork == LWORK_QUERY;

    /// Form the orthogonal factor of the tridiagonal reduction explicitly.
    fn dorgtr["dorgtr"](a: &Matrix, tau: &[f64], q: &mut [f64], ldq: usize, work: &mut [f64], lwork: isize)
        -> Result<(), KernelError>
        { kernels::tridiag::orgtr(ops, a, tau, q, ldq, work, lwork) }, query: lwork == LWORK_QUERY;

    /// Divide-and-conquer tridiagonal eigensolver.
    fn dstedc["dstedc"](d: &mut [f64], e: &mut [f64], z: &mut [f64], ldz: usize, work: &mut [f64], lwork: isize)
        -> Result<(), KernelError>
        { kernels::stedc::stedc(ops, d, e, z, ldz, work, lwork) }, query: lwork == LWORK_QUERY;

    /// QL/QR implicit-shift iteration with eigenvector accumulation.
    fn dsteqr["dsteqr"](d: &mut [f64], e: &mut [f64], z: &mut [f64], ldz: usize)
        -> Result<(), KernelError>
        { kernels::steqr::steqr(ops, d, e, z, ldz) };

    /// Root-free QL/QR iteration, eigenvalues only.
    fn dsterf["dsterf"](d: &mut [f64], e: &mut [f64]) -> Result<(), KernelError>
        { kernels::steqr::sterf(ops, d, e) };

    /// Recursive divide-and-conquer workhorse under `dstedc`.
    fn dlaed0["dlaed0"](d: &mut [f64], e: &mut [f64], q: &mut [f64], ldq: usize, work: &mut [f64])
        -> Result<(), KernelError>
        { kernels::stedc::laed0(ops, d, e, q, ldq, work) };

    /// Rank-one merge of two solved half-problems.
    fn dlaed1["dlaed1"](k: usize, d: &mut [f64], q: &mut [f64], ldq: usize, rho: f64, work: &mut [f64])
        -> Result<(), KernelError>
        { kernels::stedc::laed1(ops, k, d, q, ldq, rho, work) };

    /// Single secular-equation root for the rank-one update.
    fn dlaed4["dlaed4"](d: &[f64], z: &[f64], rho: f64, j: usize, delta: &mut [f64]) -> f64
        { kernels::stedc::laed4(d, z, rho, j, delta) };

    /// Merge permutation of two ascending runs.
    fn dlamrg["dlamrg"](a: &[f64], n1: usize, n2: usize) -> Vec<usize>
        { kernels::lapack_aux::lamrg(a, n1, n2) };

    /// Ascending sort.
    fn dlasrt["dlasrt"](d: &mut [f64]) -> ()
        { kernels::lapack_aux::lasrt(d) };

    /// Rectangular block copy.
    fn dlacpy["dlacpy"](m: usize, n: usize, a: &[f64], lda: usize, b: &mut [f64], ldb: usize) -> ()
        { kernels::lapack_aux::lacpy(m, n, a, lda, b, ldb) };

    /// Generate an elementary Householder reflector.
    fn dlarfg["dlarfg"](alpha: &mut f64, x: &mut [f64]) -> f64
        { kernels::lapack_aux::larfg(ops, alpha, x) };

    /// Apply an elementary Householder reflector from the left.
    fn dlarf["dlarf"](m: usize, n: usize, v: &[f64], tau: f64, c: &mut [f64], ldc: usize, work: &mut [f64]) -> ()
        { kernels::lapack_aux::larf(ops, m, n, v, tau, c, ldc, work) };

    /// C := alpha A B + beta C.
    fn dgemm["dgemm"](m: usize, n: usize, k: usize, alpha: f64, a: &[f64], lda: usize, b: &[f64], ldb: usize, beta: f64, c: &mut [f64], ldc: usize) -> ()
        { kernels::blas::gemm(m, n, k, alpha, a, lda, b, ldb, beta, c, ldc) };

    /// y := alpha op(A) x + beta y.
    fn dgemv["dgemv"](trans: Trans, m: usize, n: usize, alpha: f64, a: &[f64], lda: usize, x: &[f64], beta: f64, y: &mut [f64]) -> ()
        { kernels::blas::gemv(trans, m, n, alpha, a, lda, x, beta, y) };

    /// Rank-one update A += alpha x y^T.
    fn dger["dger"](m: usize, n: usize, alpha: f64, x: &[f64], y: &[f64], a: &mut [f64], lda: usize) -> ()
        { kernels::blas::ger(m, n, alpha, x, y, a, lda) };

    /// Euclidean norm.
    fn dnrm2["dnrm2"](x: &[f64]) -> f64
        { kernels::blas::nrm2(x) };

    /// Dot product.
    fn ddot["ddot"](x: &[f64], y: &[f64]) -> f64
        { kernels::blas::dot(x, y) };

    /// y += alpha x.
    fn daxpy["daxpy"](alpha: f64, x: &[f64], y: &mut [f64]) -> ()
        { kernels::blas::axpy(alpha, x, y) };

    /// y := x.
    fn dcopy["dcopy"](x: &[f64], y: &mut [f64]) -> ()
        { kernels::blas::copy(x, y) };

    /// x := alpha x.
    fn dscal["dscal"](alpha: f64, x: &mut [f64]) -> ()
        { kernels::blas::scal(alpha, x) };

    /// Exchange two vectors.
    fn dswap["dswap"](x: &mut [f64], y: &mut [f64]) -> ()
        { kernels::blas::swap(x, y) };

    /// Apply a plane rotation.
    fn drot["drot"](x: &mut [f64], y: &mut [f64], c: f64, s: f64) -> ()
        { kernels::blas::rot(x, y, c, s) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_routine_names_are_unique() {
        let set: HashSet<&str> = ROUTINE_NAMES.iter().copied().collect();
        assert_eq!(set.len(), ROUTINE_NAMES.len());
    }

    #[test]
    fn test_preseeding_the_full_table_succeeds() {
        let registry = TimerRegistry::with_preseed(ROUTINE_NAMES.iter().copied()).unwrap();
        assert_eq!(registry.len(), ROUTINE_NAMES.len());
    }

    #[test]
    fn test_stopwatch_is_monotone() {
        let clock = Stopwatch::start();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
    }

    #[test]
    fn test_timed_leaf_call_records_once() {
        let registry = Arc::new(TimerRegistry::new());
        let ops = Timed::new(Arc::clone(&registry));
        assert_eq!(ops.ddot(&[1.0, 2.0], &[3.0, 4.0]), 11.0);

        let view = registry.report();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "ddot");
        assert_eq!(view[0].calls, 1);
    }

    #[test]
    fn test_workspace_query_is_not_timed() {
        let registry = Arc::new(TimerRegistry::new());
        let ops = Timed::new(Arc::clone(&registry));

        let mut a = Matrix::kms(8, 0.5, 0.0);
        let mut w = vec![0.0; 8];
        let mut probe = [0.0f64];
        ops.dsyevd(Jobz::Values, &mut a, &mut w, &mut probe, LWORK_QUERY)
            .unwrap();

        // The query executed (it reported a size) but left no trace.
        assert!(probe[0] > 0.0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_timed_compute_call_covers_nested_routines() {
        let registry = Arc::new(TimerRegistry::new());
        let ops = Timed::new(Arc::clone(&registry));

        let n = 12;
        let mut a = Matrix::kms(n, 0.8, 0.0);
        let mut w = vec![0.0; n];
        let mut work = vec![0.0; kernels::syevd::syevd_work(n, Jobz::Values)];
        let lwork = work.len() as isize;
        ops.dsyevd(Jobz::Values, &mut a, &mut w, &mut work, lwork)
            .unwrap();

        let view = registry.report();
        let get = |name: &str| view.iter().find(|e| e.name == name).map(|e| e.calls);
        assert_eq!(get("dsyevd"), Some(1));
        assert_eq!(get("dsytrd"), Some(1));
        assert_eq!(get("dsterf"), Some(1));
        // The reduction calls one reflector per column below the diagonal.
        assert_eq!(get("dlarfg"), Some((n - 1) as u64));
        assert!(get("dgemv").unwrap_or(0) > 0);
        assert!(get("dger").unwrap_or(0) > 0);
    }

    #[test]
    fn test_failed_call_is_still_timed() {
        let registry = Arc::new(TimerRegistry::new());
        let ops = Timed::new(Arc::clone(&registry));

        let mut a = Matrix::kms(10, 0.5, 0.0);
        let mut w = vec![0.0; 10];
        let mut work = vec![0.0; 4];
        let err = ops.dsyevd(Jobz::Values, &mut a, &mut w, &mut work, 4);
        assert!(err.is_err());

        // The call executed and consumed time, so it is counted.
        let view = registry.report();
        assert_eq!(view.iter().find(|e| e.name == "dsyevd").unwrap().calls, 1);
    }

    #[test]
    fn test_direct_and_timed_produce_identical_results() {
        let n = 16;
        let mut a_direct = Matrix::kms(n, 0.9, 0.1);
        let mut a_timed = a_direct.clone();
        let mut w_direct = vec![0.0; n];
        let mut w_timed = vec![0.0; n];
        let lwork = kernels::syevd::syevd_work(n, Jobz::Vectors);
        let mut work_direct = vec![0.0; lwork];
        let mut work_timed = vec![0.0; lwork];

        Direct
            .dsyevd(Jobz::Vectors, &mut a_direct, &mut w_direct, &mut work_direct, lwork as isize)
            .unwrap();

        let registry = Arc::new(TimerRegistry::new());
        Timed::new(Arc::clone(&registry))
            .dsyevd(Jobz::Vectors, &mut a_timed, &mut w_timed, &mut work_timed, lwork as isize)
            .unwrap();

        // Bit-for-bit identical outputs; only registry state differs.
        assert_eq!(w_direct, w_timed);
        assert_eq!(a_direct, a_timed);
        assert!(!registry.is_empty());
    }
}

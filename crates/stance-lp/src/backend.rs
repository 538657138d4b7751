//! Clarabel backend.
//!
//! Clarabel solves conic programs of the form
//!
//! ```text
//! minimize      ½ xᵀ P x + qᵀ x
//! subject to    A x + s = b,   s ∈ K
//! ```
//!
//! An [`LpProblem`] maps onto it with `P = 0`. Two-sided rows with equal
//! bounds become zero-cone (equality) rows; every other finite bound becomes
//! one nonnegative-cone row: `a x <= u` as `a x + s = u`, and `a x >= l` as
//! `-a x + s = -l`.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{self, NonnegativeConeT, ZeroConeT},
};
use nalgebra::{DMatrix, DVector};
use stance_core::config::SolverConfig;
use stance_core::types::LpStatus;
use tracing::debug;

use crate::LpSolver;
use crate::problem::{LpProblem, LpSolution, is_finite_bound};

/// Clarabel-backed [`LpSolver`].
#[derive(Clone, Debug)]
pub struct ClarabelLp {
    config: SolverConfig,
    warm_start: bool,
}

impl ClarabelLp {
    pub const fn new(config: SolverConfig) -> Self {
        Self {
            config,
            warm_start: false,
        }
    }

    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The warm-start hint last forwarded to this backend.
    pub const fn warm_start(&self) -> bool {
        self.warm_start
    }
}

impl Default for ClarabelLp {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl LpSolver for ClarabelLp {
    fn solve(&self, problem: &LpProblem) -> LpSolution {
        let n = problem.num_variables();
        if !problem.is_consistent() {
            debug!("clarabel: inconsistent LP dimensions, n={n}");
            return LpSolution::failed(LpStatus::Error, n);
        }

        let form = ConicForm::from_problem(problem);
        let p_csc = zero_hessian(n);
        let a_csc = to_csc(&form.a);
        let q: Vec<f64> = problem.objective.iter().copied().collect();
        let cones = form.cones();

        let settings = match DefaultSettingsBuilder::default()
            .max_iter(self.config.max_iter)
            .verbose(self.config.verbose)
            .tol_gap_abs(self.config.tol_gap_abs)
            .tol_gap_rel(self.config.tol_gap_rel)
            .tol_feas(self.config.tol_feas)
            .build()
        {
            Ok(settings) => settings,
            Err(e) => {
                debug!("clarabel: invalid settings: {e}");
                return LpSolution::failed(LpStatus::Error, n);
            }
        };

        let mut solver = match DefaultSolver::new(&p_csc, &q, &a_csc, &form.b, &cones, settings) {
            Ok(solver) => solver,
            Err(e) => {
                debug!("clarabel: failed to set up problem: {e}");
                return LpSolution::failed(LpStatus::Error, n);
            }
        };
        solver.solve();

        let sol = &solver.solution;
        let status = map_status(&sol.status);
        if !status.is_optimal() {
            debug!("clarabel: terminated with {:?}", sol.status);
            return LpSolution::failed(status, n);
        }

        let x = DVector::from_column_slice(&sol.x);
        let objective = problem.objective_value(&x);
        LpSolution {
            status,
            x,
            objective,
        }
    }

    fn set_warm_start(&mut self, enabled: bool) {
        if enabled {
            debug!("clarabel: warm start requested; interior-point solves always start cold");
        }
        self.warm_start = enabled;
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "clarabel"
    }
}

fn map_status(status: &SolverStatus) -> LpStatus {
    match status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => LpStatus::Optimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            LpStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => LpStatus::Unbounded,
        _ => LpStatus::Error,
    }
}

// ---------------------------------------------------------------------------
// ConicForm
// ---------------------------------------------------------------------------

/// `A x + s = b` with equality rows first, then nonnegative rows.
#[derive(Debug)]
struct ConicForm {
    a: DMatrix<f64>,
    b: Vec<f64>,
    n_eq: usize,
    n_ineq: usize,
}

impl ConicForm {
    fn from_problem(problem: &LpProblem) -> Self {
        let n = problem.num_variables();
        let mut eq: Vec<(DVector<f64>, f64)> = Vec::new();
        let mut ineq: Vec<(DVector<f64>, f64)> = Vec::new();

        #[allow(clippy::float_cmp)]
        let mut push = |row: DVector<f64>, lo: f64, hi: f64| {
            let (has_lo, has_hi) = (is_finite_bound(lo), is_finite_bound(hi));
            if has_lo && has_hi && lo == hi {
                eq.push((row, hi));
                return;
            }
            if has_hi {
                ineq.push((row.clone(), hi));
            }
            if has_lo {
                ineq.push((-row, -lo));
            }
        };

        for i in 0..problem.num_constraints() {
            push(
                problem.constraints.row(i).transpose(),
                problem.constraint_lower[i],
                problem.constraint_upper[i],
            );
        }
        for j in 0..n {
            let mut unit = DVector::zeros(n);
            unit[j] = 1.0;
            push(unit, problem.lower[j], problem.upper[j]);
        }

        let (n_eq, n_ineq) = (eq.len(), ineq.len());
        let mut a = DMatrix::zeros(n_eq + n_ineq, n);
        let mut b = Vec::with_capacity(n_eq + n_ineq);
        for (i, (row, rhs)) in eq.into_iter().chain(ineq).enumerate() {
            a.row_mut(i).copy_from(&row.transpose());
            b.push(rhs);
        }

        Self { a, b, n_eq, n_ineq }
    }

    fn cones(&self) -> Vec<SupportedConeT<f64>> {
        let mut cones = Vec::with_capacity(2);
        if self.n_eq > 0 {
            cones.push(ZeroConeT(self.n_eq));
        }
        if self.n_ineq > 0 {
            cones.push(NonnegativeConeT(self.n_ineq));
        }
        cones
    }
}

/// Column-compressed copy of `m` holding its exact nonzeros.
///
/// Constraint blocks are copies of `G` and unit entries, so structural zeros
/// are exact and small generator entries are kept as they are.
fn to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut colptr = Vec::with_capacity(m.ncols() + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    colptr.push(0);
    for column in m.column_iter() {
        for (i, &v) in column.iter().enumerate() {
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr.push(rowval.len());
    }
    CscMatrix::new(m.nrows(), m.ncols(), colptr, rowval, nzval)
}

/// All-zero `n x n` cost Hessian.
fn zero_hessian(n: usize) -> CscMatrix<f64> {
    CscMatrix::new(n, n, vec![0usize; n + 1], Vec::new(), Vec::new())
}

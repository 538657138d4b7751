//! Mock LP solvers for testing.
//!
//! Both mocks implement [`LpSolver`] so they can be plugged into an
//! equilibrium engine in place of the real backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stance_core::types::LpStatus;
use stance_lp::{LpProblem, LpSolution, LpSolver};

// ---------------------------------------------------------------------------
// CountingSolver
// ---------------------------------------------------------------------------

/// Wraps another solver and counts `solve` calls.
///
/// The counter is shared, so a handle taken with [`CountingSolver::counter`]
/// keeps working after the solver is boxed and moved into an engine.
pub struct CountingSolver {
    inner: Box<dyn LpSolver>,
    calls: Arc<AtomicUsize>,
}

impl CountingSolver {
    pub fn new(inner: Box<dyn LpSolver>) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle to the call counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LpSolver for CountingSolver {
    fn solve(&self, problem: &LpProblem) -> LpSolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.solve(problem)
    }

    fn supports_native_unbounded_detection(&self) -> bool {
        self.inner.supports_native_unbounded_detection()
    }

    fn set_warm_start(&mut self, enabled: bool) {
        self.inner.set_warm_start(enabled);
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "CountingSolver"
    }
}

// ---------------------------------------------------------------------------
// ScriptedSolver
// ---------------------------------------------------------------------------

/// Returns a fixed status and objective for every problem.
///
/// The solution vector is zero with the problem's dimension. Useful for
/// exercising status handling without a real backend.
pub struct ScriptedSolver {
    status: LpStatus,
    objective: f64,
    native_unbounded: bool,
    warm_start: bool,
}

impl ScriptedSolver {
    pub const fn new(status: LpStatus, objective: f64) -> Self {
        Self {
            status,
            objective,
            native_unbounded: true,
            warm_start: false,
        }
    }

    /// Report that the backend cannot detect unboundedness itself.
    pub const fn without_unbounded_detection(mut self) -> Self {
        self.native_unbounded = false;
        self
    }

    pub const fn warm_start(&self) -> bool {
        self.warm_start
    }
}

impl LpSolver for ScriptedSolver {
    fn solve(&self, problem: &LpProblem) -> LpSolution {
        let mut solution = LpSolution::failed(self.status, problem.num_variables());
        solution.objective = self.objective;
        solution
    }

    fn supports_native_unbounded_detection(&self) -> bool {
        self.native_unbounded
    }

    fn set_warm_start(&mut self, enabled: bool) {
        self.warm_start = enabled;
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ScriptedSolver"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_solver_returns_script() {
        let solver = ScriptedSolver::new(LpStatus::Infeasible, -3.0);
        let solution = solver.solve(&LpProblem::free(4));
        assert_eq!(solution.status, LpStatus::Infeasible);
        assert!((solution.objective + 3.0).abs() < f64::EPSILON);
        assert_eq!(solution.x.len(), 4);
    }

    #[test]
    fn scripted_solver_unbounded_flag() {
        let solver = ScriptedSolver::new(LpStatus::Optimal, 0.0).without_unbounded_detection();
        assert!(!solver.supports_native_unbounded_detection());
    }

    #[test]
    fn counting_solver_counts_and_delegates() {
        let mut solver = CountingSolver::new(Box::new(ScriptedSolver::new(LpStatus::Optimal, 1.0)));
        let counter = solver.counter();
        solver.set_warm_start(true);
        let _ = solver.solve(&LpProblem::free(2));
        let _ = solver.solve(&LpProblem::free(2));
        assert_eq!(solver.calls(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(solver.supports_native_unbounded_detection());
    }
}

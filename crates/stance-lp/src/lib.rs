//! Linear-program capability used by the equilibrium engine.
//!
//! The engine never talks to a solver library directly. It builds an
//! [`LpProblem`] in the bounded form
//!
//! ```text
//! minimize      cᵀ x
//! subject to    lb  <= x   <= ub
//!               Alb <= A x <= Aub
//! ```
//!
//! and hands it to an [`LpSolver`]. Bounds at or beyond [`LP_INFINITY`] in
//! magnitude are treated as absent.
//!
//! [`ClarabelLp`] is the default backend.

pub mod backend;
pub mod problem;

pub use crate::backend::ClarabelLp;
pub use crate::problem::{LP_INFINITY, LpProblem, LpSolution};

use stance_core::config::{SolverConfig, SolverKind};

/// An LP backend.
///
/// Implementations solve through `&self` so a single solver can serve
/// concurrent queries.
pub trait LpSolver: Send + Sync {
    /// Solve `problem`. Never panics on infeasible or malformed input; the
    /// returned status says what happened.
    fn solve(&self, problem: &LpProblem) -> LpSolution;

    /// Whether the backend reports unbounded problems as
    /// [`LpStatus::Unbounded`](stance_core::types::LpStatus::Unbounded).
    ///
    /// Backends that cannot (active-set QP solvers, for instance) return
    /// `false`, and callers fall back to an objective-magnitude heuristic.
    fn supports_native_unbounded_detection(&self) -> bool {
        true
    }

    /// Warm-start hint. Backends without warm starting ignore it.
    fn set_warm_start(&mut self, _enabled: bool) {}

    fn name(&self) -> &str;
}

/// Build the backend selected by `config`.
pub fn new_solver(config: &SolverConfig) -> Box<dyn LpSolver> {
    match config.kind {
        SolverKind::Clarabel => Box::new(ClarabelLp::new(config.clone())),
    }
}

//! One query strategy per algorithm.
//!
//! The engine looks up the strategy of its current [`Algorithm`] and
//! forwards each query to it. Strategies are stateless; everything they need
//! comes in through a [`QueryContext`]. Queries a strategy does not answer
//! fall back to [`EquilibriumError::AlgorithmMismatch`], except for the
//! declared-but-unimplemented algorithms, which refuse everything with
//! [`EquilibriumError::NotImplemented`].

use nalgebra::{DVector, MatrixXx3, Vector3};
use stance_cone::HalfSpaces;
use stance_core::types::{Algorithm, LpOutcome, LpStatus};
use stance_lp::{LpProblem, LpSolution, LpSolver};
use tracing::debug;

use crate::error::EquilibriumError;
use crate::formulation;
use crate::wrench::{GravityWrench, WrenchCone};

/// Below this dual objective a line search is reported unbounded when the
/// backend cannot detect unboundedness itself.
pub const UNBOUNDED_OBJECTIVE_THRESHOLD: f64 = -1e7;

/// Half-space form of the wrench cone with its products against `D` and `d`.
#[derive(Clone, Debug)]
pub struct ProjectedCone {
    pub half_spaces: HalfSpaces,
    /// `H D`
    pub hd_matrix: MatrixXx3<f64>,
    /// `H d`
    pub hd_offset: DVector<f64>,
}

impl ProjectedCone {
    pub fn new(half_spaces: HalfSpaces, gravity: &GravityWrench) -> Self {
        let hd_matrix = &half_spaces.matrix * gravity.matrix;
        let hd_offset = &half_spaces.matrix * gravity.offset;
        Self {
            half_spaces,
            hd_matrix,
            hd_offset,
        }
    }

    /// Whether `H D c + H d <= 0` holds row by row.
    pub fn contains(&self, com: &Vector3<f64>) -> bool {
        let residual = &self.hd_matrix * com + &self.hd_offset;
        !residual.iter().any(|&r| r > 0.0)
    }
}

/// Everything a strategy reads to answer a query.
pub struct QueryContext<'a> {
    pub cone: &'a WrenchCone,
    pub gravity: &'a GravityWrench,
    pub projection: Option<&'a ProjectedCone>,
    pub solver: &'a dyn LpSolver,
}

impl QueryContext<'_> {
    fn solve(&self, problem: &LpProblem) -> LpSolution {
        self.solver.solve(problem)
    }
}

/// Map the status of a dual LP to the status of its primal.
pub const fn dual_status(status: LpStatus) -> LpStatus {
    status.dual_to_primal()
}

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

pub trait EquilibriumStrategy: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Robustness `e_max` of the equilibrium at `com`; `None` unless optimal.
    fn robustness(
        &self,
        _ctx: &QueryContext<'_>,
        _com: &Vector3<f64>,
    ) -> Result<LpOutcome<Option<f64>>, EquilibriumError> {
        Err(EquilibriumError::mismatch(
            "compute_equilibrium_robustness",
            self.algorithm(),
        ))
    }

    /// Whether `com` is in static equilibrium.
    fn check_equilibrium(
        &self,
        _ctx: &QueryContext<'_>,
        _com: &Vector3<f64>,
    ) -> Result<LpOutcome<bool>, EquilibriumError> {
        Err(EquilibriumError::mismatch(
            "check_robust_equilibrium",
            self.algorithm(),
        ))
    }

    /// Farthest CoM `a0 + a t` with generator margin `b0`; `a0` on failure.
    fn extremum_over_line(
        &self,
        _ctx: &QueryContext<'_>,
        _a: &Vector3<f64>,
        _a0: &Vector3<f64>,
        _b0: f64,
    ) -> Result<LpOutcome<Vector3<f64>>, EquilibriumError> {
        Err(EquilibriumError::mismatch(
            "find_extremum_over_line",
            self.algorithm(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Shared primal line search
// ---------------------------------------------------------------------------

fn primal_line_search(
    ctx: &QueryContext<'_>,
    a: &Vector3<f64>,
    a0: &Vector3<f64>,
    b0: f64,
) -> LpOutcome<Vector3<f64>> {
    let g = ctx.cone.generators();
    let rhs = formulation::line_origin_wrench(g, &ctx.gravity.at(a0), b0);
    let problem = formulation::primal_line(g, &ctx.gravity.along(a), &rhs);
    let solution = ctx.solve(&problem);

    if solution.status.is_optimal() {
        let t = solution.x[g.ncols()];
        return LpOutcome::optimal(a0 + a * t);
    }
    debug!(
        "primal line search from {:?} along {:?} with b0={} failed: {}",
        a0.as_slice(),
        a.as_slice(),
        b0,
        solution.status
    );
    LpOutcome::new(solution.status, *a0)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Primal LP over generator coefficients.
pub struct PrimalLp;

impl EquilibriumStrategy for PrimalLp {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PrimalLp
    }

    fn robustness(
        &self,
        ctx: &QueryContext<'_>,
        com: &Vector3<f64>,
    ) -> Result<LpOutcome<Option<f64>>, EquilibriumError> {
        let problem = formulation::primal_robustness(ctx.cone.generators(), &ctx.gravity.at(com));
        let solution = ctx.solve(&problem);
        if solution.status.is_optimal() {
            return Ok(LpOutcome::optimal(Some(
                ctx.cone.b0_to_emax(-solution.objective),
            )));
        }
        debug!("primal LP could not be solved: {}", solution.status);
        Ok(LpOutcome::new(solution.status, None))
    }

    fn extremum_over_line(
        &self,
        ctx: &QueryContext<'_>,
        a: &Vector3<f64>,
        a0: &Vector3<f64>,
        b0: f64,
    ) -> Result<LpOutcome<Vector3<f64>>, EquilibriumError> {
        Ok(primal_line_search(ctx, a, a0, b0))
    }
}

/// Primal LP in shifted coefficients.
pub struct PrimalLpAlt;

impl EquilibriumStrategy for PrimalLpAlt {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PrimalLpAlt
    }

    fn robustness(
        &self,
        ctx: &QueryContext<'_>,
        com: &Vector3<f64>,
    ) -> Result<LpOutcome<Option<f64>>, EquilibriumError> {
        let problem =
            formulation::primal_robustness_shifted(ctx.cone.generators(), &ctx.gravity.at(com));
        let solution = ctx.solve(&problem);
        if solution.status.is_optimal() {
            return Ok(LpOutcome::optimal(Some(
                ctx.cone.b0_to_emax(-solution.objective),
            )));
        }
        debug!("shifted primal LP could not be solved: {}", solution.status);
        Ok(LpOutcome::new(solution.status, None))
    }

    fn extremum_over_line(
        &self,
        ctx: &QueryContext<'_>,
        a: &Vector3<f64>,
        a0: &Vector3<f64>,
        b0: f64,
    ) -> Result<LpOutcome<Vector3<f64>>, EquilibriumError> {
        Ok(primal_line_search(ctx, a, a0, b0))
    }
}

/// Dual LP over wrench-space multipliers.
pub struct DualLp;

impl EquilibriumStrategy for DualLp {
    fn algorithm(&self) -> Algorithm {
        Algorithm::DualLp
    }

    fn robustness(
        &self,
        ctx: &QueryContext<'_>,
        com: &Vector3<f64>,
    ) -> Result<LpOutcome<Option<f64>>, EquilibriumError> {
        let problem = formulation::dual_robustness(ctx.cone.generators(), &ctx.gravity.at(com));
        let solution = ctx.solve(&problem);
        if solution.status.is_optimal() {
            return Ok(LpOutcome::optimal(Some(
                ctx.cone.b0_to_emax(solution.objective),
            )));
        }
        debug!(
            "dual LP for com {:?} could not be solved: {}",
            com.as_slice(),
            solution.status
        );
        Ok(LpOutcome::new(dual_status(solution.status), None))
    }

    fn extremum_over_line(
        &self,
        ctx: &QueryContext<'_>,
        a: &Vector3<f64>,
        a0: &Vector3<f64>,
        b0: f64,
    ) -> Result<LpOutcome<Vector3<f64>>, EquilibriumError> {
        let g = ctx.cone.generators();
        let rhs = formulation::line_origin_wrench(g, &ctx.gravity.at(a0), b0);
        let problem = formulation::dual_line(g, &ctx.gravity.along(a), &rhs);
        let solution = ctx.solve(&problem);

        if solution.status.is_optimal() {
            let t = solution.objective;
            let com = a0 + a * t;
            if !ctx.solver.supports_native_unbounded_detection()
                && t < UNBOUNDED_OBJECTIVE_THRESHOLD
            {
                debug!("dual line search objective {t} suggests an unbounded problem");
                return Ok(LpOutcome::new(LpStatus::Unbounded, com));
            }
            return Ok(LpOutcome::optimal(com));
        }
        debug!(
            "dual line search from {:?} along {:?} with b0={} failed: {}",
            a0.as_slice(),
            a.as_slice(),
            b0,
            solution.status
        );
        Ok(LpOutcome::new(dual_status(solution.status), *a0))
    }
}

/// Half-space membership test.
pub struct PolytopeProjection;

impl EquilibriumStrategy for PolytopeProjection {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PolytopeProjection
    }

    fn check_equilibrium(
        &self,
        ctx: &QueryContext<'_>,
        com: &Vector3<f64>,
    ) -> Result<LpOutcome<bool>, EquilibriumError> {
        match ctx.projection {
            Some(projection) => Ok(LpOutcome::optimal(projection.contains(com))),
            // Only reachable for an empty cone, which the engine handles first.
            None => Ok(LpOutcome::new(LpStatus::Infeasible, false)),
        }
    }
}

/// Declared algorithms without a formulation. Every query is refused with
/// [`EquilibriumError::NotImplemented`].
pub struct Unimplemented(pub Algorithm);

impl EquilibriumStrategy for Unimplemented {
    fn algorithm(&self) -> Algorithm {
        self.0
    }

    fn robustness(
        &self,
        _ctx: &QueryContext<'_>,
        _com: &Vector3<f64>,
    ) -> Result<LpOutcome<Option<f64>>, EquilibriumError> {
        Err(EquilibriumError::NotImplemented(self.0.label()))
    }

    fn check_equilibrium(
        &self,
        _ctx: &QueryContext<'_>,
        _com: &Vector3<f64>,
    ) -> Result<LpOutcome<bool>, EquilibriumError> {
        Err(EquilibriumError::NotImplemented(self.0.label()))
    }

    fn extremum_over_line(
        &self,
        _ctx: &QueryContext<'_>,
        _a: &Vector3<f64>,
        _a0: &Vector3<f64>,
        _b0: f64,
    ) -> Result<LpOutcome<Vector3<f64>>, EquilibriumError> {
        Err(EquilibriumError::NotImplemented(self.0.label()))
    }
}

/// Strategy answering queries for `algorithm`.
pub fn strategy_for(algorithm: Algorithm) -> &'static dyn EquilibriumStrategy {
    static INTERIOR_POINT: Unimplemented = Unimplemented(Algorithm::InteriorPoint);
    static DUAL_INTERIOR_POINT: Unimplemented = Unimplemented(Algorithm::DualInteriorPoint);

    match algorithm {
        Algorithm::PrimalLp => &PrimalLp,
        Algorithm::PrimalLpAlt => &PrimalLpAlt,
        Algorithm::DualLp => &DualLp,
        Algorithm::PolytopeProjection => &PolytopeProjection,
        Algorithm::InteriorPoint => &INTERIOR_POINT,
        Algorithm::DualInteriorPoint => &DUAL_INTERIOR_POINT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stance_lp::ClarabelLp;
    use stance_test_utils::CountingSolver;

    #[test]
    fn strategies_match_their_algorithm() {
        for algorithm in Algorithm::ALL {
            assert_eq!(strategy_for(algorithm).algorithm(), algorithm);
        }
    }

    #[test]
    fn dual_status_swaps_infeasible_and_unbounded() {
        assert_eq!(dual_status(LpStatus::Infeasible), LpStatus::Unbounded);
        assert_eq!(dual_status(LpStatus::Unbounded), LpStatus::Infeasible);
        assert_eq!(dual_status(LpStatus::Optimal), LpStatus::Optimal);
        assert_eq!(dual_status(LpStatus::Error), LpStatus::Error);
    }

    #[test]
    fn unimplemented_strategies_refuse_every_query() {
        let counting = CountingSolver::new(Box::new(ClarabelLp::default()));
        let cone = WrenchCone::empty(4);
        let gravity = GravityWrench::new(1.0);
        let ctx = QueryContext {
            cone: &cone,
            gravity: &gravity,
            projection: None,
            solver: &counting,
        };
        let com = Vector3::new(0.0, 0.0, 0.5);

        for algorithm in [Algorithm::InteriorPoint, Algorithm::DualInteriorPoint] {
            let strategy = strategy_for(algorithm);
            let label = algorithm.label();
            assert!(matches!(
                strategy.robustness(&ctx, &com),
                Err(EquilibriumError::NotImplemented(l)) if l == label
            ));
            assert!(matches!(
                strategy.check_equilibrium(&ctx, &com),
                Err(EquilibriumError::NotImplemented(l)) if l == label
            ));
            assert!(matches!(
                strategy.extremum_over_line(&ctx, &Vector3::x(), &com, 0.0),
                Err(EquilibriumError::NotImplemented(l)) if l == label
            ));
        }
        assert_eq!(counting.calls(), 0);
    }
}

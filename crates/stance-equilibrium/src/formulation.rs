//! LP instances for the equilibrium queries.
//!
//! Every builder is a pure function of the generator matrix `G` and the
//! required wrench; solving and interpreting the result is up to the caller.
//! Notation: `m` generators, `w = D c + d` the wrench required at CoM `c`,
//! `1` the all-ones vector.

use nalgebra::{DMatrix, DVector, Vector6};
use stance_lp::LpProblem;

/// Lower bound of the line parameter in the primal line search.
pub const LINE_PARAMETER_LOWER_BOUND: f64 = -1e5;

/// Fill rows `row..row + rhs.len()` with the equality `block x = rhs`.
fn set_equality(problem: &mut LpProblem, row: usize, rhs: &[f64]) {
    for (i, &value) in rhs.iter().enumerate() {
        problem.constraint_lower[row + i] = value;
        problem.constraint_upper[row + i] = value;
    }
}

fn with_constraints(n: usize, rows: usize) -> LpProblem {
    let mut problem = LpProblem::free(n);
    problem.constraints = DMatrix::zeros(rows, n);
    problem.constraint_lower = DVector::zeros(rows);
    problem.constraint_upper = DVector::from_element(rows, f64::INFINITY);
    problem
}

/// Primal robustness LP over `x = [b; b0]`:
///
/// ```text
/// minimize    -b0
/// subject to  G b = w
///             b - b0 1 >= 0
/// ```
pub fn primal_robustness(g: &DMatrix<f64>, wrench: &Vector6<f64>) -> LpProblem {
    let m = g.ncols();
    let mut problem = with_constraints(m + 1, 6 + m);
    problem.objective[m] = -1.0;

    problem.constraints.view_mut((0, 0), (6, m)).copy_from(g);
    set_equality(&mut problem, 0, wrench.as_slice());

    for i in 0..m {
        problem.constraints[(6 + i, i)] = 1.0;
        problem.constraints[(6 + i, m)] = -1.0;
    }
    problem
}

/// Primal robustness LP in shifted coefficients, `x = [b'; b0]` with
/// `b = b' + b0 1`:
///
/// ```text
/// minimize    -b0
/// subject to  [G, G 1] x = w
///             b' >= 0
/// ```
pub fn primal_robustness_shifted(g: &DMatrix<f64>, wrench: &Vector6<f64>) -> LpProblem {
    let m = g.ncols();
    let mut problem = with_constraints(m + 1, 6);
    problem.objective[m] = -1.0;
    problem.lower.rows_mut(0, m).fill(0.0);

    problem.constraints.view_mut((0, 0), (6, m)).copy_from(g);
    problem
        .constraints
        .column_mut(m)
        .copy_from(&g.column_sum());
    set_equality(&mut problem, 0, wrench.as_slice());
    problem
}

/// Dual of the robustness LP over `v ∈ R⁶`:
///
/// ```text
/// minimize    wᵀ v
/// subject to  Gᵀ v >= 0
///             (G 1)ᵀ v = 1
/// ```
pub fn dual_robustness(g: &DMatrix<f64>, wrench: &Vector6<f64>) -> LpProblem {
    let m = g.ncols();
    let mut problem = with_constraints(6, m + 1);
    problem.objective.copy_from(wrench);

    problem
        .constraints
        .view_mut((0, 0), (m, 6))
        .copy_from(&g.transpose());
    problem
        .constraints
        .row_mut(m)
        .copy_from(&g.column_sum().transpose());
    set_equality(&mut problem, m, &[1.0]);
    problem
}

/// Right-hand side of the line searches: `D a0 + d - G 1 b0`.
pub fn line_origin_wrench(
    g: &DMatrix<f64>,
    wrench_at_origin: &Vector6<f64>,
    b0: f64,
) -> Vector6<f64> {
    let shift = g.column_sum() * b0;
    Vector6::from_fn(|i, _| wrench_at_origin[i] - shift[i])
}

/// Primal line search over `x = [b; t]`, the CoM being `a0 + a t`:
///
/// ```text
/// minimize    -t
/// subject to  [G, -D a] x = D a0 + d - G 1 b0
///             b >= 0,  t >= -1e5
/// ```
pub fn primal_line(g: &DMatrix<f64>, rate: &Vector6<f64>, rhs: &Vector6<f64>) -> LpProblem {
    let m = g.ncols();
    let mut problem = with_constraints(m + 1, 6);
    problem.objective[m] = -1.0;
    problem.lower.rows_mut(0, m).fill(0.0);
    problem.lower[m] = LINE_PARAMETER_LOWER_BOUND;

    problem.constraints.view_mut((0, 0), (6, m)).copy_from(g);
    problem.constraints.column_mut(m).copy_from(&(-rate));
    set_equality(&mut problem, 0, rhs.as_slice());
    problem
}

/// Dual line search over `v ∈ R⁶`; the optimal objective is the line
/// parameter `t`:
///
/// ```text
/// minimize    (D a0 + d - G 1 b0)ᵀ v
/// subject to  Gᵀ v >= 0
///             (D a)ᵀ v = -1
/// ```
pub fn dual_line(g: &DMatrix<f64>, rate: &Vector6<f64>, rhs: &Vector6<f64>) -> LpProblem {
    let m = g.ncols();
    let mut problem = with_constraints(6, m + 1);
    problem.objective.copy_from(rhs);

    problem
        .constraints
        .view_mut((0, 0), (m, 6))
        .copy_from(&g.transpose());
    problem.constraints.row_mut(m).copy_from(&rate.transpose());
    set_equality(&mut problem, m, &[-1.0]);
    problem
}

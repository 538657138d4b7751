use nalgebra::{DMatrix, DVector};
use stance_core::types::LpStatus;

/// Bounds with magnitude at or above this value are treated as infinite.
pub const LP_INFINITY: f64 = 1e20;

/// LP in bounded form: minimize `cᵀx` s.t. `lb <= x <= ub`, `Alb <= Ax <= Aub`.
#[derive(Clone, Debug)]
pub struct LpProblem {
    pub objective: DVector<f64>,
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
    pub constraints: DMatrix<f64>,
    pub constraint_lower: DVector<f64>,
    pub constraint_upper: DVector<f64>,
}

impl LpProblem {
    /// Problem with `n` free variables, zero objective and no constraints.
    pub fn free(n: usize) -> Self {
        Self {
            objective: DVector::zeros(n),
            lower: DVector::from_element(n, f64::NEG_INFINITY),
            upper: DVector::from_element(n, f64::INFINITY),
            constraints: DMatrix::zeros(0, n),
            constraint_lower: DVector::zeros(0),
            constraint_upper: DVector::zeros(0),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.nrows()
    }

    /// Check that every vector and matrix agrees on the problem dimensions.
    pub fn is_consistent(&self) -> bool {
        let n = self.num_variables();
        let m = self.num_constraints();
        self.lower.len() == n
            && self.upper.len() == n
            && self.constraints.ncols() == n
            && self.constraint_lower.len() == m
            && self.constraint_upper.len() == m
    }

    /// Objective value at `x`.
    pub fn objective_value(&self, x: &DVector<f64>) -> f64 {
        self.objective.dot(x)
    }
}

/// Whether `value` is a usable (finite, in-range) bound.
pub fn is_finite_bound(value: f64) -> bool {
    value.is_finite() && value.abs() < LP_INFINITY
}

/// Result of an LP solve.
#[derive(Clone, Debug)]
pub struct LpSolution {
    pub status: LpStatus,
    /// Primal solution. Only meaningful when `status` is optimal.
    pub x: DVector<f64>,
    /// Objective value at `x`.
    pub objective: f64,
}

impl LpSolution {
    /// A non-optimal solution of dimension `n`.
    pub fn failed(status: LpStatus, n: usize) -> Self {
        Self {
            status,
            x: DVector::zeros(n),
            objective: f64::NAN,
        }
    }
}

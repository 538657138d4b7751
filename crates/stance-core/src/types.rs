use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Gravity vector in world frame (m/s^2).
pub const GRAVITY: [f64; 3] = [0.0, 0.0, -9.81];

/// [`GRAVITY`] as a vector.
pub fn gravity() -> Vector3<f64> {
    Vector3::from(GRAVITY)
}

/// Smallest number of friction-cone edges that still spans a 3D cone.
pub const MIN_GENERATORS_PER_CONTACT: usize = 3;

/// Tolerance on `|‖n‖ - 1|` for contact normals.
pub const NORMAL_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Formulation used to answer equilibrium queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Primal LP over generator coefficients with a uniform margin `b0`.
    #[default]
    PrimalLp,
    /// Primal LP rewritten in shifted coefficients `b' = b - b0`.
    PrimalLpAlt,
    /// Dual of the primal robustness LP.
    DualLp,
    /// Half-space projection of the wrench cone.
    PolytopeProjection,
    /// Interior-point formulation. Declared, not implemented.
    InteriorPoint,
    /// Dual interior-point formulation. Declared, not implemented.
    DualInteriorPoint,
}

impl Algorithm {
    /// All selectable algorithms, implemented or not.
    pub const ALL: [Self; 6] = [
        Self::PrimalLp,
        Self::PrimalLpAlt,
        Self::DualLp,
        Self::PolytopeProjection,
        Self::InteriorPoint,
        Self::DualInteriorPoint,
    ];

    pub const fn is_implemented(self) -> bool {
        !matches!(self, Self::InteriorPoint | Self::DualInteriorPoint)
    }

    /// Whether contact configuration must also build the half-space system.
    pub const fn requires_half_spaces(self) -> bool {
        matches!(self, Self::PolytopeProjection)
    }

    /// Short identifier, matching the serialized form.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimalLp => "primal_lp",
            Self::PrimalLpAlt => "primal_lp_alt",
            Self::DualLp => "dual_lp",
            Self::PolytopeProjection => "polytope_projection",
            Self::InteriorPoint => "interior_point",
            Self::DualInteriorPoint => "dual_interior_point",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// LpStatus
// ---------------------------------------------------------------------------

/// Termination status reported by an LP solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

impl LpStatus {
    pub const fn is_optimal(self) -> bool {
        matches!(self, Self::Optimal)
    }

    /// Translate the status of a dual LP into the status of its primal.
    ///
    /// A dual that is infeasible means the primal is unbounded and vice
    /// versa. Optimal and error statuses are unchanged.
    pub const fn dual_to_primal(self) -> Self {
        match self {
            Self::Infeasible => Self::Unbounded,
            Self::Unbounded => Self::Infeasible,
            other => other,
        }
    }
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Optimal => "optimal",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// LpOutcome
// ---------------------------------------------------------------------------

/// Solver status paired with the value a query produced.
///
/// The value is only meaningful when `status` is [`LpStatus::Optimal`];
/// callers must check the status first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpOutcome<T> {
    pub status: LpStatus,
    pub value: T,
}

impl<T> LpOutcome<T> {
    pub const fn new(status: LpStatus, value: T) -> Self {
        Self { status, value }
    }

    pub const fn optimal(value: T) -> Self {
        Self {
            status: LpStatus::Optimal,
            value,
        }
    }

    pub const fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

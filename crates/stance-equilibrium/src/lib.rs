//! Robust static equilibrium of a rigid body on frictional contacts.
//!
//! The body (a legged robot, for instance) touches the environment at a set
//! of point contacts with Coulomb friction. Each friction cone is linearized
//! into a few edges and lifted into 6D wrench space; gravity acting at the
//! center of mass (CoM) must then be balanced by a nonnegative combination
//! of the lifted edges.
//!
//! # Queries
//!
//! [`StaticEquilibrium`] answers, for the current contacts:
//!
//! 1. **Robustness** at a CoM, via one of three LPs (primal, shifted primal,
//!    dual), scaled to a force margin `e_max`
//! 2. **Membership**, via a precomputed half-space form `H x <= h` of the
//!    wrench cone
//! 3. **Extremal CoM** along a ray, for a given robustness
//!
//! LP failures (infeasible, unbounded) are reported as an
//! [`LpStatus`](stance_core::types::LpStatus), not as errors.

pub mod engine;
pub mod error;
pub mod formulation;
pub mod strategy;
pub mod wrench;

pub use engine::StaticEquilibrium;
pub use error::EquilibriumError;
pub use strategy::{EquilibriumStrategy, ProjectedCone, dual_status, strategy_for};
pub use wrench::{GravityWrench, WrenchCone, friction_cone_edges, tangent_basis};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::engine::StaticEquilibrium;
    pub use crate::error::EquilibriumError;
    pub use stance_core::prelude::*;
}

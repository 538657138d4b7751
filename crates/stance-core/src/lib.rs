//! Shared building blocks for the stance workspace.
//!
//! `stance-core` holds everything the solver-facing crates agree on:
//!
//! - [`types`]: algorithm selector, LP status codes and query outcomes
//! - [`error`]: validation and configuration errors
//! - [`config`]: TOML-backed engine and solver configuration
//! - [`math`]: cross-product matrices, Euler rotations, contact patches

pub mod config;
pub mod error;
pub mod math;
pub mod types;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::{EquilibriumConfig, SolverConfig, SolverKind};
    pub use crate::error::{ConfigError, ValidationError};
    pub use crate::math::{cross_matrix, euler_matrix, generate_rectangle_contacts};
    pub use crate::types::{Algorithm, GRAVITY, LpOutcome, LpStatus, gravity};
}

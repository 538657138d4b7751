//! Cone-to-halfspace projection.
//!
//! A polyhedral cone given by its generators (V-representation) is turned
//! into an inequality system `H x <= h` (H-representation), so that
//! membership becomes one matrix-vector product.
//!
//! - [`ConeProjector`] is the capability the equilibrium engine consumes.
//! - [`DoubleDescription`] implements it by delegating the conversion to
//!   `howzat` and adapting the result.
//! - [`ensure_initialized`] performs the one-time global setup.

pub mod global;
pub mod halfspace;
pub mod projector;

pub use crate::global::{DdConstants, ensure_initialized, is_initialized};
pub use crate::halfspace::HalfSpaces;
pub use crate::projector::{ConeProjector, DoubleDescription, Instability, ProjectionError};

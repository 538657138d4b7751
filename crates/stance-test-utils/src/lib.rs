//! Shared test fixtures and utilities for stance crates.
//!
//! Provides deterministic RNG setup, canonical contact configurations and
//! mock LP solvers for counting and scripting solver calls.

pub mod fixtures;
pub mod mocks;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{ContactSet, single_flat_contact, square_contacts};
pub use mocks::{CountingSolver, ScriptedSolver};
pub use rng::{random_com, seeded_rng};

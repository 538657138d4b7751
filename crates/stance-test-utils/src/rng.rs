//! Deterministic RNG utilities for reproducible tests.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stance_core::math::sample_uniform;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draw a CoM uniformly from the box `[-half_extent, half_extent]` in x and y
/// at the fixed height `z`.
pub fn random_com(rng: &mut ChaCha8Rng, half_extent: f64, z: f64) -> Vector3<f64> {
    sample_uniform(
        &Vector3::new(-half_extent, -half_extent, z),
        &Vector3::new(half_extent, half_extent, z),
        rng,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

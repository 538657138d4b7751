//! TOML scenario files for the CLI.
//!
//! A scenario bundles an engine configuration, a contact set (rectangular
//! patches and/or raw contacts sharing one friction coefficient) and the
//! queries to run against it.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use stance_core::config::EquilibriumConfig;
use stance_core::error::ConfigError;
use stance_core::math::{generate_rectangle_contacts, sample_uniform};
use stance_equilibrium::EquilibriumError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error(transparent)]
    Equilibrium(#[from] EquilibriumError),
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ScenarioError {
    ScenarioError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_friction() -> f64 {
    0.5
}
const fn default_sample_seed() -> u64 {
    0
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Rectangular contact patch; contributes its four corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Half-extents along the patch's local X and Y.
    pub half_extents: [f64; 2],
    pub position: [f64; 3],
    /// Roll, pitch, yaw in radians.
    #[serde(default)]
    pub rpy: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    pub point: [f64; 3],
    pub normal: [f64; 3],
}

/// Ray `origin + direction t` for the extremum search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    pub direction: [f64; 3],
    pub origin: [f64; 3],
    #[serde(default)]
    pub e_max: f64,
}

/// Random CoM queries drawn uniformly from a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleConfig {
    pub count: usize,
    pub lower: [f64; 3],
    pub upper: [f64; 3],
    #[serde(default = "default_sample_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EquilibriumConfig,

    /// Friction coefficient shared by every contact.
    #[serde(default = "default_friction")]
    pub friction: f64,

    #[serde(default)]
    pub patches: Vec<PatchConfig>,

    #[serde(default)]
    pub contacts: Vec<ContactConfig>,

    /// Explicit CoM positions to query.
    #[serde(default)]
    pub queries: Vec<[f64; 3]>,

    #[serde(default)]
    pub sample: Option<SampleConfig>,

    #[serde(default)]
    pub line: Option<LineConfig>,
}

impl ScenarioConfig {
    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ScenarioError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration. Returns Err on invalid values.
    ///
    /// Contact normals are checked by the engine, not here.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.engine.validate()?;
        if !self.friction.is_finite() || self.friction <= 0.0 {
            return Err(invalid("friction", format!("must be finite and > 0, got {}", self.friction)));
        }
        for (i, patch) in self.patches.iter().enumerate() {
            if patch.half_extents.iter().any(|&h| !h.is_finite() || h <= 0.0) {
                return Err(invalid(
                    format!("patches[{i}].half_extents"),
                    "must be finite and > 0",
                ));
            }
        }
        if let Some(sample) = &self.sample {
            if sample.lower.iter().zip(&sample.upper).any(|(lo, hi)| lo > hi) {
                return Err(invalid("sample", "lower must not exceed upper"));
            }
        }
        if let Some(line) = &self.line {
            if line.direction.iter().all(|&v| v == 0.0) {
                return Err(invalid("line.direction", "must be nonzero"));
            }
        }
        Ok(())
    }

    /// Contact points and normals: patch corners first, then raw contacts.
    pub fn contacts(&self) -> (Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
        let mut points = Vec::new();
        let mut normals = Vec::new();
        for patch in &self.patches {
            let (p, n) = generate_rectangle_contacts(
                patch.half_extents[0],
                patch.half_extents[1],
                &Vector3::from(patch.position),
                &Vector3::from(patch.rpy),
            );
            points.extend(p);
            normals.extend(n);
        }
        for contact in &self.contacts {
            points.push(Vector3::from(contact.point));
            normals.push(Vector3::from(contact.normal));
        }
        (points, normals)
    }

    /// Explicit queries followed by the sampled ones.
    pub fn query_points(&self) -> Vec<Vector3<f64>> {
        let mut points: Vec<Vector3<f64>> = self.queries.iter().copied().map(Vector3::from).collect();
        if let Some(sample) = &self.sample {
            let mut rng = ChaCha8Rng::seed_from_u64(sample.seed);
            let lower = Vector3::from(sample.lower);
            let upper = Vector3::from(sample.upper);
            points.extend((0..sample.count).map(|_| sample_uniform(&lower, &upper, &mut rng)));
        }
        points
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use stance_core::types::Algorithm;

    const SQUARE: &str = include_str!("../scenarios/square.toml");
    const BIPED: &str = include_str!("../scenarios/biped.toml");

    #[test]
    fn bundled_scenarios_parse() {
        let square = ScenarioConfig::from_toml_str(SQUARE).unwrap();
        assert_eq!(square.engine.generators_per_contact, 8);
        assert_eq!(square.contacts().0.len(), 4);
        assert_eq!(square.query_points().len(), 3 + 5);
        assert!(square.line.is_some());

        let biped = ScenarioConfig::from_toml_str(BIPED).unwrap();
        assert_eq!(biped.engine.algorithm, Algorithm::DualLp);
        let (points, normals) = biped.contacts();
        assert_eq!(points.len(), 9);
        assert_eq!(normals.len(), 9);
    }

    #[test]
    fn empty_scenario_uses_defaults() {
        let config = ScenarioConfig::from_toml_str("").unwrap();
        assert!((config.friction - 0.5).abs() < f64::EPSILON);
        assert!(config.contacts().0.is_empty());
        assert!(config.query_points().is_empty());
        assert_eq!(config.engine, EquilibriumConfig::default());
    }

    #[test]
    fn sampled_queries_are_reproducible() {
        let config = ScenarioConfig::from_toml_str(SQUARE).unwrap();
        assert_eq!(config.query_points(), config.query_points());
    }

    #[test]
    fn rejects_bad_friction() {
        let err = ScenarioConfig::from_toml_str("friction = -1.0").unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidValue { ref field, .. } if field == "friction"));
    }

    #[test]
    fn rejects_degenerate_patch() {
        let toml = r"
[[patches]]
half_extents = [0.0, 0.1]
position = [0.0, 0.0, 0.0]
";
        let err = ScenarioConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_zero_line_direction() {
        let toml = r"
[line]
direction = [0.0, 0.0, 0.0]
origin = [0.0, 0.0, 0.5]
";
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn engine_errors_propagate() {
        let err = ScenarioConfig::from_toml_str("[engine]\nmass = 0.0").unwrap_err();
        assert!(matches!(err, ScenarioError::Config(ConfigError::InvalidMass(_))));
    }

    #[test]
    fn from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(&path, SQUARE).unwrap();
        let config = ScenarioConfig::from_file(&path).unwrap();
        assert_eq!(config.engine.name, "square");
    }
}

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Algorithm;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_name() -> String {
    "static_equilibrium".into()
}
const fn default_mass() -> f64 {
    1.0
}
const fn default_generators_per_contact() -> usize {
    4
}
const fn default_max_iter() -> u32 {
    200
}
const fn default_tolerance() -> f64 {
    1e-8
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// LP backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Clarabel interior-point solver (pure Rust).
    #[default]
    Clarabel,
}

/// LP backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub kind: SolverKind,

    /// Maximum interior-point iterations.
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,

    /// Absolute duality gap tolerance.
    #[serde(default = "default_tolerance")]
    pub tol_gap_abs: f64,

    /// Relative duality gap tolerance.
    #[serde(default = "default_tolerance")]
    pub tol_gap_rel: f64,

    /// Feasibility tolerance.
    #[serde(default = "default_tolerance")]
    pub tol_feas: f64,

    /// Print solver iterations to stdout.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::default(),
            max_iter: default_max_iter(),
            tol_gap_abs: default_tolerance(),
            tol_gap_rel: default_tolerance(),
            tol_feas: default_tolerance(),
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iter == 0 {
            return Err(ConfigError::InvalidValue {
                field: "solver.max_iter".into(),
                message: "must be > 0".into(),
            });
        }
        for (field, value) in [
            ("solver.tol_gap_abs", self.tol_gap_abs),
            ("solver.tol_gap_rel", self.tol_gap_rel),
            ("solver.tol_feas", self.tol_feas),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("must be finite and > 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EquilibriumConfig
// ---------------------------------------------------------------------------

/// Construction parameters for a static equilibrium engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumConfig {
    /// Identifier used in log messages.
    #[serde(default = "default_name")]
    pub name: String,

    /// Total body mass in kg.
    #[serde(default = "default_mass")]
    pub mass: f64,

    /// Friction-cone edges per contact. Values below 3 are raised to 3.
    #[serde(default = "default_generators_per_contact")]
    pub generators_per_contact: usize,

    /// Formulation used for queries until contacts select another one.
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Warm-start hint forwarded to the LP backend.
    #[serde(default)]
    pub warm_start: bool,

    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            mass: default_mass(),
            generators_per_contact: default_generators_per_contact(),
            algorithm: Algorithm::default(),
            warm_start: false,
            solver: SolverConfig::default(),
        }
    }
}

impl EquilibriumConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::InvalidMass(self.mass));
        }
        if self.name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "name".into(),
                message: "must not be empty".into(),
            });
        }
        self.solver.validate()
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

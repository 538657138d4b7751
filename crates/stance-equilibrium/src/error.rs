//! Error type of the equilibrium engine.

use stance_cone::ProjectionError;
use stance_core::error::{ConfigError, ValidationError};
use stance_core::types::Algorithm;
use thiserror::Error;

/// Failures of engine construction, contact configuration and queries.
///
/// LP outcomes (infeasible, unbounded, solver error) are not errors; they are
/// reported through [`LpOutcome`](stance_core::types::LpOutcome).
#[derive(Debug, Error)]
pub enum EquilibriumError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("cone projection failed: {0}")]
    Projection(#[from] ProjectionError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("{operation} is not available for algorithm {algorithm}")]
    AlgorithmMismatch {
        operation: &'static str,
        algorithm: Algorithm,
    },
}

impl EquilibriumError {
    pub(crate) const fn mismatch(operation: &'static str, algorithm: Algorithm) -> Self {
        Self::AlgorithmMismatch {
            operation,
            algorithm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts() {
        let err: EquilibriumError = ValidationError::UnsupportedRobustness(0.5).into();
        assert!(matches!(
            err,
            EquilibriumError::Validation(ValidationError::UnsupportedRobustness(_))
        ));
    }

    #[test]
    fn mismatch_message_names_operation_and_algorithm() {
        let err = EquilibriumError::mismatch("check_robust_equilibrium", Algorithm::DualLp);
        let msg = err.to_string();
        assert!(msg.contains("check_robust_equilibrium"));
        assert!(msg.contains("dual_lp"));
    }

    #[test]
    fn not_implemented_message() {
        let err = EquilibriumError::NotImplemented("find_extremum_in_direction");
        assert_eq!(err.to_string(), "find_extremum_in_direction is not implemented");
    }
}

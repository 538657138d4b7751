use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid mass: {0} (must be finite and > 0)")]
    InvalidMass(f64),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Contact and query validation errors.
///
/// Copy + static messages so they can be returned from query paths freely.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("Contact normal {index} should have norm 1, this has norm {norm}")]
    NonUnitNormal { index: usize, norm: f64 },

    #[error("Contact count mismatch: {points} points, {normals} normals")]
    ContactCountMismatch { points: usize, normals: usize },

    #[error("Robustness threshold e_max={0} is not supported (only 0)")]
    UnsupportedRobustness(f64),

    #[error("Invalid mass: {0} (must be finite and > 0)")]
    NonPositiveMass(f64),

    #[error("Invalid friction coefficient: {0} (must be finite and > 0)")]
    InvalidFriction(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn validation_error_is_copy() {
        let err = ValidationError::InvalidFriction(-0.1);
        let err2 = err; // Copy
        assert_eq!(err, err2);
    }

    #[test]
    fn validation_error_display_messages() {
        assert_eq!(
            ValidationError::NonUnitNormal {
                index: 2,
                norm: 0.5
            }
            .to_string(),
            "Contact normal 2 should have norm 1, this has norm 0.5"
        );
        assert_eq!(
            ValidationError::ContactCountMismatch {
                points: 4,
                normals: 3
            }
            .to_string(),
            "Contact count mismatch: 4 points, 3 normals"
        );
        assert_eq!(
            ValidationError::UnsupportedRobustness(0.5).to_string(),
            "Robustness threshold e_max=0.5 is not supported (only 0)"
        );
        assert_eq!(
            ValidationError::NonPositiveMass(0.0).to_string(),
            "Invalid mass: 0 (must be finite and > 0)"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidMass(-1.0).to_string(),
            "Invalid mass: -1 (must be finite and > 0)"
        );
        assert_eq!(
            ConfigError::InvalidValue {
                field: "name".into(),
                message: "must not be empty".into()
            }
            .to_string(),
            "Invalid value for name: must not be empty"
        );
    }
}

//! Error types and handling
//!
//! Domain-specific error enums (configuration, compose engine, terminal
//! automation) wrapped in the main `DevupError` enum for unified handling
//! at the binary boundary.

use thiserror::Error;

/// Configuration and environment resolution errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment resolution error
    #[error("Failed to resolve environment: {message}")]
    Environment { message: String },

    /// Workspace ownership validation failed
    #[error("Files owned by another user found under {path}. Run `sudo chown -R $(id -u):$(id -g) {path}` or pass ignore_ownership to continue anyway")]
    ForeignOwnership { path: String },
}

/// Compose engine errors
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Failed to spawn the docker CLI at all
    #[error("Failed to run docker compose: {0}")]
    Spawn(String),

    /// A compose invocation exited nonzero
    #[error("docker compose exited with status {code}")]
    Failed { code: i32 },

    /// Output of a compose query could not be parsed
    #[error("Failed to parse docker compose output: {message}")]
    Parse { message: String },
}

/// Main error enum wrapping all domain-specific errors
///
/// Terminal automation has no variant here: spawn failures degrade to
/// printing manual instructions and never propagate.
#[derive(Error, Debug)]
pub enum DevupError {
    /// Configuration/environment errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Compose engine errors
    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),
}

/// Convenience type alias for Results with DevupError
pub type Result<T> = std::result::Result<T, DevupError>;

impl DevupError {
    /// Exit code to report for this error.
    ///
    /// Compose failures propagate the child's own exit status; everything
    /// else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DevupError::Compose(ComposeError::Failed { code }) => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_error_display() {
        let error = ComposeError::Spawn("No such file or directory".to_string());
        assert_eq!(
            format!("{}", error),
            "Failed to run docker compose: No such file or directory"
        );

        let error = ComposeError::Failed { code: 17 };
        assert_eq!(format!("{}", error), "docker compose exited with status 17");
    }

    #[test]
    fn test_ownership_error_mentions_remediation() {
        let error = ConfigError::ForeignOwnership {
            path: ".".to_string(),
        };
        let text = format!("{}", error);
        assert!(text.contains("chown"));
        assert!(text.contains("ignore_ownership"));
    }

    #[test]
    fn test_devup_error_from_domain_errors() {
        let compose_error = ComposeError::Failed { code: 1 };
        let devup_error: DevupError = compose_error.into();
        assert!(matches!(devup_error, DevupError::Compose(_)));

        let config_error = ConfigError::Environment {
            message: "test".to_string(),
        };
        let devup_error: DevupError = config_error.into();
        assert!(matches!(devup_error, DevupError::Config(_)));
    }

    #[test]
    fn test_exit_code_propagation() {
        let err = DevupError::Compose(ComposeError::Failed { code: 42 });
        assert_eq!(err.exit_code(), 42);

        let err = DevupError::Config(ConfigError::Environment {
            message: "x".to_string(),
        });
        assert_eq!(err.exit_code(), 1);
    }
}

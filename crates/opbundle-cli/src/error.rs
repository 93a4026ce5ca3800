//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use std::path::Path;

use miette::Diagnostic;
use opbundle_core::CoreError;
use thiserror::Error;

use crate::exit_codes;

const BUNDLE_HELP: &str =
    "a bundle is a directory (optionally containing manifests/) or a .tar.gz archive of one";

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// One or more bundles failed validation
    #[error("Validation failed with {errors} error(s) and {warnings} warning(s)")]
    #[diagnostic(code(opbundle::cli::validation))]
    ValidationFailed { errors: usize, warnings: usize },

    /// A bundle could not be loaded
    #[error("Failed to load bundle from {path}: {message}")]
    #[diagnostic(code(opbundle::cli::bundle))]
    Bundle {
        path: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Anything else (output serialization, terminal IO)
    #[error("{message}")]
    #[diagnostic(code(opbundle::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ValidationFailed { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Bundle { .. } => exit_codes::BUNDLE_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation failure error
    pub fn validation_failed(errors: usize, warnings: usize) -> Self {
        Self::ValidationFailed { errors, warnings }
    }

    /// Create a bundle load error for the given path
    pub fn bundle(path: &Path, err: CoreError) -> Self {
        let help = match &err {
            CoreError::BundleNotFound { .. } | CoreError::InvalidBundle { .. } => {
                Some(BUNDLE_HELP.to_string())
            }
            _ => None,
        };

        Self::Bundle {
            path: path.display().to_string(),
            message: err.to_string(),
            help,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::other(format!("Failed to serialize output: {}", err))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::validation_failed(1, 0).exit_code(),
            exit_codes::VALIDATION_ERROR
        );
        assert_eq!(CliError::other("boom").exit_code(), exit_codes::ERROR);

        let err = CliError::bundle(
            Path::new("missing"),
            CoreError::BundleNotFound {
                path: "missing".to_string(),
            },
        );
        assert_eq!(err.exit_code(), exit_codes::BUNDLE_ERROR);
    }

    #[test]
    fn test_bundle_error_help() {
        let err = CliError::bundle(
            Path::new("b"),
            CoreError::InvalidBundle {
                message: "two CSVs".to_string(),
            },
        );
        assert!(err.to_string().starts_with("Failed to load bundle from b: "));
        assert!(err.help().is_some());

        let err = CliError::bundle(
            Path::new("b"),
            CoreError::Archive {
                message: "corrupt".to_string(),
            },
        );
        assert!(err.help().is_none());
    }

    #[test]
    fn test_validation_failed_message() {
        assert_eq!(
            CliError::validation_failed(2, 1).to_string(),
            "Validation failed with 2 error(s) and 1 warning(s)"
        );
    }
}

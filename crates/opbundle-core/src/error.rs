//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Bundle not found: {path}")]
    BundleNotFound { path: String },

    #[error("Invalid bundle: {message}")]
    InvalidBundle { message: String },

    #[error("Failed to parse manifest YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse manifest JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {message}")]
    Archive { message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

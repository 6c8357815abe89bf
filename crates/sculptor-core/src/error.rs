//! Error types for Sculptor.

use thiserror::Error;

/// Result type alias for Sculptor operations.
pub type Result<T> = std::result::Result<T, SculptorError>;

/// Main error type for Sculptor operations.
#[derive(Error, Debug)]
pub enum SculptorError {
    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gradient shape name not recognized.
    #[error("Unknown gradient shape: {0}")]
    UnknownShape(String),

    /// Architecture family name not recognized.
    #[error("Unknown architecture family: {0}")]
    UnknownFamily(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

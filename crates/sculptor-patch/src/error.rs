//! Error types for patch sculpting.

use thiserror::Error;

/// Errors that can occur while sculpting a model's patches.
///
/// Recoverable conditions (unknown target, nothing matched) are not errors;
/// see [`crate::Degraded`].
#[derive(Debug, Error)]
pub enum PatchError {
    /// Failure reported by the host while cloning or patching a model.
    #[error("Host error: {0}")]
    Host(String),

    /// Architecture table is malformed.
    #[error("Invalid architecture table '{family}': {reason}")]
    InvalidTable {
        /// Family the table was being built for.
        family: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Region not present in the architecture table.
    #[error("Unknown region '{region}' for {family}")]
    UnknownRegion {
        /// Family searched.
        family: String,
        /// Region name requested.
        region: String,
    },

    /// Configuration names a different family than the sculptor's table.
    #[error("Configuration is for {config}, sculptor table is {table}")]
    FamilyMismatch {
        /// Family of the sculptor's table.
        table: String,
        /// Family named by the configuration.
        config: String,
    },

    /// Core error (configuration, parsing).
    #[error(transparent)]
    Core(#[from] sculptor_core::SculptorError),
}

/// Result type for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;

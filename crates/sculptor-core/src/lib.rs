//! Core types, configuration and gradient curves for Sculptor.
//!
//! This crate provides the foundational pieces used throughout the Sculptor
//! workspace:
//!
//! - Gradient shapes and the curve generator that samples them
//! - Architecture family identifiers
//! - Run configuration (YAML) and its builder
//! - Error handling infrastructure

#![warn(missing_docs)]

mod config;
mod error;
pub mod gradient;
mod types;

pub use config::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{Result, SculptorError};
    pub use crate::gradient;
    pub use crate::types::*;
}

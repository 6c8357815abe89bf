//! Configuration types for a sculpt run.

use serde::{Deserialize, Serialize};

use crate::{ArchitectureFamily, GradientShape, Result, SculptorError};

/// Default strength applied on top of the gradient.
pub const DEFAULT_STRENGTH: f64 = 0.1;

/// Strength bounds accepted from configuration.
pub const STRENGTH_RANGE: std::ops::RangeInclusive<f64> = -2.0..=2.0;

/// Target option meaning "every region, one continuous gradient".
pub const TARGET_ALL: &str = "all";

/// Complete sculpt configuration, typically loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SculptConfig {
    /// Architecture family of the model being sculpted.
    pub family: ArchitectureFamily,

    /// Curve distributing strength across the targeted blocks.
    #[serde(default)]
    pub gradient_shape: GradientShape,

    /// Global multiplier applied to every gradient factor.
    #[serde(default = "default_strength")]
    pub strength: f64,

    /// Target option: `all`, a region name or the family's synced label.
    #[serde(default = "default_target")]
    pub target_blocks: String,

    /// Seed for random gradients. Unset means a fresh draw every run.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_strength() -> f64 {
    DEFAULT_STRENGTH
}

fn default_target() -> String {
    TARGET_ALL.to_string()
}

impl SculptConfig {
    /// Create a configuration with defaults for everything but the family.
    pub fn new(family: ArchitectureFamily) -> Self {
        Self {
            family,
            gradient_shape: GradientShape::default(),
            strength: DEFAULT_STRENGTH,
            target_blocks: default_target(),
            seed: None,
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration.
    ///
    /// Target names are checked later against the family's table, since
    /// an unknown target is a recoverable condition rather than an error.
    pub fn validate(&self) -> Result<()> {
        validate_strength(self.strength)?;

        if self.target_blocks.trim().is_empty() {
            return Err(SculptorError::Config(
                "target_blocks must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Check a strength against [`STRENGTH_RANGE`].
pub fn validate_strength(strength: f64) -> Result<()> {
    if !strength.is_finite() {
        return Err(SculptorError::Config(format!(
            "strength must be finite, got {}",
            strength
        )));
    }

    if !STRENGTH_RANGE.contains(&strength) {
        return Err(SculptorError::Config(format!(
            "strength {} outside {}..={}",
            strength,
            STRENGTH_RANGE.start(),
            STRENGTH_RANGE.end()
        )));
    }

    Ok(())
}

/// Builder for creating sculpt configurations programmatically.
#[derive(Debug, Clone)]
pub struct SculptBuilder {
    config: SculptConfig,
}

impl SculptBuilder {
    /// Start a builder for the given family.
    pub fn new(family: ArchitectureFamily) -> Self {
        Self {
            config: SculptConfig::new(family),
        }
    }

    /// Set the gradient shape.
    pub fn shape(mut self, shape: GradientShape) -> Self {
        self.config.gradient_shape = shape;
        self
    }

    /// Set the global strength.
    pub fn strength(mut self, strength: f64) -> Self {
        self.config.strength = strength;
        self
    }

    /// Set the target option.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.target_blocks = target.into();
        self
    }

    /// Fix the seed for random gradients.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<SculptConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

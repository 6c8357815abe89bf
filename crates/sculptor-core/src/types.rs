//! Common type definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SculptorError;

/// Curve used to distribute strength across an ordered set of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradientShape {
    /// `f(x) = x`
    #[default]
    LinearAscending,
    /// `f(x) = 1 - x`
    LinearDescending,
    /// `f(x) = x²`
    EaseInQuadratic,
    /// `f(x) = 1 - (1 - x)²`
    EaseOutQuadratic,
    /// Half sine period from 0 to 1.
    EaseInOutSine,
    /// Narrow gaussian peak centred on the middle block.
    SpikeGaussian,
    /// Complement of [`GradientShape::SpikeGaussian`].
    DipInverseGaussian,
    /// Ten discrete ascending rungs.
    StepsAscending,
    /// Ten discrete descending rungs.
    StepsDescending,
    /// Independent uniform draw per block.
    RandomNoise,
}

impl GradientShape {
    /// Every shape, in the order hosts present them.
    pub const ALL: [GradientShape; 10] = [
        Self::LinearAscending,
        Self::LinearDescending,
        Self::EaseInQuadratic,
        Self::EaseOutQuadratic,
        Self::EaseInOutSine,
        Self::SpikeGaussian,
        Self::DipInverseGaussian,
        Self::StepsAscending,
        Self::StepsDescending,
        Self::RandomNoise,
    ];

    /// Human-readable label, as shown in host option lists.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LinearAscending => "Linear (Ascending)",
            Self::LinearDescending => "Linear (Descending)",
            Self::EaseInQuadratic => "Ease In (Quadratic)",
            Self::EaseOutQuadratic => "Ease Out (Quadratic)",
            Self::EaseInOutSine => "Ease In/Out (Sine)",
            Self::SpikeGaussian => "Spike (Gaussian)",
            Self::DipInverseGaussian => "Dip (Inverse Gaussian)",
            Self::StepsAscending => "Steps (Ascending)",
            Self::StepsDescending => "Steps (Descending)",
            Self::RandomNoise => "Random (Noise)",
        }
    }

    /// Machine name used in configuration files.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LinearAscending => "linear_ascending",
            Self::LinearDescending => "linear_descending",
            Self::EaseInQuadratic => "ease_in_quadratic",
            Self::EaseOutQuadratic => "ease_out_quadratic",
            Self::EaseInOutSine => "ease_in_out_sine",
            Self::SpikeGaussian => "spike_gaussian",
            Self::DipInverseGaussian => "dip_inverse_gaussian",
            Self::StepsAscending => "steps_ascending",
            Self::StepsDescending => "steps_descending",
            Self::RandomNoise => "random_noise",
        }
    }

    /// Whether two calls with the same step count always agree.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        !matches!(self, Self::RandomNoise)
    }

    /// Look up a shape by label or machine name.
    ///
    /// Machine names are matched case-insensitively and accept `-` in place
    /// of `_`. Labels must match exactly.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|shape| shape.label() == name || shape.name() == normalized)
    }
}

impl fmt::Display for GradientShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GradientShape {
    type Err = SculptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| SculptorError::UnknownShape(s.to_string()))
    }
}

/// Diffusion architecture family whose weight namespace is being targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchitectureFamily {
    /// Flux (double/single stream transformer).
    Flux,
    /// Stable Diffusion XL (UNet).
    Sdxl,
    /// Stable Diffusion 3 (MMDiT).
    Sd3,
}

impl ArchitectureFamily {
    /// Every supported family.
    pub const ALL: [ArchitectureFamily; 3] = [Self::Flux, Self::Sdxl, Self::Sd3];

    /// Short tag used in log lines.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Flux => "Flux",
            Self::Sdxl => "SDXL",
            Self::Sd3 => "SD3",
        }
    }

    /// Name shown to users of a host node graph.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Flux => "Model Sculptor (Flux)",
            Self::Sdxl => "Model Sculptor (SDXL)",
            Self::Sd3 => "Model Sculptor (SD3)",
        }
    }
}

impl fmt::Display for ArchitectureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ArchitectureFamily {
    type Err = SculptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flux" => Ok(Self::Flux),
            "sdxl" => Ok(Self::Sdxl),
            "sd3" | "sd3.5" => Ok(Self::Sd3),
            _ => Err(SculptorError::UnknownFamily(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_label_and_name() {
        assert_eq!(
            GradientShape::from_name("Ease In/Out (Sine)"),
            Some(GradientShape::EaseInOutSine)
        );
        assert_eq!(
            GradientShape::from_name("spike-gaussian"),
            Some(GradientShape::SpikeGaussian)
        );
        assert_eq!(
            "Random_Noise".parse::<GradientShape>().unwrap(),
            GradientShape::RandomNoise
        );
        assert!("Sawtooth".parse::<GradientShape>().is_err());
    }

    #[test]
    fn test_shape_names_are_unique() {
        for (i, a) in GradientShape::ALL.iter().enumerate() {
            for b in &GradientShape::ALL[i + 1..] {
                assert_ne!(a.label(), b.label());
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn test_only_random_is_nondeterministic() {
        let random: Vec<_> = GradientShape::ALL
            .iter()
            .filter(|s| !s.is_deterministic())
            .collect();
        assert_eq!(random, vec![&GradientShape::RandomNoise]);
    }

    #[test]
    fn test_family_parse() {
        assert_eq!("FLUX".parse::<ArchitectureFamily>().unwrap(), ArchitectureFamily::Flux);
        assert_eq!("sdxl".parse::<ArchitectureFamily>().unwrap(), ArchitectureFamily::Sdxl);
        assert_eq!("sd3".parse::<ArchitectureFamily>().unwrap(), ArchitectureFamily::Sd3);
        assert!("sd15".parse::<ArchitectureFamily>().is_err());
    }
}

//! Gradient curve generation.
//!
//! A gradient is one scaling factor per block, sampled from a curve over a
//! normalized position `x ∈ [0, 1]`. The first block sits at `x = 0` and the
//! last at `x = 1`, so every shape spans its full range regardless of how
//! many blocks it is stretched across.
//!
//! ```
//! use sculptor_core::{gradient, GradientShape};
//!
//! let mut rng = gradient::seeded_rng(Some(7));
//! let factors = gradient::generate(GradientShape::LinearAscending, 5, &mut rng);
//! assert_eq!(factors, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::GradientShape;

/// Standard deviation of the spike and dip curves.
pub const GAUSSIAN_WIDTH: f64 = 0.15;

/// Number of rungs in the stepped curves.
pub const STEP_RUNGS: f64 = 10.0;

/// Build the random source used by [`GradientShape::RandomNoise`].
///
/// A fixed seed makes random gradients reproducible; `None` seeds from
/// system entropy.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Evenly spaced sample positions covering `[0, 1]`, both ends included.
///
/// The last position is pinned to exactly `1.0`.
#[must_use]
pub fn positions(steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = 1.0 / (steps - 1) as f64;
            let mut xs: Vec<f64> = (0..steps).map(|i| i as f64 * step).collect();
            xs[steps - 1] = 1.0;
            xs
        }
    }
}

/// Generate `steps` scaling factors following `shape`.
///
/// A single step always yields `[1.0]`: a lone block gets full strength
/// whatever the curve.
pub fn generate<R: Rng + ?Sized>(shape: GradientShape, steps: usize, rng: &mut R) -> Vec<f64> {
    if steps <= 1 {
        return vec![1.0; steps];
    }

    positions(steps)
        .into_iter()
        .map(|x| evaluate(shape, x, rng))
        .collect()
}

/// Generate a gradient from a shape label or machine name.
///
/// Unrecognized names degrade to an all-zero gradient instead of failing,
/// which turns the whole sculpt into a no-op scaling.
pub fn generate_by_name<R: Rng + ?Sized>(name: &str, steps: usize, rng: &mut R) -> Vec<f64> {
    match GradientShape::from_name(name) {
        Some(shape) => generate(shape, steps, rng),
        None => {
            warn!("Unknown gradient shape '{}', using a zero gradient", name);
            zeros(steps)
        }
    }
}

/// The degraded gradient: `steps` zeros.
#[must_use]
pub fn zeros(steps: usize) -> Vec<f64> {
    vec![0.0; steps]
}

/// Evaluate a single curve at position `x`.
fn evaluate<R: Rng + ?Sized>(shape: GradientShape, x: f64, rng: &mut R) -> f64 {
    match shape {
        GradientShape::LinearAscending => x,
        GradientShape::LinearDescending => 1.0 - x,
        GradientShape::EaseInQuadratic => x * x,
        GradientShape::EaseOutQuadratic => 1.0 - (1.0 - x) * (1.0 - x),
        GradientShape::EaseInOutSine => (((x - 0.5) * PI).sin() + 1.0) / 2.0,
        GradientShape::SpikeGaussian => gaussian(x),
        GradientShape::DipInverseGaussian => 1.0 - gaussian(x),
        GradientShape::StepsAscending => (x * STEP_RUNGS).floor() / STEP_RUNGS,
        GradientShape::StepsDescending => ((1.0 - x) * STEP_RUNGS).floor() / STEP_RUNGS,
        GradientShape::RandomNoise => rng.gen::<f64>(),
    }
}

fn gaussian(x: f64) -> f64 {
    (-((x - 0.5).powi(2)) / (2.0 * GAUSSIAN_WIDTH.powi(2))).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(shape: GradientShape, steps: usize) -> Vec<f64> {
        generate(shape, steps, &mut seeded_rng(Some(0)))
    }

    #[test]
    fn test_empty_and_single() {
        for shape in GradientShape::ALL {
            assert!(gen(shape, 0).is_empty());
            assert_eq!(gen(shape, 1), vec![1.0]);
        }
    }

    #[test]
    fn test_lengths() {
        for shape in GradientShape::ALL {
            for steps in [2, 5, 19, 38] {
                assert_eq!(gen(shape, steps).len(), steps);
            }
        }
    }

    #[test]
    fn test_positions_pin_endpoints() {
        let xs = positions(7);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[6], 1.0);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_linear_endpoints_and_reflection() {
        for steps in [2, 3, 12, 57] {
            let asc = gen(GradientShape::LinearAscending, steps);
            let desc = gen(GradientShape::LinearDescending, steps);
            assert_eq!(asc[0], 0.0);
            assert_eq!(asc[steps - 1], 1.0);
            for (a, d) in asc.iter().zip(&desc) {
                assert_eq!(*d, 1.0 - a);
            }
        }
    }

    #[test]
    fn test_ease_point_reflection() {
        let steps = 21;
        let ease_in = gen(GradientShape::EaseInQuadratic, steps);
        let ease_out = gen(GradientShape::EaseOutQuadratic, steps);
        for i in 0..steps {
            let mirrored = 1.0 - ease_in[steps - 1 - i];
            assert!((ease_out[i] - mirrored).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sine_range_and_midpoint() {
        let sine = gen(GradientShape::EaseInOutSine, 11);
        assert!(sine[0].abs() < 1e-12);
        assert!((sine[10] - 1.0).abs() < 1e-12);
        assert!((sine[5] - 0.5).abs() < 1e-12);
        assert!(sine.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_spike_symmetry_and_monotonic() {
        let steps = 19;
        let spike = gen(GradientShape::SpikeGaussian, steps);
        let mid = steps / 2;

        assert!((spike[mid] - 1.0).abs() < 1e-12);
        for i in 0..steps {
            assert!((spike[i] - spike[steps - 1 - i]).abs() < 1e-12);
        }
        for i in 0..mid {
            assert!(spike[i] < spike[i + 1]);
        }
        for i in mid..steps - 1 {
            assert!(spike[i] > spike[i + 1]);
        }
    }

    #[test]
    fn test_dip_complements_spike() {
        let spike = gen(GradientShape::SpikeGaussian, 24);
        let dip = gen(GradientShape::DipInverseGaussian, 24);
        for (s, d) in spike.iter().zip(&dip) {
            assert!((s + d - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_steps_are_rungs() {
        let steps = gen(GradientShape::StepsAscending, 38);
        assert!(steps.windows(2).all(|w| w[0] <= w[1]));

        for v in &steps {
            let scaled = v * STEP_RUNGS;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }

        // Ten rungs, plus the pinned endpoint landing on 1.0.
        let mut distinct: Vec<f64> = steps.clone();
        distinct.dedup();
        assert!(distinct.len() <= 11);
        assert_eq!(*steps.last().unwrap(), 1.0);
        assert!(steps[..steps.len() - 1].iter().all(|v| *v < 1.0));
    }

    #[test]
    fn test_steps_descending_non_increasing() {
        let steps = gen(GradientShape::StepsDescending, 12);
        assert_eq!(steps[0], 1.0);
        assert_eq!(steps[11], 0.0);
        assert!(steps.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_random_range_and_seeding() {
        let a = generate(GradientShape::RandomNoise, 64, &mut seeded_rng(Some(42)));
        let b = generate(GradientShape::RandomNoise, 64, &mut seeded_rng(Some(42)));
        let c = generate(GradientShape::RandomNoise, 64, &mut seeded_rng(Some(43)));

        assert!(a.iter().all(|v| (0.0..1.0).contains(v)));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_deterministic_shapes_bit_identical() {
        for shape in GradientShape::ALL.into_iter().filter(|s| s.is_deterministic()) {
            let a = generate(shape, 27, &mut seeded_rng(None));
            let b = generate(shape, 27, &mut seeded_rng(None));
            assert_eq!(a, b, "{shape}");
        }
    }

    #[test]
    fn test_unknown_name_degrades_to_zeros() {
        let mut rng = seeded_rng(Some(1));
        assert_eq!(generate_by_name("Sawtooth", 4, &mut rng), vec![0.0; 4]);
        assert_eq!(
            generate_by_name("Linear (Ascending)", 3, &mut rng),
            vec![0.0, 0.5, 1.0]
        );
    }

    #[test]
    fn test_no_shape_leaves_unit_range() {
        for shape in GradientShape::ALL {
            for v in gen(shape, 50) {
                assert!((0.0..=1.0).contains(&v), "{shape}: {v}");
            }
        }
    }
}

//! Coherent 2D gradient-noise fields.

use serde::{Deserialize, Serialize};
use simdnoise::*;

/// Configuration for a single-octave gradient-noise field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Cycles per cell.
    pub frequency: f32,
    /// Random seed for reproducible generation.
    pub seed: i32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            frequency: 0.003,
            seed: 1337,
        }
    }
}

impl NoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Raw noise samples together with their observed range.
#[derive(Debug, Clone)]
pub struct NoiseField {
    /// Row-major samples, `width * height` long.
    pub values: Vec<f32>,
    pub min: f32,
    pub max: f32,
}

/// Samples a `width × height` grid of gradient noise, one sample per cell.
///
/// Uses simdnoise, which vectorizes across each row.
pub fn sample_noise_grid(width: u32, height: u32, config: &NoiseConfig) -> NoiseField {
    let (values, min, max) = NoiseBuilder::gradient_2d(width as usize, height as usize)
        .with_seed(config.seed)
        .with_freq(config.frequency)
        .generate();

    NoiseField { values, min, max }
}

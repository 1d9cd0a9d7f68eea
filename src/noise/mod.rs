//! Noise generation module for terrain synthesis.
//!
//! Uses simdnoise for SIMD-accelerated gradient noise.

mod field;

pub use field::{NoiseConfig, NoiseField, sample_noise_grid};

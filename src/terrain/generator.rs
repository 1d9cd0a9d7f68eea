//! Heightmap generation from a coherent noise field.

use log::debug;

use crate::grid::{Grid, GridError};
use crate::noise::{sample_noise_grid, NoiseConfig};

/// Fills fresh grids from gradient noise.
#[derive(Debug, Clone, Default)]
pub struct TerrainGenerator {
    pub noise: NoiseConfig,
}

impl TerrainGenerator {
    pub fn new(noise: NoiseConfig) -> Self {
        Self { noise }
    }

    /// Generates a new, unshared `width × height` grid.
    ///
    /// The noise field is shifted so its observed minimum sits at zero, then
    /// the whole grid is multiplied by `max_value * (max - min)`, where
    /// `min`/`max` are the field's observed extremes.
    ///
    /// # Errors
    /// Returns [`GridError::ZeroSized`] if either dimension is 0.
    pub fn generate(&self, width: u32, height: u32, max_value: f32) -> Result<Grid, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized(width, height));
        }

        let field = sample_noise_grid(width, height, &self.noise);
        let mut grid = Grid::from_vec(width, height, field.values)?;

        // NOTE: the scale mixes the caller's amplitude with the field's own
        // range, so peak height is max_value * (max - min)^2.
        grid -= field.min;
        grid *= max_value * (field.max - field.min);

        debug!(
            "generated {}x{} terrain, noise range [{:.4}, {:.4}]",
            width, height, field.min, field.max
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_dimensions() {
        let grid = TerrainGenerator::default().generate(64, 48, 75.0).unwrap();
        assert_eq!(grid.width(), 64);
        assert_eq!(grid.height(), 48);
        assert_eq!(grid.owner_count(), 1);
    }

    #[test]
    fn test_generate_rejects_zero_size() {
        let generator = TerrainGenerator::default();
        assert!(generator.generate(0, 10, 1.0).is_err());
        assert!(generator.generate(10, 0, 1.0).is_err());
    }

    #[test]
    fn test_generated_heights_start_at_zero() {
        let generator = TerrainGenerator::new(NoiseConfig::with_seed(7));
        let grid = generator.generate(128, 128, 75.0).unwrap();
        let (min, max) = grid.height_range();

        assert!(min.abs() < 1e-4, "min {}", min);
        assert!(max >= min);
        assert!(grid.to_vec().iter().all(|&h| h >= -1e-4));
    }

    #[test]
    fn test_scale_follows_noise_range() {
        let noise = NoiseConfig::with_seed(99);
        let field = sample_noise_grid(96, 64, &noise);
        let grid = TerrainGenerator::new(noise).generate(96, 64, 10.0).unwrap();

        let range = field.max - field.min;
        let expected_peak = range * 10.0 * range;
        let (_, max) = grid.height_range();
        assert!(
            (max - expected_peak).abs() <= 1e-4 * expected_peak.max(1.0),
            "peak {} expected {}",
            max,
            expected_peak
        );
    }

    #[test]
    fn test_generate_reproducible_and_independent() {
        let generator = TerrainGenerator::new(NoiseConfig::with_seed(3));
        let a = generator.generate(32, 32, 1.0).unwrap();
        let b = generator.generate(32, 32, 1.0).unwrap();

        assert_eq!(a.to_vec(), b.to_vec());
        assert!(!a.shares_buffer_with(&b));
    }
}

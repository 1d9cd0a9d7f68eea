//! Erosion configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported when validating or loading an [`ErosionConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parameter '{name}' must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("max_droplet_steps must be at least 1")]
    ZeroSteps,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters for droplet erosion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionConfig {
    /// Speed gained per unit of height dropped (speed² += -Δh · gravity).
    pub gravity: f32,
    /// Volume multiplier applied after every step.
    pub evaporation: f32,
    /// Upper bound on the number of steps a droplet takes.
    pub max_droplet_steps: u32,
    /// Scales how much of the missing capacity is eroded per step.
    pub erosion_factor: f32,
    /// Radius of the conical erosion brush, in cells.
    pub erosion_radius: f32,
    /// Slope floor used in the capacity formula.
    pub min_slope: f32,
    /// Sediment capacity factor.
    pub capacity_factor: f32,
    /// Fraction of excess sediment dropped per downhill step.
    pub deposit_factor: f32,
    /// Weight of the previous direction when blending with steepest descent.
    pub inertia: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            evaporation: 0.95,
            max_droplet_steps: 256,
            erosion_factor: 10000.0,
            erosion_radius: 7.0,
            min_slope: 0.001,
            capacity_factor: 256.0,
            deposit_factor: 0.01,
            inertia: 0.1,
        }
    }
}

impl ErosionConfig {
    /// Checks that every parameter is finite and non-negative and that the
    /// step bound is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = [
            ("gravity", self.gravity),
            ("evaporation", self.evaporation),
            ("erosion_factor", self.erosion_factor),
            ("erosion_radius", self.erosion_radius),
            ("min_slope", self.min_slope),
            ("capacity_factor", self.capacity_factor),
            ("deposit_factor", self.deposit_factor),
            ("inertia", self.inertia),
        ];
        for (name, value) in params {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.max_droplet_steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        Ok(())
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

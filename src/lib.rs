//! Droplet-based hydraulic erosion on noise-generated heightmaps.
//!
//! This crate generates a heightmap from gradient noise and erodes it by
//! simulating individual water droplets that pick up and drop sediment as
//! they run downhill.

pub mod grid;
pub mod noise;
pub mod terrain;
pub mod erosion;
pub mod export;
pub mod pipeline;

pub use grid::{Grid, GridError, GradientField};
pub use noise::NoiseConfig;
pub use terrain::TerrainGenerator;
pub use erosion::{DropletSimulator, ErosionConfig, ErosionStats, Termination, Trajectory};
pub use pipeline::{DropletStage, GenerationStage, Pipeline, StageConfig, TerrainStage, World};

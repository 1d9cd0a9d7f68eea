//! Pipeline module for orchestrating terrain generation and erosion runs.
//!
//! The two host triggers ("new terrain", "run droplets") are exposed as
//! stages that can be composed and replayed deterministically from a seed.

mod stage;

pub use stage::{
    GenerationStage, StageId, StageConfig, Pipeline, PipelineError, World,
    TerrainStage, LoadStage, DropletStage,
};

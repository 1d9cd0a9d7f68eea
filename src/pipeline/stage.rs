//! Generation stage trait and pipeline orchestration.

use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::erosion::{DropletSimulator, ErosionConfig, ErosionStats, Trajectory};
use crate::export::import_grid_raw_f32;
use crate::grid::Grid;
use crate::noise::NoiseConfig;
use crate::terrain::TerrainGenerator;

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Fresh heightmap from noise.
    Terrain,
    /// Droplet erosion over the current heightmap.
    Droplets,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Terrain => "terrain",
            StageId::Droplets => "droplets",
        }
    }
}

/// Configuration passed to each generation stage.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    /// Master seed; stages derive their own random streams from it.
    pub seed: u64,
    pub noise: NoiseConfig,
    pub erosion: ErosionConfig,
}

impl StageConfig {
    /// Creates a configuration whose noise seed follows `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            noise: NoiseConfig::with_seed(seed as i32),
            erosion: ErosionConfig::default(),
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// The state stages operate on: the current grid plus everything the
/// droplet stages produced so far.
#[derive(Debug, Clone)]
pub struct World {
    pub grid: Grid,
    pub trajectories: Vec<Trajectory>,
    pub stats: ErosionStats,
    /// Number of droplet stages run so far, used to vary their seeds.
    pub droplet_runs: u64,
}

impl World {
    /// Wraps an existing grid.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            trajectories: Vec::new(),
            stats: ErosionStats::default(),
            droplet_runs: 0,
        }
    }
}

/// Trait for implementing generation stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the stage, modifying the world in place.
    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: StageConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: StageConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Executes all stages in order.
    pub fn run(&self, world: &mut World) -> Result<(), PipelineError> {
        self.run_with_callbacks(world, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `world` - The world to generate into
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        world: &mut World,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            stage.execute(world, &self.config)?;
            completed.push(stage.id());
            info!("[{}/{}] {} done", i + 1, total, stage.name());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Replaces the world's grid with freshly generated terrain.
///
/// Trajectories and statistics from earlier runs are cleared.
pub struct TerrainStage {
    pub width: u32,
    pub height: u32,
    pub max_value: f32,
}

impl TerrainStage {
    pub fn new(width: u32, height: u32, max_value: f32) -> Self {
        Self {
            width,
            height,
            max_value,
        }
    }
}

impl GenerationStage for TerrainStage {
    fn id(&self) -> StageId {
        StageId::Terrain
    }

    fn name(&self) -> &str {
        "Terrain Generation"
    }

    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError> {
        let generator = TerrainGenerator::new(config.noise.clone());
        let grid = generator
            .generate(self.width, self.height, self.max_value)
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e.to_string()))?;
        *world = World::new(grid);
        Ok(())
    }
}

/// Replaces the world's grid with an R32 float RAW heightmap from disk.
///
/// Provides [`StageId::Terrain`], so droplet stages can follow it directly.
pub struct LoadStage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl LoadStage {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }
}

impl GenerationStage for LoadStage {
    fn id(&self) -> StageId {
        StageId::Terrain
    }

    fn name(&self) -> &str {
        "Load Terrain"
    }

    fn execute(&self, world: &mut World, _config: &StageConfig) -> Result<(), PipelineError> {
        let grid = import_grid_raw_f32(&self.path, self.width, self.height)
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e.to_string()))?;
        *world = World::new(grid);
        Ok(())
    }
}

/// Runs a batch of droplets over the world's grid.
pub struct DropletStage {
    pub count: usize,
}

impl DropletStage {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl GenerationStage for DropletStage {
    fn id(&self) -> StageId {
        StageId::Droplets
    }

    fn name(&self) -> &str {
        "Droplet Erosion"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Terrain]
    }

    fn execute(&self, world: &mut World, config: &StageConfig) -> Result<(), PipelineError> {
        let seed = config.seed.wrapping_add(world.droplet_runs.wrapping_mul(0x9E37_79B9));
        let mut simulator = DropletSimulator::new(config.erosion.clone(), seed)
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e.to_string()))?;

        let batch = simulator.launch_droplets(&world.grid, self.count);
        world.trajectories.extend(batch.trajectories);
        world.stats.merge(&batch.stats);
        world.droplet_runs += 1;
        Ok(())
    }
}

//! dropsim CLI - noise terrain with droplet erosion.
//!
//! Generate a heightmap from gradient noise, optionally erode it with
//! simulated water droplets, and export the result.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

use dropsim::erosion::{ErosionConfig, Termination};
use dropsim::export::{
    export_grid_obj, export_grid_png, export_grid_raw, export_trajectory_map, RawFormat,
    TrajectoryMapOptions,
};
use dropsim::grid::Grid;
use dropsim::pipeline::{DropletStage, LoadStage, Pipeline, StageConfig, TerrainStage, World};

/// Noise terrain generator with droplet-based hydraulic erosion.
#[derive(Parser)]
#[command(name = "dropsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a noise heightmap without erosion.
    Generate {
        #[command(flatten)]
        terrain: TerrainArgs,
    },

    /// Generate or load a heightmap and erode it with droplets.
    Erode {
        #[command(flatten)]
        terrain: TerrainArgs,

        /// Number of droplets to simulate.
        #[arg(long, conflicts_with = "steps_pow")]
        droplets: Option<usize>,

        /// Simulate 2^K droplets instead of an explicit count.
        #[arg(long, default_value = "10")]
        steps_pow: u32,

        /// Erode an R32 float RAW heightmap of --width x --height cells
        /// instead of generating fresh terrain.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Load erosion parameters from a JSON file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override gravity.
        #[arg(long)]
        gravity: Option<f32>,

        /// Override the per-step evaporation factor.
        #[arg(long)]
        evaporation: Option<f32>,

        /// Override the per-droplet step limit.
        #[arg(long)]
        max_steps: Option<u32>,

        /// Override the erosion factor.
        #[arg(long)]
        erosion_factor: Option<f32>,

        /// Override the erosion brush radius, in cells.
        #[arg(long)]
        erosion_radius: Option<f32>,

        /// Override the minimum slope used for capacity.
        #[arg(long)]
        min_slope: Option<f32>,

        /// Override the sediment capacity factor.
        #[arg(long)]
        capacity_factor: Option<f32>,

        /// Override the deposition factor.
        #[arg(long)]
        deposit_factor: Option<f32>,

        /// Override the direction inertia.
        #[arg(long)]
        inertia: Option<f32>,

        /// Also export a PNG with every droplet trajectory drawn on the terrain.
        #[arg(long)]
        trajectory_map: bool,
    },

    /// Write the default erosion configuration as JSON.
    Config {
        /// Output file.
        #[arg(short, long, default_value = "erosion.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct TerrainArgs {
    /// Heightmap width in cells.
    #[arg(long, default_value = "256")]
    width: u32,

    /// Heightmap height in cells.
    #[arg(long, default_value = "256")]
    height: u32,

    /// Amplitude applied to the normalized noise field.
    #[arg(long, default_value = "75.0")]
    max_value: f32,

    /// Noise frequency in cycles per cell.
    #[arg(long, default_value = "0.003")]
    frequency: f32,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "terrain")]
    name: String,

    /// Export format.
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
    /// Wavefront OBJ mesh.
    Obj,
}

struct ErosionOverrides {
    gravity: Option<f32>,
    evaporation: Option<f32>,
    max_steps: Option<u32>,
    erosion_factor: Option<f32>,
    erosion_radius: Option<f32>,
    min_slope: Option<f32>,
    capacity_factor: Option<f32>,
    deposit_factor: Option<f32>,
    inertia: Option<f32>,
}

impl ErosionOverrides {
    fn apply(&self, config: &mut ErosionConfig) {
        if let Some(v) = self.gravity {
            config.gravity = v;
        }
        if let Some(v) = self.evaporation {
            config.evaporation = v;
        }
        if let Some(v) = self.max_steps {
            config.max_droplet_steps = v;
        }
        if let Some(v) = self.erosion_factor {
            config.erosion_factor = v;
        }
        if let Some(v) = self.erosion_radius {
            config.erosion_radius = v;
        }
        if let Some(v) = self.min_slope {
            config.min_slope = v;
        }
        if let Some(v) = self.capacity_factor {
            config.capacity_factor = v;
        }
        if let Some(v) = self.deposit_factor {
            config.deposit_factor = v;
        }
        if let Some(v) = self.inertia {
            config.inertia = v;
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { terrain } => run_generate(terrain),
        Commands::Erode {
            terrain,
            droplets,
            steps_pow,
            input,
            config,
            gravity,
            evaporation,
            max_steps,
            erosion_factor,
            erosion_radius,
            min_slope,
            capacity_factor,
            deposit_factor,
            inertia,
            trajectory_map,
        } => {
            let overrides = ErosionOverrides {
                gravity,
                evaporation,
                max_steps,
                erosion_factor,
                erosion_radius,
                min_slope,
                capacity_factor,
                deposit_factor,
                inertia,
            };
            run_erode(terrain, droplets, steps_pow, input, config, overrides, trajectory_map)
        }
        Commands::Config { output } => run_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    })
}

fn validate_terrain(args: &TerrainArgs) -> Result<(), Box<dyn Error>> {
    if args.width == 0 || args.height == 0 || args.width > 8192 || args.height > 8192 {
        return Err("Width and height must be between 1 and 8192".into());
    }
    if !args.max_value.is_finite() || !args.frequency.is_finite() || args.frequency <= 0.0 {
        return Err("Max value must be finite and frequency must be positive".into());
    }
    Ok(())
}

fn stage_config(args: &TerrainArgs, seed: u64) -> StageConfig {
    let mut config = StageConfig::with_seed(seed);
    config.noise.frequency = args.frequency;
    config
}

fn print_header(title: &str, args: &TerrainArgs, seed: u64) {
    println!("dropsim - {}", title);
    println!("======================================");
    println!("Size: {}x{}", args.width, args.height);
    println!("Max value: {}", args.max_value);
    println!("Seed: {}", seed);
    println!("Output: {}", args.output.display());
}

fn run_generate(args: TerrainArgs) -> Result<(), Box<dyn Error>> {
    validate_terrain(&args)?;
    let seed = resolve_seed(args.seed);
    print_header("Terrain Generator", &args, seed);

    let start = Instant::now();
    let mut pipeline = Pipeline::new(stage_config(&args, seed));
    pipeline.add_stage(TerrainStage::new(args.width, args.height, args.max_value));

    println!("\nRunning generation pipeline...");
    let mut world = World::new(Grid::new(1, 1)?);
    run_pipeline(&pipeline, &mut world)?;

    std::fs::create_dir_all(&args.output)?;
    let path = export_heightmap(&world.grid, &args)?;
    println!("Exported: {}", path.display());

    println!("\nDone in {:.2}s", start.elapsed().as_secs_f32());
    Ok(())
}

fn run_erode(
    args: TerrainArgs,
    droplets: Option<usize>,
    steps_pow: u32,
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    overrides: ErosionOverrides,
    trajectory_map: bool,
) -> Result<(), Box<dyn Error>> {
    validate_terrain(&args)?;
    if droplets.is_none() && steps_pow > 30 {
        return Err("--steps-pow must be at most 30".into());
    }
    let count = droplets.unwrap_or(1usize << steps_pow);

    let mut erosion = match &config_path {
        Some(path) => ErosionConfig::load_json(path)?,
        None => ErosionConfig::default(),
    };
    overrides.apply(&mut erosion);
    erosion.validate()?;

    let seed = resolve_seed(args.seed);
    print_header("Droplet Erosion", &args, seed);
    if let Some(path) = &input {
        println!("Input: {}", path.display());
    }
    if let Some(path) = &config_path {
        println!("Erosion config: {}", path.display());
    }
    println!("Droplets: {}", count);

    let start = Instant::now();
    let mut config = stage_config(&args, seed);
    config.erosion = erosion;

    let mut pipeline = Pipeline::new(config);
    match input {
        Some(path) => pipeline.add_stage(LoadStage::new(path, args.width, args.height)),
        None => pipeline.add_stage(TerrainStage::new(args.width, args.height, args.max_value)),
    };
    pipeline.add_stage(DropletStage::new(count));

    println!("\nRunning generation pipeline...");
    let mut world = World::new(Grid::new(1, 1)?);
    run_pipeline(&pipeline, &mut world)?;

    let stats = &world.stats;
    println!("\nErosion summary:");
    println!("  Droplets:   {}", stats.droplets);
    println!("  Mean steps: {:.1}", stats.mean_steps());
    println!("  Eroded:     {:.4}", stats.eroded);
    println!("  Deposited:  {:.4}", stats.deposited);
    for reason in [
        Termination::LeftGrid,
        Termination::FlatTerrain,
        Termination::SedimentExhausted,
        Termination::Evaporated,
        Termination::StepLimit,
    ] {
        println!("  {:?}: {}", reason, stats.count(reason));
    }

    std::fs::create_dir_all(&args.output)?;
    let path = export_heightmap(&world.grid, &args)?;
    println!("\nExported: {}", path.display());

    if trajectory_map {
        let path = args.output.join(format!("{}_trajectories.png", args.name));
        export_trajectory_map(
            &world.grid,
            &world.trajectories,
            &path,
            &TrajectoryMapOptions::default(),
        )?;
        println!("Exported: {}", path.display());
    }

    println!("\nDone in {:.2}s", start.elapsed().as_secs_f32());
    Ok(())
}

fn run_config(output: &Path) -> Result<(), Box<dyn Error>> {
    ErosionConfig::default().save_json(output)?;
    println!("Wrote default erosion config to {}", output.display());
    Ok(())
}

fn run_pipeline(pipeline: &Pipeline, world: &mut World) -> Result<(), Box<dyn Error>> {
    pipeline.run_with_callbacks(
        world,
        |name, i, total| println!("  [{}/{}] {}...", i + 1, total, name),
        |_, _, _| {},
    )?;
    Ok(())
}

fn export_heightmap(grid: &Grid, args: &TerrainArgs) -> Result<PathBuf, Box<dyn Error>> {
    let base = args.output.join(&args.name);
    let path = match args.format {
        ExportFormat::Png => {
            let path = base.with_extension("png");
            export_grid_png(grid, &path, None)?;
            path
        }
        ExportFormat::Raw => {
            let path = base.with_extension("raw");
            export_grid_raw(grid, &path, RawFormat::R16LittleEndian, None)?;
            path
        }
        ExportFormat::RawFloat => {
            let path = base.with_extension("r32");
            export_grid_raw(grid, &path, RawFormat::R32Float, None)?;
            path
        }
        ExportFormat::Obj => {
            let path = base.with_extension("obj");
            export_grid_obj(grid, &path)?;
            path
        }
    };
    Ok(path)
}

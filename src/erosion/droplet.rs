//! Single-droplet hydraulic erosion.
//!
//! A droplet spawns at a random position, then repeatedly:
//! 1. samples the local height and forward-difference gradient,
//! 2. blends its previous direction with steepest descent (inertia),
//! 3. moves exactly one cell along that direction,
//! 4. erodes or deposits depending on the height change and its capacity,
//! 5. updates speed from the height change and evaporates some volume.
//!
//! It stops when it leaves the grid, lands on flat terrain, runs out of
//! sediment while climbing, evaporates, or hits the step limit.

use glam::Vec2;
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::{ConfigError, ErosionConfig};
use super::kernels::MIN_DEPOSIT;
use super::stats::ErosionStats;
use crate::grid::{forward_gradient, sample_height, Grid, GridWrite};

/// Droplets with less volume than this are considered evaporated.
const MIN_VOLUME: f32 = 1e-3;

/// Upper bound on the trajectory buffer reserved before a run.
const RESERVED_STEPS: usize = 1024;

/// Ordered positions visited by one droplet, starting at its spawn point.
pub type Trajectory = Vec<Vec2>;

/// Why a droplet stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The next position fell outside the grid (not recorded).
    LeftGrid,
    /// The height did not change over the last step.
    FlatTerrain,
    /// Climbing, with no sediment left to deposit.
    SedimentExhausted,
    /// Volume dropped below the evaporation threshold.
    Evaporated,
    /// `max_droplet_steps` was reached.
    StepLimit,
}

/// Result of simulating one droplet.
#[derive(Debug, Clone)]
pub struct DropletOutcome {
    pub trajectory: Trajectory,
    /// Total material removed from the grid.
    pub eroded: f32,
    /// Total material added to the grid.
    pub deposited: f32,
    /// Number of loop iterations executed.
    pub steps: u32,
    pub termination: Termination,
}

/// Trajectories and aggregate statistics for a run of droplets.
#[derive(Debug, Clone, Default)]
pub struct DropletBatch {
    pub trajectories: Vec<Trajectory>,
    pub stats: ErosionStats,
}

/// Transient state of a droplet in flight.
struct Droplet {
    position: Vec2,
    direction: Vec2,
    speed: f32,
    volume: f32,
    sediment: f32,
}

impl Droplet {
    fn spawn(position: Vec2) -> Self {
        Self {
            position,
            direction: Vec2::ZERO,
            speed: 0.0,
            volume: 1.0,
            sediment: 0.0,
        }
    }

    /// Erodes or deposits at `pos` after a move that changed the height by
    /// `hdiff`, updating the carried sediment.
    fn exchange_sediment(
        &mut self,
        cells: &mut GridWrite<'_>,
        cfg: &ErosionConfig,
        pos: Vec2,
        hdiff: f32,
    ) -> Exchange {
        let mut exchange = Exchange::default();

        if hdiff < 0.0 {
            let capacity =
                (-hdiff).max(cfg.min_slope) * self.speed * self.volume * cfg.capacity_factor;
            if self.sediment < capacity {
                let amount = ((capacity - self.sediment) * cfg.erosion_factor).min(-hdiff);
                let removed = cells.apply_erosion(pos, cfg.erosion_radius, amount);
                self.sediment += removed;
                exchange.eroded = removed;
            } else {
                let amount = cfg.deposit_factor * (self.sediment - capacity);
                let dropped = cells.deposit(pos, amount, -hdiff);
                self.sediment -= dropped;
                exchange.deposited = dropped;
            }
        } else if hdiff == 0.0 {
            exchange.stop = Some(Termination::FlatTerrain);
        } else {
            let dropped = cells.deposit(pos, self.sediment, hdiff);
            self.sediment -= dropped;
            exchange.deposited = dropped;
            if self.sediment <= 0.0 || dropped < MIN_DEPOSIT {
                exchange.stop = Some(Termination::SedimentExhausted);
            }
        }

        exchange
    }
}

/// Material moved by one step, and whether the droplet stops there.
#[derive(Debug, Default)]
struct Exchange {
    eroded: f32,
    deposited: f32,
    stop: Option<Termination>,
}

/// Drives droplets across a grid with its own seeded random generator.
pub struct DropletSimulator {
    config: ErosionConfig,
    rng: ChaCha8Rng,
}

impl DropletSimulator {
    /// Creates a simulator with a deterministic random stream.
    ///
    /// # Errors
    /// Returns the validation error if `config` is invalid.
    pub fn new(config: ErosionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    /// Launches one droplet at a uniformly random position, mutating `grid`,
    /// and returns the positions it visited.
    pub fn launch_droplet(&mut self, grid: &Grid) -> Trajectory {
        self.simulate(grid).trajectory
    }

    /// Launches one droplet at a uniformly random position.
    pub fn simulate(&mut self, grid: &Grid) -> DropletOutcome {
        let start = Vec2::new(
            self.rng.random_range(0.0..grid.width() as f32),
            self.rng.random_range(0.0..grid.height() as f32),
        );
        self.simulate_from(grid, start)
    }

    /// Launches `count` droplets one after another.
    pub fn launch_droplets(&mut self, grid: &Grid, count: usize) -> DropletBatch {
        let mut batch = DropletBatch {
            trajectories: Vec::with_capacity(count),
            stats: ErosionStats::default(),
        };
        for _ in 0..count {
            let outcome = self.simulate(grid);
            batch.stats.record(&outcome);
            batch.trajectories.push(outcome.trajectory);
        }
        debug!(
            "{} droplets: eroded {:.4}, deposited {:.4}",
            count, batch.stats.eroded, batch.stats.deposited
        );
        batch
    }

    /// Runs one droplet from `start` to completion.
    ///
    /// The grid stays write-locked for the whole run, since each step reads
    /// what the previous one wrote.
    pub fn simulate_from(&mut self, grid: &Grid, start: Vec2) -> DropletOutcome {
        let cfg = self.config.clone();
        let width = grid.width();
        let height = grid.height();
        let mut cells = grid.write();

        let mut droplet = Droplet::spawn(start);
        let mut trajectory =
            Vec::with_capacity((cfg.max_droplet_steps as usize).min(RESERVED_STEPS) + 1);
        trajectory.push(start);

        let mut eroded = 0.0f32;
        let mut deposited = 0.0f32;
        let mut steps = 0u32;
        let mut termination = Termination::StepLimit;

        for _ in 0..cfg.max_droplet_steps {
            steps += 1;
            let pos = droplet.position;
            let local_height = sample_height(cells.as_slice(), width, height, pos);
            let gradient = forward_gradient(cells.as_slice(), width, height, pos);

            let descent = match gradient.try_normalize() {
                Some(g) => -g,
                None => self.random_direction(),
            };
            let blended = cfg.inertia * droplet.direction + (1.0 - cfg.inertia) * descent;
            droplet.direction = match blended.try_normalize() {
                Some(d) => d,
                None => self.random_unit_direction(),
            };

            let next = pos + droplet.direction;
            if !in_bounds(next, width, height) {
                termination = Termination::LeftGrid;
                break;
            }
            trajectory.push(next);

            let next_height = sample_height(cells.as_slice(), width, height, next);
            let hdiff = next_height - local_height;
            trace!(
                "step {}: pos {:?} speed {:.4} hdiff {:.5} sediment {:.5}",
                steps, next, droplet.speed, hdiff, droplet.sediment
            );

            let exchange = droplet.exchange_sediment(&mut cells, &cfg, pos, hdiff);
            eroded += exchange.eroded;
            deposited += exchange.deposited;
            if let Some(reason) = exchange.stop {
                termination = reason;
                break;
            }

            droplet.speed = (droplet.speed * droplet.speed - hdiff * cfg.gravity)
                .max(0.0)
                .sqrt();
            droplet.volume *= cfg.evaporation;
            droplet.position = next;

            if droplet.volume < MIN_VOLUME {
                termination = Termination::Evaporated;
                break;
            }
        }

        debug!(
            "droplet from {:?} stopped after {} steps ({:?}), eroded {:.4}, deposited {:.4}",
            start, steps, termination, eroded, deposited
        );

        DropletOutcome {
            trajectory,
            eroded,
            deposited,
            steps,
            termination,
        }
    }

    /// Uniform draw from `[-1, 1]²`, rejecting the zero vector.
    fn random_direction(&mut self) -> Vec2 {
        loop {
            let v = Vec2::new(
                self.rng.random_range(-1.0..1.0),
                self.rng.random_range(-1.0..1.0),
            );
            if v != Vec2::ZERO {
                return v;
            }
        }
    }

    fn random_unit_direction(&mut self) -> Vec2 {
        loop {
            if let Some(v) = self.random_direction().try_normalize() {
                return v;
            }
        }
    }
}

#[inline]
fn in_bounds(p: Vec2, width: u32, height: u32) -> bool {
    p.x >= 0.0 && p.x < width as f32 && p.y >= 0.0 && p.y < height as f32
}

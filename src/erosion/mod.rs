//! Droplet-based hydraulic erosion.
//!
//! The erosion/deposition brushes live on the grid's write guard; the
//! [`DropletSimulator`] drives one droplet at a time over a shared grid.

mod config;
pub mod kernels;
mod droplet;
mod stats;

pub use config::{ConfigError, ErosionConfig};
pub use droplet::{DropletBatch, DropletOutcome, DropletSimulator, Termination, Trajectory};
pub use stats::ErosionStats;

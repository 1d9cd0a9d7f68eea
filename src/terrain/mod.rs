//! Terrain generation module.
//!
//! Turns a noise field into a fresh elevation [`Grid`](crate::grid::Grid).

mod generator;

pub use generator::TerrainGenerator;

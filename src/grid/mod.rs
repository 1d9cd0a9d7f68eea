//! Elevation grid, gradient estimation and bilinear sampling.
//!
//! The [`Grid`] is a shared-ownership handle: clones observe the same
//! samples. Sampling works on raw row-major slices so it can run inside a
//! held [`GridWrite`] guard.

mod heightmap;
mod gradient;
pub mod bilinear;

pub use heightmap::{Grid, GridError, GridRead, GridWrite};
pub use gradient::GradientField;
pub use bilinear::{sample, sample_height, forward_gradient};

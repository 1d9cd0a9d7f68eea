//! Mapping of heights onto integer sample ranges.

use thiserror::Error;

use crate::grid::Grid;

/// Raised when a height range has no extent.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("Empty height range: min ({min}) must be below max ({max})")]
pub struct EmptyRange {
    pub min: f32,
    pub max: f32,
}

/// Non-empty `[min, max]` interval of heights. Heights outside it clamp to
/// the nearest end when quantized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    min: f32,
    max: f32,
}

impl HeightRange {
    /// Accepts only `min < max` (which also rules out NaN).
    pub fn new(min: f32, max: f32) -> Result<Self, EmptyRange> {
        if min < max {
            Ok(Self { min, max })
        } else {
            Err(EmptyRange { min, max })
        }
    }

    /// The grid's own extremes. A flat grid is widened by `1e-6` so it
    /// quantizes to all zeros.
    pub fn of(grid: &Grid) -> Self {
        let (min, max) = grid.height_range();
        Self {
            min,
            max: if max > min { max } else { min + 1e-6 },
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Position of `h` within the range, in `[0, 1]`.
    #[inline]
    pub fn fraction(&self, h: f32) -> f32 {
        ((h - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn to_u16(&self, h: f32) -> u16 {
        (self.fraction(h) * u16::MAX as f32) as u16
    }

    #[inline]
    pub fn to_u8(&self, h: f32) -> u8 {
        (self.fraction(h) * u8::MAX as f32) as u8
    }
}

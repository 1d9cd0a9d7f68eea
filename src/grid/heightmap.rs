//! Shared-buffer elevation grid.

use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur when building a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero, got {0}x{1}")]
    ZeroSized(u32, u32),
    #[error("Grid data length {got} does not match {width}x{height}")]
    LengthMismatch { width: u32, height: u32, got: usize },
}

/// A `width × height` grid of elevation samples stored in row-major order.
///
/// Cloning a `Grid` does not copy the samples: every clone is a handle onto
/// the same buffer, so a write through one handle is visible through all of
/// them. The buffer is freed when the last handle is dropped. Use
/// [`Grid::deep_clone`] for an independent copy.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Arc<RwLock<Vec<f32>>>,
}

impl Grid {
    /// Creates a zero-filled grid.
    ///
    /// # Errors
    /// Returns [`GridError::ZeroSized`] if either dimension is 0.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized(width, height));
        }
        let size = (width as usize) * (height as usize);
        Ok(Self::wrap(width, height, vec![0.0; size]))
    }

    /// Creates a grid over existing row-major samples.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSized(width, height));
        }
        if data.len() != (width as usize) * (height as usize) {
            return Err(GridError::LengthMismatch {
                width,
                height,
                got: data.len(),
            });
        }
        Ok(Self::wrap(width, height, data))
    }

    fn wrap(width: u32, height: u32, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            cells: Arc::new(RwLock::new(data)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Copies the samples into a new, unshared grid.
    pub fn deep_clone(&self) -> Self {
        Self::wrap(self.width, self.height, self.read().as_slice().to_vec())
    }

    /// Number of live handles sharing this buffer.
    pub fn owner_count(&self) -> usize {
        Arc::strong_count(&self.cells)
    }

    /// Returns true if both handles point at the same buffer.
    pub fn shares_buffer_with(&self, other: &Grid) -> bool {
        Arc::ptr_eq(&self.cells, &other.cells)
    }

    /// Locks the buffer for reading.
    pub fn read(&self) -> GridRead<'_> {
        GridRead {
            width: self.width,
            height: self.height,
            cells: self.cells.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Locks the buffer for writing.
    ///
    /// Holding the guard blocks every other handle; keep it for the length
    /// of one operation (one droplet, one kernel application).
    pub fn write(&self) -> GridWrite<'_> {
        GridWrite {
            width: self.width,
            height: self.height,
            cells: self.cells.write().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Returns the sample at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.read().at(x, y)
    }

    /// Overwrites the sample at `(x, y)`.
    pub fn set(&self, x: u32, y: u32, value: f32) {
        *self.write().at_mut(x, y) = value;
    }

    /// Snapshot of the current samples.
    pub fn to_vec(&self) -> Vec<f32> {
        self.read().as_slice().to_vec()
    }

    /// Returns (min, max) over all samples.
    pub fn height_range(&self) -> (f32, f32) {
        self.read()
            .as_slice()
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    fn map_rows<F>(&self, op: F)
    where
        F: Fn(&mut f32) + Sync,
    {
        let width = self.width as usize;
        let mut cells = self.write();
        cells.as_mut_slice().par_chunks_mut(width).for_each(|row| {
            row.iter_mut().for_each(&op);
        });
    }
}

impl MulAssign<f32> for Grid {
    fn mul_assign(&mut self, value: f32) {
        self.map_rows(|h| *h *= value);
    }
}

impl DivAssign<f32> for Grid {
    fn div_assign(&mut self, value: f32) {
        self.map_rows(|h| *h /= value);
    }
}

impl AddAssign<f32> for Grid {
    fn add_assign(&mut self, value: f32) {
        self.map_rows(|h| *h += value);
    }
}

impl SubAssign<f32> for Grid {
    fn sub_assign(&mut self, value: f32) {
        self.map_rows(|h| *h -= value);
    }
}

/// Read access to a grid's samples.
pub struct GridRead<'a> {
    width: u32,
    height: u32,
    cells: RwLockReadGuard<'a, Vec<f32>>,
}

impl GridRead<'_> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sample at `(x, y)`. The caller guarantees the index is valid.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.cells[(y as usize) * (self.width as usize) + x as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.cells
    }
}

/// Write access to a grid's samples.
///
/// The erosion and deposition kernels are implemented on this guard (see
/// `erosion::kernels`) so a droplet can hold one lock for its whole run.
pub struct GridWrite<'a> {
    width: u32,
    height: u32,
    cells: RwLockWriteGuard<'a, Vec<f32>>,
}

impl GridWrite<'_> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.cells[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Returns a mutable reference to the sample at `(x, y)`.
    /// The caller guarantees the index is valid.
    #[inline]
    pub fn at_mut(&mut self, x: u32, y: u32) -> &mut f32 {
        debug_assert!(x < self.width && y < self.height);
        let width = self.width as usize;
        &mut self.cells[(y as usize) * width + x as usize]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation_zero_filled() {
        let grid = Grid::new(8, 4).unwrap();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.cell_count(), 32);
        assert!(grid.to_vec().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_zero_sized_grid_rejected() {
        assert_eq!(Grid::new(0, 16).unwrap_err(), GridError::ZeroSized(0, 16));
        assert_eq!(Grid::new(16, 0).unwrap_err(), GridError::ZeroSized(16, 0));
        assert!(Grid::from_vec(0, 0, Vec::new()).is_err());
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = Grid::from_vec(3, 3, vec![0.0; 8]).unwrap_err();
        assert_eq!(
            err,
            GridError::LengthMismatch {
                width: 3,
                height: 3,
                got: 8
            }
        );
    }

    #[test]
    fn test_get_set_row_major() {
        let grid = Grid::new(4, 3).unwrap();
        grid.set(3, 1, 2.5);
        assert_eq!(grid.get(3, 1), 2.5);
        assert_eq!(grid.to_vec()[1 * 4 + 3], 2.5);
    }

    #[test]
    fn test_clone_shares_buffer() {
        let original = Grid::new(4, 4).unwrap();
        let copy = original.clone();
        copy.set(2, 2, 7.0);

        assert_eq!(original.get(2, 2), 7.0);
        assert!(original.shares_buffer_with(&copy));
        assert_eq!(original.owner_count(), 2);
    }

    #[test]
    fn test_buffer_released_after_last_owner() {
        let original = Grid::new(2, 2).unwrap();
        let weak = Arc::downgrade(&original.cells);
        let copy = original.clone();

        drop(original);
        assert!(weak.upgrade().is_some());
        assert_eq!(copy.owner_count(), 1);

        drop(copy);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = Grid::new(4, 4).unwrap();
        original.set(1, 1, 3.0);
        let copy = original.deep_clone();
        copy.set(1, 1, -1.0);

        assert_eq!(original.get(1, 1), 3.0);
        assert!(!original.shares_buffer_with(&copy));
        assert_eq!(original.owner_count(), 1);
    }

    #[test]
    fn test_scalar_operators_apply_to_every_cell() {
        let mut grid = Grid::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let view = grid.clone();

        grid += 1.0;
        grid *= 2.0;
        grid -= 4.0;
        grid /= 2.0;

        assert_eq!(view.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_height_range() {
        let grid = Grid::from_vec(2, 2, vec![0.5, -1.0, 3.0, 2.0]).unwrap();
        assert_eq!(grid.height_range(), (-1.0, 3.0));
    }
}

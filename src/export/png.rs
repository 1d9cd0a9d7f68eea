//! 16-bit grayscale PNG heightmaps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use super::range::HeightRange;
use crate::grid::Grid;

#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Writes `grid` as an L16 PNG, one pixel per cell.
///
/// Heights are mapped through `range`, or through the grid's own extremes
/// when `range` is `None`.
pub fn export_grid_png(
    grid: &Grid,
    path: &Path,
    range: Option<HeightRange>,
) -> Result<(), PngExportError> {
    let range = range.unwrap_or_else(|| HeightRange::of(grid));
    let samples: Vec<u16> = grid.read().as_slice().iter().map(|&h| range.to_u16(h)).collect();

    let writer = BufWriter::new(File::create(path)?);
    // PngEncoder wants native-endian L16 samples and swaps them itself.
    PngEncoder::new(writer).write_image(
        bytemuck::cast_slice::<u16, u8>(&samples),
        grid.width(),
        grid.height(),
        ExtendedColorType::L16,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp_grid(width: u32, height: u32) -> Grid {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x + y) as f32))
            .collect();
        Grid::from_vec(width, height, data).unwrap()
    }

    #[test]
    fn test_png_uses_full_range_by_default() {
        let grid = ramp_grid(64, 32);
        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.png");

        export_grid_png(&grid, &path, None).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.dimensions(), (64, 32));
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(63, 31)[0], 65535);
        assert!(img.get_pixel(40, 10)[0] > img.get_pixel(39, 10)[0]);
    }

    #[test]
    fn test_png_with_fixed_range_clamps() {
        let grid = ramp_grid(8, 8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("clamped.png");

        let range = HeightRange::new(2.0, 4.0).unwrap();
        export_grid_png(&grid, &path, Some(range)).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(1, 0)[0], 0);
        assert_eq!(img.get_pixel(4, 0)[0], 65535);
        assert_eq!(img.get_pixel(7, 7)[0], 65535);
    }

    #[test]
    fn test_flat_grid_exports_black() {
        let grid = Grid::new(4, 4).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.png");

        export_grid_png(&grid, &path, None).unwrap();
        let img = image::open(&path).unwrap().to_luma16();
        assert!(img.pixels().all(|p| p[0] == 0));
    }
}

//! Headerless RAW heightmaps, as read by terrain tools and game engines.

use std::path::Path;
use thiserror::Error;

use super::range::HeightRange;
use crate::grid::{Grid, GridError};

#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RAW file is {got} bytes, expected {expected}")]
    SizeMismatch { got: u64, expected: u64 },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Sample layout of a RAW file. Rows are stored top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// Quantized `u16`, little-endian.
    #[default]
    R16LittleEndian,
    /// Quantized `u16`, big-endian.
    R16BigEndian,
    /// Unquantized `f32`, little-endian.
    R32Float,
}

impl RawFormat {
    pub fn bytes_per_sample(self) -> u64 {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => 2,
            RawFormat::R32Float => 4,
        }
    }
}

/// Writes `grid` to `path` in the given layout.
///
/// The 16-bit layouts quantize through `range`, falling back to the grid's
/// own extremes. `R32Float` stores heights as they are and ignores `range`.
pub fn export_grid_raw(
    grid: &Grid,
    path: &Path,
    format: RawFormat,
    range: Option<HeightRange>,
) -> Result<(), RawExportError> {
    let range = range.unwrap_or_else(|| HeightRange::of(grid));
    let cells = grid.read();
    let heights = cells.as_slice();

    let bytes: Vec<u8> = match format {
        RawFormat::R16LittleEndian => heights
            .iter()
            .flat_map(|&h| range.to_u16(h).to_le_bytes())
            .collect(),
        RawFormat::R16BigEndian => heights
            .iter()
            .flat_map(|&h| range.to_u16(h).to_be_bytes())
            .collect(),
        RawFormat::R32Float => heights.iter().flat_map(|h| h.to_le_bytes()).collect(),
    };
    drop(cells);

    std::fs::write(path, bytes)?;
    Ok(())
}

/// Reads an `R32Float` file back into a new `width × height` grid.
pub fn import_grid_raw_f32(path: &Path, width: u32, height: u32) -> Result<Grid, RawExportError> {
    let bytes = std::fs::read(path)?;
    let expected = expected_file_size(width, height, RawFormat::R32Float);
    if bytes.len() as u64 != expected {
        return Err(RawExportError::SizeMismatch {
            got: bytes.len() as u64,
            expected,
        });
    }

    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok(Grid::from_vec(width, height, data)?)
}

pub fn expected_file_size(width: u32, height: u32, format: RawFormat) -> u64 {
    width as u64 * height as u64 * format.bytes_per_sample()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sizes_match_format() {
        let grid = Grid::new(64, 32).unwrap();
        let dir = tempdir().unwrap();

        for format in [RawFormat::R16LittleEndian, RawFormat::R16BigEndian, RawFormat::R32Float] {
            let path = dir.path().join("test.raw");
            export_grid_raw(&grid, &path, format, None).unwrap();
            let len = std::fs::metadata(&path).unwrap().len();
            assert_eq!(len, expected_file_size(64, 32, format));
        }
    }

    #[test]
    fn test_r16_byte_order() {
        let grid = Grid::from_vec(2, 2, vec![-1.0, 0.0, 0.5, 1.0]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.raw");
        let range = HeightRange::new(-1.0, 1.0).unwrap();

        export_grid_raw(&grid, &path, RawFormat::R16LittleEndian, Some(range)).unwrap();
        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 8);
        assert_eq!(u16::from_le_bytes([data[0], data[1]]), 0);
        let mid = u16::from_le_bytes([data[2], data[3]]);
        assert!((mid as i32 - 32767).abs() < 2);
        assert_eq!(u16::from_le_bytes([data[6], data[7]]), 65535);

        export_grid_raw(&grid, &path, RawFormat::R16BigEndian, Some(range)).unwrap();
        let data = std::fs::read(&path).unwrap();
        assert_eq!(u16::from_be_bytes([data[0], data[1]]), 0);
        assert_eq!(u16::from_be_bytes([data[6], data[7]]), 65535);
    }

    #[test]
    fn test_float_raw_reimport() {
        let grid = Grid::from_vec(3, 2, vec![0.0, 1.5, -2.25, 3.0, 1e-3, 75.0]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.r32");

        export_grid_raw(&grid, &path, RawFormat::R32Float, None).unwrap();
        let loaded = import_grid_raw_f32(&path, 3, 2).unwrap();
        assert_eq!(loaded.to_vec(), grid.to_vec());

        assert!(matches!(
            import_grid_raw_f32(&path, 4, 4),
            Err(RawExportError::SizeMismatch { got: 24, expected: 64 })
        ));
    }
}

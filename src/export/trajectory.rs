//! Trajectory map export for visualizing droplet paths over the terrain.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Rgb};
use thiserror::Error;

use super::range::HeightRange;
use crate::erosion::Trajectory;
use crate::grid::Grid;

/// Errors that can occur during trajectory map export.
#[derive(Error, Debug)]
pub enum TrajectoryMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Options for trajectory map export.
#[derive(Debug, Clone)]
pub struct TrajectoryMapOptions {
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
    /// Half-width of the cross drawn at each trajectory point, in pixels.
    pub marker_radius: u32,
}

impl Default for TrajectoryMapOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
            marker_radius: 1,
        }
    }
}

/// Color for the `index`-th of `len` trajectory points, fading from red
/// at the spawn point to blue at the end.
pub fn trajectory_color(index: usize, len: usize) -> [u8; 3] {
    let t = if len == 0 { 0.0 } else { index as f32 / len as f32 };
    let t = t.clamp(0.0, 1.0);
    [((1.0 - t) * 255.0) as u8, 0, (t * 255.0) as u8]
}

fn put_marker(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    cx: i64,
    cy: i64,
    radius: i64,
    color: [u8; 3],
) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for d in -radius..=radius {
        for (x, y) in [(cx + d, cy), (cx, cy + d)] {
            if x >= 0 && y >= 0 && x < w && y < h {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}

/// Renders the grid as grayscale with every trajectory drawn on top.
pub fn render_trajectory_map(
    grid: &Grid,
    trajectories: &[Trajectory],
    options: &TrajectoryMapOptions,
) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    let width = grid.width();
    let height = grid.height();
    let range = HeightRange::of(grid);

    let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    {
        let cells = grid.read();
        for y in 0..height {
            for x in 0..width {
                let v = range.to_u8(cells.at(x, y));
                img.put_pixel(x, y, Rgb([v, v, v]));
            }
        }
    }

    let radius = options.marker_radius as i64;
    for trajectory in trajectories {
        let len = trajectory.len();
        for (i, p) in trajectory.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                continue;
            }
            let color = trajectory_color(i, len);
            put_marker(&mut img, p.x.floor() as i64, p.y.floor() as i64, radius, color);
        }
    }

    img
}

/// Exports a trajectory overlay as an RGB PNG.
pub fn export_trajectory_map(
    grid: &Grid,
    trajectories: &[Trajectory],
    path: &Path,
    options: &TrajectoryMapOptions,
) -> Result<(), TrajectoryMapError> {
    let img = render_trajectory_map(grid, trajectories, options);

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);
    encoder.write_image(img.as_raw(), img.width(), img.height(), image::ExtendedColorType::Rgb8)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tempfile::tempdir;

    #[test]
    fn test_trajectory_color_gradient() {
        assert_eq!(trajectory_color(0, 4), [255, 0, 0]);
        assert_eq!(trajectory_color(2, 4), [127, 0, 127]);
        let last = trajectory_color(3, 4);
        assert!(last[2] > last[0]);
        assert_eq!(trajectory_color(0, 0), [255, 0, 0]);
    }

    #[test]
    fn test_render_marks_points_over_grayscale() {
        let grid = Grid::from_vec(8, 8, (0..64).map(|i| i as f32).collect()).unwrap();
        let trajectories = vec![vec![Vec2::new(2.5, 2.5), Vec2::new(5.2, 5.9)]];
        let options = TrajectoryMapOptions::default();

        let img = render_trajectory_map(&grid, &trajectories, &options);

        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(7, 7).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(2, 2).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(3, 2).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(5, 5).0, [127, 0, 127]);
        // Untouched diagonal neighbor stays gray.
        let p = img.get_pixel(3, 3).0;
        assert_eq!(p[0], p[1]);
    }

    #[test]
    fn test_markers_clip_at_edges() {
        let grid = Grid::new(4, 4).unwrap();
        let trajectories = vec![vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(-3.0, 1.0),
            Vec2::new(f32::NAN, 1.0),
        ]];
        let img = render_trajectory_map(&grid, &trajectories, &TrajectoryMapOptions::default());
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_export_trajectory_map() {
        let grid = Grid::new(16, 16).unwrap();
        let trajectories = vec![vec![Vec2::new(8.0, 8.0)]];
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectories.png");

        export_trajectory_map(&grid, &trajectories, &path, &TrajectoryMapOptions::default())
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 16));
        assert_eq!(img.get_pixel(8, 8).0, [255, 0, 0]);
    }
}

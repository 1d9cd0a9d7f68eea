//! Wavefront OBJ mesh export for heightmaps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::grid::Grid;

/// Vertical exaggeration applied to heights in the mesh.
pub const OBJ_HEIGHT_SCALE: f32 = 10.0;

/// Errors that can occur during OBJ export.
#[derive(Error, Debug)]
pub enum ObjExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the grid as a single triangulated OBJ object.
///
/// One vertex per cell at `(x, y, h * OBJ_HEIGHT_SCALE)`, with a normal
/// of `(-dx, -dy, 1)` taken from the grid gradient and a texture
/// coordinate of `(x / width, y / height)`. Each quad between four
/// neighboring cells becomes two triangles. Indices are 1-based.
pub fn write_obj<W: Write>(grid: &Grid, writer: W) -> Result<(), ObjExportError> {
    let mut out = BufWriter::new(writer);
    let width = grid.width();
    let height = grid.height();
    let gradient = grid.compute_gradient();
    let cells = grid.read();

    writeln!(out, "o terrain")?;

    for y in 0..height {
        for x in 0..width {
            writeln!(out, "v {} {} {}", x, y, cells.at(x, y) * OBJ_HEIGHT_SCALE)?;
        }
    }
    drop(cells);

    for y in 0..height {
        for x in 0..width {
            let [dx, dy] = gradient.at(x, y);
            writeln!(out, "vn {} {} 1.0", -dx, -dy)?;
        }
    }

    for y in 0..height {
        for x in 0..width {
            writeln!(
                out,
                "vt {} {}",
                x as f32 / width as f32,
                y as f32 / height as f32
            )?;
        }
    }

    let w = width as u64;
    for y in 0..height.saturating_sub(1) as u64 {
        for x in 0..width.saturating_sub(1) as u64 {
            let top_left = x + y * w + 1;
            let top_right = top_left + 1;
            let bottom_left = x + (y + 1) * w + 1;
            let bottom_right = bottom_left + 1;
            writeln!(out, "f {} {} {}", top_left, bottom_left, top_right)?;
            writeln!(out, "f {} {} {}", top_right, bottom_left, bottom_right)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Exports the grid as an OBJ file at `path`.
pub fn export_grid_obj(grid: &Grid, path: &Path) -> Result<(), ObjExportError> {
    let file = File::create(path)?;
    write_obj(grid, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lines_with_prefix<'a>(text: &'a str, prefix: &str) -> Vec<&'a str> {
        text.lines()
            .filter(|l| l.split_whitespace().next() == Some(prefix))
            .collect()
    }

    #[test]
    fn test_obj_element_counts() {
        let grid = Grid::new(4, 3).unwrap();
        let mut buf = Vec::new();
        write_obj(&grid, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.lines().next(), Some("o terrain"));
        assert_eq!(lines_with_prefix(&text, "v").len(), 12);
        assert_eq!(lines_with_prefix(&text, "vn").len(), 12);
        assert_eq!(lines_with_prefix(&text, "vt").len(), 12);
        assert_eq!(lines_with_prefix(&text, "f").len(), 2 * 3 * 2);
    }

    #[test]
    fn test_obj_face_winding_and_indices() {
        let grid = Grid::new(3, 2).unwrap();
        let mut buf = Vec::new();
        write_obj(&grid, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let faces = lines_with_prefix(&text, "f");
        assert_eq!(faces, vec!["f 1 4 2", "f 2 4 5", "f 2 5 3", "f 3 5 6"]);
    }

    #[test]
    fn test_obj_vertices_scaled_and_normals_from_gradient() {
        let grid = Grid::from_vec(2, 1, vec![0.0, 0.5]).unwrap();
        let mut buf = Vec::new();
        write_obj(&grid, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(lines_with_prefix(&text, "v"), vec!["v 0 0 0", "v 1 0 5"]);
        assert_eq!(
            lines_with_prefix(&text, "vn"),
            vec!["vn -0.5 -0 1.0", "vn -0.5 -0 1.0"]
        );
        assert_eq!(lines_with_prefix(&text, "vt"), vec!["vt 0 0", "vt 0.5 0"]);
        assert!(lines_with_prefix(&text, "f").is_empty());
    }

    #[test]
    fn test_export_grid_obj_file() {
        let grid = Grid::new(8, 8).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.obj");

        export_grid_obj(&grid, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(lines_with_prefix(&text, "v").len(), 64);
        assert_eq!(lines_with_prefix(&text, "f").len(), 98);
    }
}

//! Per-cell finite-difference gradient of a grid.

use rayon::prelude::*;

use super::heightmap::Grid;

/// Two-channel (dx, dy) field with the same dimensions as its source grid.
///
/// Channels are interleaved, so the field can be fed straight into
/// [`sample`](super::bilinear::sample) with `C = 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl GradientField {
    /// Returns `[dx, dy]` at `(x, y)`.
    pub fn at(&self, x: u32, y: u32) -> [f32; 2] {
        let i = 2 * ((y as usize) * (self.width as usize) + x as usize);
        [self.data[i], self.data[i + 1]]
    }
}

impl Grid {
    /// Computes the finite-difference gradient for every cell.
    ///
    /// Interior cells use forward differences to their right and bottom
    /// neighbors. The last column falls back to a backward difference in x.
    /// The last row takes a backward difference in y and reuses the dx of
    /// the row above it. The bottom-right
    /// corner copies dx from its left neighbor and dy from its top neighbor.
    /// Along a dimension of size 1 the derivative is zero.
    pub fn compute_gradient(&self) -> GradientField {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let cells = self.read();
        let h = cells.as_slice();

        let mut data = vec![0.0f32; width * height * 2];

        data.par_chunks_mut(2 * width)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let i = y * width + x;
                    let dx = if width < 2 {
                        0.0
                    } else if x + 1 < width {
                        if y + 1 == height && height >= 2 {
                            h[i - width + 1] - h[i - width]
                        } else {
                            h[i + 1] - h[i]
                        }
                    } else {
                        h[i] - h[i - 1]
                    };
                    let dy = if height < 2 {
                        0.0
                    } else if y + 1 < height {
                        h[i + width] - h[i]
                    } else {
                        h[i] - h[i - width]
                    };
                    row[2 * x] = dx;
                    row[2 * x + 1] = dy;
                }
            });

        if width >= 2 && height >= 2 {
            let last = width * height - 1;
            data[2 * last] = data[2 * (last - 1)];
            data[2 * last + 1] = data[2 * (last - width) + 1];
        }

        GradientField {
            width: self.width(),
            height: self.height(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32, sx: f32, sy: f32) -> Grid {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| x as f32 * sx + y as f32 * sy))
            .collect();
        Grid::from_vec(width, height, data).unwrap()
    }

    #[test]
    fn test_gradient_of_linear_ramp_is_constant() {
        let grid = ramp(5, 4, 2.0, -0.5);
        let field = grid.compute_gradient();

        assert_eq!(field.data.len(), 5 * 4 * 2);
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(field.at(x, y), [2.0, -0.5], "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_gradient_edge_policy() {
        // 3x3 with distinct second differences so each edge rule is visible.
        let grid = Grid::from_vec(
            3,
            3,
            vec![
                0.0, 1.0, 3.0, //
                0.0, 2.0, 6.0, //
                1.0, 4.0, 10.0,
            ],
        )
        .unwrap();
        let field = grid.compute_gradient();

        // Interior: forward in both axes.
        assert_eq!(field.at(0, 0), [1.0, 0.0]);
        assert_eq!(field.at(1, 1), [4.0, 2.0]);
        // Last column: backward dx, forward dy.
        assert_eq!(field.at(2, 0), [2.0, 3.0]);
        // Last row: dx from the row above, backward dy.
        assert_eq!(field.at(0, 2), [2.0, 1.0]);
        assert_eq!(field.at(1, 2), [4.0, 2.0]);
        // Corner replicates its neighbors.
        assert_eq!(field.at(2, 1), [4.0, 4.0]);
        assert_eq!(field.at(2, 2), [4.0, 4.0]);
    }

    #[test]
    fn test_gradient_single_row() {
        let grid = Grid::from_vec(3, 1, vec![1.0, 2.0, 4.0]).unwrap();
        let field = grid.compute_gradient();
        assert_eq!(field.at(0, 0), [1.0, 0.0]);
        assert_eq!(field.at(2, 0), [2.0, 0.0]);
    }

    #[test]
    fn test_gradient_bottom_row_ignores_own_row_dx() {
        // Only the bottom row varies in x; its dx still comes from row 0.
        let grid = Grid::from_vec(3, 2, vec![0.0, 0.0, 0.0, 0.0, 5.0, 20.0]).unwrap();
        let field = grid.compute_gradient();
        assert_eq!(field.at(0, 1), [0.0, 0.0]);
        assert_eq!(field.at(1, 1), [0.0, 5.0]);
        assert_eq!(field.at(2, 1), [0.0, 20.0]);
    }

    #[test]
    fn test_gradient_single_cell() {
        let grid = Grid::from_vec(1, 1, vec![5.0]).unwrap();
        assert_eq!(grid.compute_gradient().at(0, 0), [0.0, 0.0]);
    }
}

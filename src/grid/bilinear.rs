//! Continuous-coordinate bilinear sampling over interleaved grids.

use glam::Vec2;

/// Margin kept between a clamped coordinate and the last cell index.
const EDGE_EPSILON: f32 = 1e-4;

/// Samples `C` interleaved channels at a continuous coordinate.
///
/// `data` holds `width * height * C` values in row-major order. Points outside
/// `[0, width) × [0, height)` yield all zeros. Inside the grid, coordinates past
/// the last cell center are pulled back by a small epsilon so the forward
/// neighbor stays in range.
///
/// # Arguments
/// * `data` - Interleaved samples
/// * `width`, `height` - Grid dimensions in cells
/// * `point` - Position in grid space
pub fn sample<const C: usize>(data: &[f32], width: u32, height: u32, point: Vec2) -> [f32; C] {
    let w = width as f32;
    let h = height as f32;
    if !(point.x >= 0.0 && point.x < w && point.y >= 0.0 && point.y < h) {
        return [0.0; C];
    }

    let mut p = point;
    if p.x > w - 1.0 {
        p.x = (w - 1.0 - EDGE_EPSILON).max(0.0);
    }
    if p.y > h - 1.0 {
        p.y = (h - 1.0 - EDGE_EPSILON).max(0.0);
    }

    let x_left = p.x as usize;
    let y_top = p.y as usize;
    let x_right = (x_left + 1).min(width as usize - 1);
    let y_bottom = (y_top + 1).min(height as usize - 1);

    let fx = p.x - x_left as f32;
    let fy = p.y - y_top as f32;

    let row = width as usize;
    let idx = |x: usize, y: usize, c: usize| C * (y * row + x) + c;

    let mut out = [0.0f32; C];
    for (c, value) in out.iter_mut().enumerate() {
        let top = data[idx(x_left, y_top, c)] * (1.0 - fx) + data[idx(x_right, y_top, c)] * fx;
        let bottom =
            data[idx(x_left, y_bottom, c)] * (1.0 - fx) + data[idx(x_right, y_bottom, c)] * fx;
        *value = top * (1.0 - fy) + bottom * fy;
    }
    out
}

/// Single-channel shortcut for elevation lookups.
#[inline]
pub fn sample_height(data: &[f32], width: u32, height: u32, point: Vec2) -> f32 {
    sample::<1>(data, width, height, point)[0]
}

/// Forward-difference gradient at a continuous point: the samples one unit
/// to the right and one unit below, minus the local sample.
///
/// Near the right/bottom edge the forward sample falls outside the grid and
/// reads as zero.
pub fn forward_gradient(data: &[f32], width: u32, height: u32, point: Vec2) -> Vec2 {
    let local = sample_height(data, width, height, point);
    let right = sample_height(data, width, height, point + Vec2::X);
    let below = sample_height(data, width, height, point + Vec2::Y);
    Vec2::new(right - local, below - local)
}

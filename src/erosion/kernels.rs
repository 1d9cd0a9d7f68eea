//! Erosion and deposition brushes applied to a locked grid.

use std::f32::consts::PI;

use glam::Vec2;

use crate::grid::{Grid, GridWrite};

/// Weights below this are not deposited at all.
pub const MIN_DEPOSIT: f32 = 1e-5;

/// Converts a signed cell coordinate into an index if it lies in `[0, len)`.
#[inline]
fn cell_index(c: i64, len: u32) -> Option<u32> {
    if c >= 0 && c < len as i64 {
        Some(c as u32)
    } else {
        None
    }
}

/// Visits every lattice point within `radius` of `center` whose coordinates
/// fall inside the inclusive `(x_lo, x_hi, y_lo, y_hi)` window, passing the
/// cone falloff `(radius - d) / radius`.
fn for_each_in_disk<F>(center: Vec2, radius: f32, window: (i64, i64, i64, i64), mut visit: F)
where
    F: FnMut(i64, i64, f32),
{
    let (x_lo, x_hi, y_lo, y_hi) = window;
    let r2 = radius * radius;
    let x_min = ((center.x - radius).floor() as i64).max(x_lo);
    let x_max = ((center.x + radius).floor() as i64).min(x_hi);

    for x in x_min..=x_max {
        let dx = x as f32 - center.x;
        let dx2 = dx * dx;
        if dx2 > r2 {
            continue;
        }
        let span = (r2 - dx2).sqrt();
        let y_min = ((center.y - span).floor() as i64).max(y_lo);
        let y_max = ((center.y + span).floor() as i64).min(y_hi);

        for y in y_min..=y_max {
            let dy = y as f32 - center.y;
            let distance = (dx2 + dy * dy).sqrt();
            if distance > radius {
                continue;
            }
            visit(x, y, (radius - distance) / radius);
        }
    }
}

impl GridWrite<'_> {
    /// Removes material with a cone-shaped brush centered on `center`.
    ///
    /// Every cell whose center lies within `radius` loses
    /// `weight * (radius - d) / (radius * norm)`, where `norm` is the cone
    /// volume `0.33·π·r²`, or the discrete brush mass when the lattice
    /// over-samples the cone. Cells outside the grid still count toward
    /// `norm`, so their share is lost rather than redistributed.
    ///
    /// Returns the total amount removed, which never exceeds `weight`.
    pub fn apply_erosion(&mut self, center: Vec2, radius: f32, weight: f32) -> f32 {
        if radius.is_nan() || weight.is_nan() || radius <= 0.0 || weight <= 0.0 {
            return 0.0;
        }

        let r2 = radius * radius;
        let everywhere = (i64::MIN, i64::MAX, i64::MIN, i64::MAX);
        let mut mass = 0.0f32;
        for_each_in_disk(center, radius, everywhere, |_, _, falloff| mass += falloff);

        let norm = (0.33 * PI * r2).max(mass);
        let inside = (0, self.width() as i64 - 1, 0, self.height() as i64 - 1);
        let mut removed = 0.0f32;
        for_each_in_disk(center, radius, inside, |x, y, falloff| {
            let amount = weight * falloff / norm;
            *self.at_mut(x as u32, y as u32) -= amount;
            removed += amount;
        });
        removed
    }

    /// Spreads `weight` over the four cells around `center` with bilinear
    /// corner weights, each contribution capped at `cap`.
    ///
    /// Out-of-grid corners are skipped. Returns the amount actually added,
    /// which is at most `weight`.
    pub fn deposit(&mut self, center: Vec2, weight: f32, cap: f32) -> f32 {
        if weight.is_nan() || weight < MIN_DEPOSIT {
            return 0.0;
        }

        let fx0 = center.x.floor();
        let fy0 = center.y.floor();
        let fx = center.x - fx0;
        let fy = center.y - fy0;
        let x0 = fx0 as i64;
        let y0 = fy0 as i64;

        let corners = [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ];

        let mut deposited = 0.0f32;
        for (x, y, corner) in corners {
            let (Some(cx), Some(cy)) = (cell_index(x, self.width()), cell_index(y, self.height()))
            else {
                continue;
            };
            let value = (weight * corner).min(cap).max(0.0);
            *self.at_mut(cx, cy) += value;
            deposited += value;
        }
        deposited
    }
}

impl Grid {
    /// Locks the grid and applies [`GridWrite::apply_erosion`].
    pub fn apply_erosion(&self, center: Vec2, radius: f32, weight: f32) -> f32 {
        self.write().apply_erosion(center, radius, weight)
    }

    /// Locks the grid and applies [`GridWrite::deposit`].
    pub fn deposit(&self, center: Vec2, weight: f32, cap: f32) -> f32 {
        self.write().deposit(center, weight, cap)
    }
}

// Reads background appearance from the canvas: one pixel, or a clipped square mean.
// Never fails: with no canvas (or nothing to average) the answer is opaque white.

use crate::canvas::Canvas;
use crate::types::{Color, Point};

/// Neighborhood radius used when a scratch stroke fixes its color.
pub const DEFAULT_PATTERN_RADIUS: u32 = 10;

/// Color at `point`; opaque white if there is no canvas or the point is off-canvas.
pub fn sample_color(canvas: Option<&Canvas>, point: Point) -> Color {
    canvas
        .and_then(|c| c.pixel(point.x, point.y))
        .unwrap_or(Color::WHITE)
}

/// Per-channel truncated mean over `[x-r, x+r) × [y-r, y+r)` ∩ canvas.
/// The denominator is the clipped pixel count, never `(2r)²`.
pub fn sample_pattern(canvas: Option<&Canvas>, point: Point, radius: u32) -> Color {
    let Some(canvas) = canvas else {
        return Color::WHITE;
    };

    // Clip first; all arithmetic in i64 so huge radii can't overflow.
    let r = radius as i64;
    let x0 = (point.x as i64 - r).max(0);
    let y0 = (point.y as i64 - r).max(0);
    let x1 = (point.x as i64 + r).min(canvas.width() as i64);
    let y1 = (point.y as i64 + r).min(canvas.height() as i64);
    if x0 >= x1 || y0 >= y1 {
        log::debug!(
            "empty sample neighborhood at ({}, {}) r={}; using white",
            point.x, point.y, radius
        );
        return Color::WHITE;
    }

    let img = canvas.as_image();
    let mut sum = [0u64; 4];
    for y in y0..y1 {
        for x in x0..x1 {
            let px = img.get_pixel(x as u32, y as u32);
            for (acc, &v) in sum.iter_mut().zip(px.0.iter()) {
                *acc += v as u64;
            }
        }
    }

    let n = ((x1 - x0) * (y1 - y0)) as u64;
    Color::rgba(
        (sum[0] / n) as u8,
        (sum[1] / n) as u8,
        (sum[2] / n) as u8,
        (sum[3] / n) as u8,
    )
}

// The only code allowed to write canvas pixels.
// Two operations: source-over a prepared sprite, and rasterize an opaque thick line.

use super::{Canvas, Sprite};
use crate::types::{Color, Point};

/// Standard source-over for straight alpha:
/// out = src·a + dst·(1−a), out_alpha = a + dst_alpha·(1−a).
#[inline]
fn source_over(dst: Color, src: Color) -> Color {
    let a = src.a as u32;
    if a == 0 {
        return dst;
    }
    if a == 255 {
        return src;
    }
    let inv = 255 - a;
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
    let out_a = a + (dst.a as u32 * inv + 127) / 255;
    Color::rgba(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), out_a.min(255) as u8)
}

/// Alpha-composite `sprite` with its top-left at `position`.
/// Sprite pixels that land outside the canvas are skipped.
pub fn composite_sprite(canvas: &mut Canvas, sprite: &Sprite, position: Point) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);

    // Clip the sprite rectangle against the canvas once, then walk only the overlap.
    let x0 = (position.x as i64).max(0);
    let y0 = (position.y as i64).max(0);
    let x1 = (position.x as i64 + sprite.width() as i64).min(cw);
    let y1 = (position.y as i64 + sprite.height() as i64).min(ch);
    if x0 >= x1 || y0 >= y1 {
        log::debug!("sprite at ({}, {}) lies fully off-canvas", position.x, position.y);
        return;
    }

    for y in y0..y1 {
        for x in x0..x1 {
            let sx = (x - position.x as i64) as u32;
            let sy = (y - position.y as i64) as u32;
            let src = sprite.pixel(sx, sy);
            if src.a == 0 {
                continue;
            }
            let dst = canvas.image.get_pixel_mut(x as u32, y as u32);
            *dst = source_over(Color::from_pixel(dst), src).to_pixel();
        }
    }
}

/// Square brush of side `width` centered on (cx,cy), clipped to the canvas.
fn stamp_brush(canvas: &mut Canvas, cx: i64, cy: i64, width: u32, color: Color) {
    let lo = -(width as i64 / 2);
    let hi = lo + width as i64;
    let x0 = (cx + lo).max(0);
    let y0 = (cy + lo).max(0);
    let x1 = (cx + hi).min(canvas.width() as i64);
    let y1 = (cy + hi).min(canvas.height() as i64);
    let pixel = color.to_pixel();
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.image.put_pixel(x as u32, y as u32, pixel);
        }
    }
}

/// Liang-Barsky: the part of the segment a→b inside `[min, max]` (both axes),
/// or `None` when it misses the box entirely.
fn clip_segment(a: (f64, f64), b: (f64, f64), min: f64, max: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, a.0 - min), (dx, max.0 - a.0), (-dy, a.1 - min), (dy, max.1 - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| (a.0 + dx * t, a.1 + dy * t);
    Some((at(t0), at(t1)))
}

/// Draw an opaque line of `width` px between `from` and `to` (Bresenham walk,
/// brush stamped at every step). The segment is first clipped to the band of
/// centers whose brush can touch the canvas, so only that part is walked.
pub fn composite_line(canvas: &mut Canvas, from: Point, to: Point, color: Color, width: u32) {
    let color = Color { a: 255, ..color };
    let width = width.max(1);

    // One extra pixel of margin absorbs rounding of the clipped endpoints.
    let reach = width as f64 / 2.0 + 1.0;
    let max = (canvas.width() as f64 - 1.0 + reach, canvas.height() as f64 - 1.0 + reach);
    let a = (from.x as f64, from.y as f64);
    let b = (to.x as f64, to.y as f64);
    let Some((a, b)) = clip_segment(a, b, -reach, max) else {
        log::debug!("line ({}, {}) -> ({}, {}) misses the canvas", from.x, from.y, to.x, to.y);
        return;
    };

    let (mut x0, mut y0) = (a.0.round() as i64, a.1.round() as i64);
    let (x1, y1) = (b.0.round() as i64, b.1.round() as i64);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        stamp_brush(canvas, x0, y0, width, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

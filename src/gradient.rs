// Edge-fade opacity mask for defect sprites.
// A linear gradient runs from the sprite's top-left corner to its bottom-right
// corner; it is opaque in the middle and fully transparent at both ends, so a
// stamped defect has no hard rectangular border.

use crate::canvas::Sprite;
use crate::error::Error;
use crate::types::Color;

/// Control stops (t, alpha), interpolated linearly.
pub const EDGE_FADE_STOPS: [(f32, f32); 5] =
    [(0.0, 0.0), (0.2, 128.0), (0.5, 255.0), (0.8, 128.0), (1.0, 0.0)];

/// One alpha byte per pixel, row-major. Same role as a sprite's own alpha channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaField {
    pub width: u32,
    pub height: u32,
    pub alpha: Vec<u8>, // length = width * height
}

impl AlphaField {
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.alpha[(y * self.width + x) as usize]
    }
}

/// Gradient value at parameter `t` (clamped to [0,1]).
pub fn edge_fade_alpha(t: f32) -> u8 {
    let t = t.clamp(0.0, 1.0);
    for pair in EDGE_FADE_STOPS.windows(2) {
        let (t0, a0) = pair[0];
        let (t1, a1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            return (a0 + (a1 - a0) * f).round().clamp(0.0, 255.0) as u8;
        }
    }
    0
}

/// Build the mask for a `width` x `height` sprite.
/// Each pixel center is projected onto the (0,0)→(width,height) axis:
/// t = (px·w + py·h) / (w² + h²).
pub fn build_edge_fade_mask(width: u32, height: u32) -> AlphaField {
    let mut alpha = Vec::with_capacity((width as usize) * (height as usize));
    let (w, h) = (width as f32, height as f32);
    let len2 = w * w + h * h;
    for y in 0..height {
        for x in 0..width {
            let t = ((x as f32 + 0.5) * w + (y as f32 + 0.5) * h) / len2;
            alpha.push(edge_fade_alpha(t));
        }
    }
    AlphaField { width, height, alpha }
}

/// Multiply each sprite alpha by `mask/255` (truncating). Zero alpha stays zero.
pub fn apply_mask(sprite: &Sprite, mask: &AlphaField) -> Result<Sprite, Error> {
    if mask.width != sprite.width() || mask.height != sprite.height() {
        return Err(Error::MaskSize {
            mask_w: mask.width,
            mask_h: mask.height,
            sprite_w: sprite.width(),
            sprite_h: sprite.height(),
        });
    }
    Ok(scale_alpha(sprite, mask))
}

/// Build a matching mask and apply it in one go.
pub fn apply_edge_fade(sprite: &Sprite) -> Sprite {
    scale_alpha(sprite, &build_edge_fade_mask(sprite.width(), sprite.height()))
}

fn scale_alpha(sprite: &Sprite, mask: &AlphaField) -> Sprite {
    sprite.map_pixels(|x, y, c| Color {
        a: (c.a as u32 * mask.get(x, y) as u32 / 255) as u8,
        ..c
    })
}

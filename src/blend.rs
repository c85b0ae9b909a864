// Pulls a defect sprite's colors halfway toward the background it lands on,
// so a fixed-color sprite looks native to the local surface.

use crate::canvas::Sprite;
use crate::types::Color;

/// For every pixel with alpha > 0: rgb = (sprite + target) / 2, truncated.
/// Alpha is untouched; fully transparent pixels are left exactly as they were.
pub fn blend_toward_background(sprite: &Sprite, target: Color) -> Sprite {
    let mid = |s: u8, t: u8| ((s as u16 + t as u16) / 2) as u8;
    sprite.map_pixels(|_, _, c| {
        if c.a == 0 {
            return c;
        }
        Color::rgba(mid(c.r, target.r), mid(c.g, target.g), mid(c.b, target.b), c.a)
    })
}

// Where a defect goes, and the full prepare-then-stamp pipeline for one defect.
//
// Three modes produce the sprite's top-left corner:
//   At(p)           : caller picked the point (manual add)
//   RandomInCanvas  : anywhere the whole sprite fits on the canvas
//   RandomInRegion  : inside the selected rectangle
// A sprite bigger than the space it must fit in gets the single offset 0.

use rand::Rng;

use crate::blend::blend_toward_background;
use crate::canvas::compositor::composite_sprite;
use crate::canvas::{Canvas, Sprite};
use crate::error::Error;
use crate::gradient::apply_edge_fade;
use crate::sampler::sample_color;
use crate::types::{Color, Point, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    At(Point),
    RandomInCanvas,
    RandomInRegion(Region),
}

/// How a library sprite is resized before it is stamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalePolicy {
    /// Stamp at the sprite's own size.
    Native,
    /// Width = fraction of the canvas width.
    CanvasWidth(f32),
    /// Width = fraction of the selected region's width (falls back to native without a region).
    RegionWidth(f32),
}

impl ScalePolicy {
    pub fn target_width(self, canvas_width: u32, region: Option<Region>) -> Option<u32> {
        match self {
            ScalePolicy::Native => None,
            ScalePolicy::CanvasWidth(f) => Some((canvas_width as f32 * f) as u32),
            ScalePolicy::RegionWidth(f) => region.map(|r| (r.width as f32 * f) as u32),
        }
    }

    pub fn apply(self, sprite: &Sprite, canvas_width: u32, region: Option<Region>) -> Sprite {
        match self.target_width(canvas_width, region) {
            Some(w) => sprite.scaled_to_width(w),
            None => sprite.clone(),
        }
    }
}

/// Uniform offset in `0..=span-extent`, or 0 when the extent doesn't fit.
fn random_offset<R: Rng>(rng: &mut R, span: u32, extent: u32) -> u32 {
    let max = span.saturating_sub(extent);
    if max == 0 {
        if extent > span {
            log::debug!("sprite extent {extent} exceeds span {span}; clamping offset to 0");
        }
        return 0;
    }
    rng.random_range(0..=max)
}

/// Top-left such that `0 <= x <= W-w` and `0 <= y <= H-h` whenever the sprite fits.
pub fn random_in_canvas<R: Rng>(
    rng: &mut R,
    canvas_width: u32,
    canvas_height: u32,
    sprite_width: u32,
    sprite_height: u32,
) -> Point {
    let x = random_offset(rng, canvas_width, sprite_width);
    let y = random_offset(rng, canvas_height, sprite_height);
    Point::new(x as i32, y as i32)
}

/// Top-left inside `region`; the whole sprite stays inside when it fits,
/// otherwise it is anchored at the region's origin.
pub fn random_in_region<R: Rng>(
    rng: &mut R,
    region: Region,
    sprite_width: u32,
    sprite_height: u32,
) -> Point {
    let dx = random_offset(rng, region.width, sprite_width);
    let dy = random_offset(rng, region.height, sprite_height);
    Point::new((region.x + dx) as i32, (region.y + dy) as i32)
}

/// Blend toward the background, then fade the edges.
pub fn prepare_sprite(sprite: &Sprite, background: Color) -> Sprite {
    apply_edge_fade(&blend_toward_background(sprite, background))
}

/// Scale, position, sample, prepare and composite one defect. Returns where it landed.
///
/// Region placement samples the background at the region's top-left before
/// choosing a position; the other modes sample at the chosen position.
pub fn place_defect<R: Rng>(
    canvas: &mut Canvas,
    sprite: &Sprite,
    placement: Placement,
    scale: ScalePolicy,
    rng: &mut R,
) -> Result<Point, Error> {
    let (cw, ch) = (canvas.width(), canvas.height());

    let (position, prepared) = match placement {
        Placement::RandomInRegion(region) => {
            let region = region.clipped_to(cw, ch);
            if !region.is_valid() {
                return Err(Error::InvalidRegion);
            }
            let background = sample_color(Some(canvas), region.origin());
            let sprite = scale.apply(sprite, cw, Some(region));
            let position = random_in_region(rng, region, sprite.width(), sprite.height());
            (position, prepare_sprite(&sprite, background))
        }
        Placement::RandomInCanvas => {
            let sprite = scale.apply(sprite, cw, None);
            let position = random_in_canvas(rng, cw, ch, sprite.width(), sprite.height());
            let background = sample_color(Some(canvas), position);
            (position, prepare_sprite(&sprite, background))
        }
        Placement::At(position) => {
            let sprite = scale.apply(sprite, cw, None);
            let background = sample_color(Some(canvas), position);
            (position, prepare_sprite(&sprite, background))
        }
    };

    composite_sprite(canvas, &prepared, position);
    log::info!(
        "placed {}x{} defect at ({}, {}) via {:?}",
        prepared.width(),
        prepared.height(),
        position.x,
        position.y,
        placement
    );
    Ok(position)
}

// Free-hand "scratch" defects.
// A stroke fixes its color once, from the mean background around its start
// point, and keeps that color for every segment even as the surface under it
// changes.

use crate::canvas::Canvas;
use crate::canvas::compositor::composite_line;
use crate::error::Error;
use crate::sampler::sample_pattern;
use crate::types::{Color, Point, Region};

/// One stroke in progress.
#[derive(Debug, Clone)]
pub struct Stroke {
    color: Color,
    width: u32,
    last: Point,
    points: Vec<Point>,
}

impl Stroke {
    /// Start at `start`, sampling the stroke color over a `radius` neighborhood.
    pub fn begin(canvas: &Canvas, start: Point, radius: u32, width: u32) -> Self {
        let color = sample_pattern(Some(canvas), start, radius);
        Self { color, width, last: start, points: vec![start] }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Draw a segment from the previous point to `to`.
    pub fn extend_to(&mut self, canvas: &mut Canvas, to: Point) {
        composite_line(canvas, self.last, to, self.color, self.width);
        self.last = to;
        self.points.push(to);
    }

    /// Move the pen without drawing (button released and pressed elsewhere).
    pub fn lift_to(&mut self, to: Point) {
        self.last = to;
        self.points.push(to);
    }
}

/// Idle → Active (needs a valid region) → Idle (explicit end).
#[derive(Debug, Default)]
pub enum ScratchRasterizer {
    #[default]
    Idle,
    Active(Stroke),
}

impl ScratchRasterizer {
    pub fn is_active(&self) -> bool {
        matches!(self, ScratchRasterizer::Active(_))
    }

    pub fn stroke(&self) -> Option<&Stroke> {
        match self {
            ScratchRasterizer::Active(s) => Some(s),
            ScratchRasterizer::Idle => None,
        }
    }

    /// Enter Active. Refused without a non-degenerate region; an already
    /// active stroke is kept as-is.
    pub fn begin(
        &mut self,
        canvas: &Canvas,
        region: Option<Region>,
        start: Point,
        radius: u32,
        width: u32,
    ) -> Result<(), Error> {
        if !region.is_some_and(|r| r.is_valid()) {
            return Err(Error::InvalidRegion);
        }
        if self.is_active() {
            return Ok(());
        }
        let stroke = Stroke::begin(canvas, start, radius, width);
        log::info!(
            "scratch started at ({}, {}) color {:?}",
            start.x, start.y, stroke.color()
        );
        *self = ScratchRasterizer::Active(stroke);
        Ok(())
    }

    /// Draw to `to` if a stroke is active. Returns whether the canvas changed.
    pub fn extend(&mut self, canvas: &mut Canvas, to: Point) -> bool {
        match self {
            ScratchRasterizer::Active(stroke) => {
                stroke.extend_to(canvas, to);
                true
            }
            ScratchRasterizer::Idle => false,
        }
    }

    pub fn lift(&mut self, to: Point) {
        if let ScratchRasterizer::Active(stroke) = self {
            stroke.lift_to(to);
        }
    }

    /// Back to Idle, handing back the finished stroke.
    pub fn end(&mut self) -> Option<Stroke> {
        match std::mem::take(self) {
            ScratchRasterizer::Active(stroke) => {
                log::info!("scratch ended after {} points", stroke.points().len());
                Some(stroke)
            }
            ScratchRasterizer::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Sprite;
    use crate::canvas::compositor::composite_sprite;

    const REGION: Option<Region> = Some(Region::new(0, 0, 100, 100));

    #[test]
    fn needs_a_valid_region() {
        let canvas = Canvas::filled(50, 50, Color::WHITE);
        let mut r = ScratchRasterizer::default();
        assert!(matches!(r.begin(&canvas, None, Point::new(5, 5), 10, 3), Err(Error::InvalidRegion)));
        assert!(matches!(
            r.begin(&canvas, Some(Region::new(0, 0, 0, 9)), Point::new(5, 5), 10, 3),
            Err(Error::InvalidRegion)
        ));
        assert!(!r.is_active());
    }

    #[test]
    fn color_is_fixed_for_the_whole_stroke() {
        // Left half red, right half blue; stroke starts in the red half.
        let mut canvas = Canvas::filled(100, 40, Color::rgb(255, 0, 0));
        composite_sprite(&mut canvas, &Sprite::filled(50, 40, Color::rgb(0, 0, 255)), Point::new(50, 0));

        let mut r = ScratchRasterizer::default();
        r.begin(&canvas, REGION, Point::new(20, 20), 10, 3).unwrap();
        let color = r.stroke().unwrap().color();
        assert_eq!(color, Color::rgb(255, 0, 0));

        assert!(r.extend(&mut canvas, Point::new(45, 20)));
        assert!(r.extend(&mut canvas, Point::new(90, 20)));
        assert!(r.extend(&mut canvas, Point::new(90, 35)));

        // Every drawn pixel carries the start color, including over the blue half.
        assert_eq!(canvas.pixel(70, 20), Some(color));
        assert_eq!(canvas.pixel(90, 30), Some(color));
        assert_eq!(r.stroke().unwrap().color(), color);
    }

    #[test]
    fn stroke_color_is_neighborhood_mean() {
        let mut canvas = Canvas::filled(40, 40, Color::rgb(0, 0, 0));
        composite_sprite(&mut canvas, &Sprite::filled(40, 20, Color::rgb(200, 100, 50)), Point::new(0, 0));
        let mut r = ScratchRasterizer::default();
        r.begin(&canvas, REGION, Point::new(20, 20), 10, 3).unwrap();
        // Rows 10..20 colored, rows 20..30 black → half of each channel.
        assert_eq!(r.stroke().unwrap().color(), Color::rgb(100, 50, 25));
    }

    #[test]
    fn lift_moves_pen_without_drawing() {
        let mut canvas = Canvas::filled(60, 60, Color::rgb(10, 10, 10));
        let mut r = ScratchRasterizer::default();
        r.begin(&canvas, REGION, Point::new(5, 5), 2, 1).unwrap();
        // Paint something distinct so drawn pixels are detectable.
        composite_sprite(&mut canvas, &Sprite::filled(60, 60, Color::WHITE), Point::new(0, 0));
        r.lift(Point::new(40, 40));
        r.extend(&mut canvas, Point::new(50, 40));
        assert_eq!(canvas.pixel(20, 20), Some(Color::WHITE));
        assert_eq!(canvas.pixel(45, 40), Some(Color::rgb(10, 10, 10)));
        assert_eq!(r.stroke().unwrap().points().len(), 3);
    }

    #[test]
    fn end_returns_to_idle() {
        let mut canvas = Canvas::filled(20, 20, Color::WHITE);
        let mut r = ScratchRasterizer::default();
        assert!(r.end().is_none());
        r.begin(&canvas, REGION, Point::new(1, 1), 10, 3).unwrap();
        let stroke = r.end().unwrap();
        assert_eq!(stroke.points(), &[Point::new(1, 1)]);
        assert!(!r.is_active());
        assert!(!r.extend(&mut canvas, Point::new(5, 5)));
    }
}

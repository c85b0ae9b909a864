// The editing session: owns the canvas, the selection, the scratch state and
// the RNG, and turns discrete UI events into calls on the pixel engine.
// One event runs to completion before the next is accepted (`&mut self`), so
// every placement or stroke sees the canvas exactly as it left it.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::canvas::{Canvas, Sprite};
use crate::config::Config;
use crate::error::Error;
use crate::library::{self, SpriteLibrary};
use crate::placement::{Placement, ScalePolicy, place_defect};
use crate::sampler::sample_color;
use crate::scratch::ScratchRasterizer;
use crate::types::{Color, Point, Region};

/// What the UI shell can tell us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    SelectionToggled(bool),
    ManualAddRequested,
    AutoAddRequested,
    StrokeEndRequested,
}

/// Whether the canvas needs redisplaying after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    CanvasUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    /// Drawing a rectangle; `anchor` is set on pointer down.
    Selecting { anchor: Option<Point>, current: Point },
    Selected(Region),
}

impl SelectionState {
    pub fn region(&self) -> Option<Region> {
        match self {
            SelectionState::Selected(r) => Some(*r),
            _ => None,
        }
    }

    /// Rectangle to outline on screen, finished or still being dragged.
    pub fn preview(&self) -> Option<Region> {
        match *self {
            SelectionState::Selecting { anchor: Some(a), current } => Some(Region::from_corners(a, current)),
            SelectionState::Selected(r) => Some(r),
            _ => None,
        }
    }
}

pub struct Session {
    config: Config,
    canvas: Option<Canvas>,
    library: SpriteLibrary,
    sprite: Option<Sprite>,
    /// Library position of `sprite`, if it came from the library.
    sprite_index: Option<usize>,
    selection: SelectionState,
    scratch: ScratchRasterizer,
    /// One-shot: the next pointer down places the sprite there.
    manual_armed: bool,
    rng: StdRng,
}

impl Session {
    pub fn new(config: Config, library: SpriteLibrary) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            canvas: None,
            library,
            sprite: None,
            sprite_index: None,
            selection: SelectionState::Idle,
            scratch: ScratchRasterizer::Idle,
            manual_armed: false,
            rng,
        }
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn library(&self) -> &SpriteLibrary {
        &self.library
    }

    pub fn sprite_index(&self) -> Option<usize> {
        self.sprite_index
    }

    pub fn is_manual_armed(&self) -> bool {
        self.manual_armed
    }

    pub fn is_stroking(&self) -> bool {
        self.scratch.is_active()
    }

    /// Background color at `point`; white when nothing is loaded.
    pub fn sample(&self, point: Point) -> Color {
        sample_color(self.canvas.as_ref(), point)
    }

    /// Replace the canvas. Selection and any stroke belong to the old image and are dropped.
    pub fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = Some(canvas);
        self.selection = SelectionState::Idle;
        self.scratch = ScratchRasterizer::Idle;
        self.manual_armed = false;
    }

    /// Load a new canvas; on failure the current one is kept.
    pub fn load_canvas(&mut self, path: &Path) -> Result<(), Error> {
        let canvas = library::load_image(path)?;
        self.set_canvas(canvas);
        Ok(())
    }

    pub fn save_canvas(&self, path: &Path) -> Result<(), Error> {
        let canvas = self.canvas.as_ref().ok_or(Error::NoCanvasLoaded)?;
        library::save_image(canvas, path)
    }

    /// Choose a library sprite. The previous choice is kept if decoding fails.
    pub fn select_sprite(&mut self, index: usize) -> Result<(), Error> {
        let sprite = self.library.load_sprite(index)?;
        log::info!("selected sprite {}", self.library.names()[index]);
        self.sprite = Some(sprite);
        self.sprite_index = Some(index);
        Ok(())
    }

    /// Step through the library, wrapping at both ends.
    pub fn cycle_sprite(&mut self, forward: bool) -> Result<(), Error> {
        let n = self.library.len();
        if n == 0 {
            return Err(Error::NoSpriteSelected);
        }
        let next = match (self.sprite_index(), forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.select_sprite(next)
    }

    /// Use an already-decoded sprite (not from the library).
    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = Some(sprite);
        self.sprite_index = None;
    }

    pub fn handle(&mut self, event: Event) -> Result<Outcome, Error> {
        match event {
            Event::SelectionToggled(on) => {
                self.end_stroke();
                self.selection = if on {
                    SelectionState::Selecting { anchor: None, current: Point::default() }
                } else {
                    SelectionState::Idle
                };
                Ok(Outcome::Unchanged)
            }
            Event::PointerDown(p) => self.pointer_down(p),
            Event::PointerMove(p) => self.pointer_move(p),
            Event::PointerUp(p) => self.pointer_up(p),
            Event::ManualAddRequested => {
                self.require_canvas()?;
                self.require_sprite()?;
                self.manual_armed = true;
                Ok(Outcome::Unchanged)
            }
            Event::AutoAddRequested => self.auto_add(),
            Event::StrokeEndRequested => {
                if self.end_stroke() {
                    self.selection = SelectionState::Idle;
                }
                Ok(Outcome::Unchanged)
            }
        }
    }

    fn require_canvas(&self) -> Result<&Canvas, Error> {
        self.canvas.as_ref().ok_or(Error::NoCanvasLoaded)
    }

    fn require_sprite(&self) -> Result<&Sprite, Error> {
        self.sprite.as_ref().ok_or(Error::NoSpriteSelected)
    }

    fn end_stroke(&mut self) -> bool {
        self.scratch.end().is_some()
    }

    fn pointer_down(&mut self, p: Point) -> Result<Outcome, Error> {
        if let SelectionState::Selecting { .. } = self.selection {
            self.selection = SelectionState::Selecting { anchor: Some(p), current: p };
            return Ok(Outcome::Unchanged);
        }

        if self.manual_armed {
            self.manual_armed = false;
            let scale = self.config.manual_scale;
            self.place(Placement::At(p), scale)?;
            return Ok(Outcome::CanvasUpdated);
        }

        if self.scratch.is_active() {
            self.scratch.lift(p);
            return Ok(Outcome::Unchanged);
        }

        if let SelectionState::Selected(region) = self.selection {
            let canvas = self.canvas.as_ref().ok_or(Error::NoCanvasLoaded)?;
            self.scratch.begin(
                canvas,
                Some(region),
                p,
                self.config.sample_radius,
                self.config.stroke_width,
            )?;
        }
        Ok(Outcome::Unchanged)
    }

    fn pointer_move(&mut self, p: Point) -> Result<Outcome, Error> {
        if let SelectionState::Selecting { anchor: Some(a), .. } = self.selection {
            self.selection = SelectionState::Selecting { anchor: Some(a), current: p };
            return Ok(Outcome::Unchanged);
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(Outcome::Unchanged);
        };
        if self.scratch.extend(canvas, p) {
            Ok(Outcome::CanvasUpdated)
        } else {
            Ok(Outcome::Unchanged)
        }
    }

    fn pointer_up(&mut self, p: Point) -> Result<Outcome, Error> {
        let SelectionState::Selecting { anchor: Some(a), .. } = self.selection else {
            return Ok(Outcome::Unchanged);
        };
        let canvas = self.require_canvas()?;
        let region = Region::from_corners(a, p).clipped_to(canvas.width(), canvas.height());
        if !region.is_valid() {
            self.selection = SelectionState::Selecting { anchor: None, current: p };
            return Err(Error::InvalidRegion);
        }
        log::info!("selected region {:?}", region);
        self.selection = SelectionState::Selected(region);
        Ok(Outcome::Unchanged)
    }

    fn auto_add(&mut self) -> Result<Outcome, Error> {
        let (placement, scale) = match self.selection {
            SelectionState::Selected(region) => (Placement::RandomInRegion(region), self.config.region_scale),
            SelectionState::Idle => (Placement::RandomInCanvas, self.config.auto_scale),
            SelectionState::Selecting { .. } => return Err(Error::InvalidRegion),
        };
        self.place(placement, scale)?;
        Ok(Outcome::CanvasUpdated)
    }

    /// Run one placement end to end, then reset the selection.
    fn place(&mut self, placement: Placement, scale: ScalePolicy) -> Result<Point, Error> {
        let sprite = self.sprite.as_ref().ok_or(Error::NoSpriteSelected)?;
        let canvas = self.canvas.as_mut().ok_or(Error::NoCanvasLoaded)?;
        let position = place_defect(canvas, sprite, placement, scale, &mut self.rng)?;
        self.selection = SelectionState::Idle;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const RED: Color = Color::rgb(255, 0, 0);

    fn session() -> Session {
        let config = Config {
            seed: Some(9),
            manual_scale: ScalePolicy::Native,
            auto_scale: ScalePolicy::Native,
            region_scale: ScalePolicy::Native,
            ..Config::default()
        };
        Session::new(config, SpriteLibrary::empty())
    }

    fn select(s: &mut Session, a: Point, b: Point) -> Result<Outcome, Error> {
        s.handle(Event::SelectionToggled(true))?;
        s.handle(Event::PointerDown(a))?;
        s.handle(Event::PointerMove(b))?;
        s.handle(Event::PointerUp(b))
    }

    #[test]
    fn no_canvas_defaults_and_refusals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut s = session();
        assert_eq!(s.sample(Point::new(1, 1)), Color::WHITE);
        assert!(matches!(s.save_canvas(&path), Err(Error::NoCanvasLoaded)));
        assert!(!path.exists());
        s.set_sprite(Sprite::filled(2, 2, Color::WHITE));
        assert!(matches!(s.handle(Event::AutoAddRequested), Err(Error::NoCanvasLoaded)));
        assert!(matches!(s.handle(Event::ManualAddRequested), Err(Error::NoCanvasLoaded)));
    }

    #[test]
    fn auto_add_without_sprite_is_refused() {
        let mut s = session();
        s.set_canvas(Canvas::filled(10, 10, RED));
        assert!(matches!(s.handle(Event::AutoAddRequested), Err(Error::NoSpriteSelected)));
    }

    #[test]
    fn drag_selects_clipped_region() {
        let mut s = session();
        s.set_canvas(Canvas::filled(200, 200, RED));
        select(&mut s, Point::new(150, 150), Point::new(100, 100)).unwrap();
        assert_eq!(s.selection(), SelectionState::Selected(Region::new(100, 100, 50, 50)));

        select(&mut s, Point::new(180, 180), Point::new(260, 190)).unwrap();
        assert_eq!(s.selection().region(), Some(Region::new(180, 180, 20, 10)));
    }

    #[test]
    fn zero_area_selection_is_refused() {
        let mut s = session();
        s.set_canvas(Canvas::filled(50, 50, RED));
        let p = Point::new(10, 10);
        assert!(matches!(select(&mut s, p, p), Err(Error::InvalidRegion)));
        assert!(matches!(s.selection(), SelectionState::Selecting { anchor: None, .. }));
        assert!(matches!(s.handle(Event::AutoAddRequested), Err(Error::InvalidRegion)));
    }

    #[test]
    fn region_auto_add_blends_with_region_color_and_resets_selection() {
        let mut s = session();
        s.set_canvas(Canvas::filled(300, 300, RED));
        s.set_sprite(Sprite::filled(1, 1, Color::WHITE));
        select(&mut s, Point::new(100, 100), Point::new(150, 150)).unwrap();

        assert_eq!(s.handle(Event::AutoAddRequested).unwrap(), Outcome::CanvasUpdated);
        assert_eq!(s.selection(), SelectionState::Idle);

        let canvas = s.canvas().unwrap();
        let hits: Vec<_> = (100..150)
            .flat_map(|y| (100..150).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) != Some(RED))
            .collect();
        assert_eq!(hits.len(), 1);
        let (x, y) = hits[0];
        assert_eq!(canvas.pixel(x, y), Some(Color::rgb(255, 127, 127)));
    }

    #[test]
    fn manual_add_places_at_next_click() {
        let mut s = session();
        s.set_canvas(Canvas::filled(40, 40, Color::WHITE));
        s.set_sprite(Sprite::filled(1, 1, Color::rgb(0, 0, 0)));
        s.handle(Event::ManualAddRequested).unwrap();
        assert!(s.is_manual_armed());
        assert_eq!(s.handle(Event::PointerDown(Point::new(7, 9))).unwrap(), Outcome::CanvasUpdated);
        assert!(!s.is_manual_armed());
        assert_eq!(s.canvas().unwrap().pixel(7, 9), Some(Color::rgb(127, 127, 127)));
        // one-shot: a second click does nothing
        assert_eq!(s.handle(Event::PointerDown(Point::new(1, 1))).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn scratch_needs_region_and_keeps_start_color() {
        let mut s = session();
        s.set_canvas(Canvas::filled(100, 100, RED));

        // No region: pointer down doesn't start a stroke.
        s.handle(Event::PointerDown(Point::new(20, 20))).unwrap();
        assert!(!s.is_stroking());

        select(&mut s, Point::new(0, 0), Point::new(100, 100)).unwrap();
        s.handle(Event::PointerDown(Point::new(20, 20))).unwrap();
        assert!(s.is_stroking());
        assert_eq!(s.handle(Event::PointerMove(Point::new(60, 20))).unwrap(), Outcome::CanvasUpdated);
        assert_eq!(s.canvas().unwrap().pixel(40, 20), Some(RED));

        s.handle(Event::StrokeEndRequested).unwrap();
        assert!(!s.is_stroking());
        assert_eq!(s.selection(), SelectionState::Idle);
        assert_eq!(s.handle(Event::PointerMove(Point::new(90, 90))).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn toggling_selection_ends_stroke() {
        let mut s = session();
        s.set_canvas(Canvas::filled(50, 50, RED));
        select(&mut s, Point::new(0, 0), Point::new(30, 30)).unwrap();
        s.handle(Event::PointerDown(Point::new(5, 5))).unwrap();
        assert!(s.is_stroking());
        s.handle(Event::SelectionToggled(false)).unwrap();
        assert!(!s.is_stroking());
        assert_eq!(s.selection(), SelectionState::Idle);
    }

    #[test]
    fn failed_load_keeps_canvas() {
        let dir = tempdir().unwrap();
        let mut s = session();
        s.set_canvas(Canvas::filled(3, 3, RED));
        let err = s.load_canvas(&dir.path().join("missing.png"));
        assert!(matches!(err, Err(Error::ImageLoad { .. })));
        assert_eq!(s.canvas().unwrap().pixel(1, 1), Some(RED));
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut s = session();
        s.set_canvas(Canvas::filled(6, 4, RED));
        s.save_canvas(&path).unwrap();
        let mut t = session();
        t.load_canvas(&path).unwrap();
        assert_eq!(t.canvas().unwrap().as_image(), s.canvas().unwrap().as_image());
    }

    #[test]
    fn cycling_an_empty_library_is_refused() {
        let mut s = session();
        assert!(matches!(s.cycle_sprite(true), Err(Error::NoSpriteSelected)));
    }

    #[test]
    fn cycling_wraps() {
        let dir = tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            image::RgbaImage::new(2, 2).save(dir.path().join(name)).unwrap();
        }
        let mut s = Session::new(Config::default(), SpriteLibrary::open(dir.path()).unwrap());
        s.cycle_sprite(false).unwrap();
        assert_eq!(s.sprite_index(), Some(0));
        s.cycle_sprite(false).unwrap();
        assert_eq!(s.sprite_index(), Some(2));
        s.cycle_sprite(true).unwrap();
        assert_eq!(s.sprite_index(), Some(0));
    }
}

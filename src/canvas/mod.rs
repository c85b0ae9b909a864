// Pixel buffers: the Canvas being edited and the defect Sprites stamped onto it.
// Canvas pixels are only writable from the `compositor` child module.

pub mod compositor;

use image::{RgbaImage, imageops::FilterType};

use crate::types::{Color, FrameBuffer};

/// The base image being edited. Size is fixed at load time.
#[derive(Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Wrap a decoded image. Canvases are treated as opaque, so alpha is forced to 255.
    pub fn from_image(mut image: RgbaImage) -> Self {
        for px in image.pixels_mut() {
            px[3] = 255;
        }
        Self { image }
    }

    /// Solid-color canvas (tests, empty sessions).
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, color.to_pixel()) }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color at (x,y), or None outside the canvas.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        self.image.get_pixel_checked(x as u32, y as u32).map(Color::from_pixel)
    }

    /// Independent copy for previews; edits to either side never show up in the other.
    pub fn snapshot(&self) -> Canvas {
        self.clone()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pack into the window's 0x00RRGGBB layout.
    pub fn to_frame_buffer(&self) -> FrameBuffer {
        let pixels = self
            .image
            .pixels()
            .map(|px| Color::from_pixel(px).to_0rgb())
            .collect();
        FrameBuffer {
            width: self.image.width() as usize,
            height: self.image.height() as usize,
            pixels,
        }
    }
}

/// A defect image. Never edited in place: every preparation step returns a new Sprite.
#[derive(Clone)]
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, color.to_pixel()) }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color at (x,y). Panics outside the sprite, like `RgbaImage::get_pixel`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        Color::from_pixel(self.image.get_pixel(x, y))
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// New sprite with `f(x, y, color)` applied to every pixel.
    pub fn map_pixels(&self, mut f: impl FnMut(u32, u32, Color) -> Color) -> Sprite {
        let mut image = self.image.clone();
        for (x, y, px) in image.enumerate_pixels_mut() {
            *px = f(x, y, Color::from_pixel(px)).to_pixel();
        }
        Sprite { image }
    }

    /// Resize to `width` keeping the aspect ratio. Both sides stay at least 1 px.
    pub fn scaled_to_width(&self, width: u32) -> Sprite {
        let width = width.max(1);
        if width == self.width() || self.width() == 0 || self.height() == 0 {
            return self.clone();
        }
        let height = ((self.height() as u64 * width as u64 + self.width() as u64 / 2)
            / self.width() as u64)
            .max(1) as u32;
        Sprite { image: image::imageops::resize(&self.image, width, height, FilterType::Nearest) }
    }
}

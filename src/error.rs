// One error type for the whole tool.
// Every variant states *where* things went wrong; none of them ends the session.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no canvas loaded")]
    NoCanvasLoaded,
    #[error("no defect sprite selected")]
    NoSpriteSelected,
    /// Region-scoped action with a zero-area or missing selection.
    #[error("invalid or missing selection region")]
    InvalidRegion,
    #[error("mask is {mask_w}x{mask_h} but sprite is {sprite_w}x{sprite_h}")]
    MaskSize { mask_w: u32, mask_h: u32, sprite_w: u32, sprite_h: u32 },
    #[error("cannot load image {path}: {source}")]
    ImageLoad { path: PathBuf, source: image::ImageError },
    #[error("cannot save image {path}: {source}")]
    ImageSave { path: PathBuf, source: image::ImageError },
    #[error("i/o error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("window init error: {0}")]
    WindowInit(String),
    #[error("window update error: {0}")]
    WindowUpdate(String),
    #[error("logger init error: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),
}

// Disk side of the tool: canvases in and out, the defect sprite library, and
// the library normalizer that renumbers sprites as defect_NNN.png.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use tempfile::NamedTempFile;

use crate::canvas::{Canvas, Sprite};
use crate::error::Error;

/// Raster extensions we list and decode (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(e)))
}

fn decode_rgba(path: &Path) -> Result<RgbaImage, Error> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })
}

/// Decode a canvas. On failure nothing is returned, so the caller's canvas stays as it was.
pub fn load_image(path: &Path) -> Result<Canvas, Error> {
    let canvas = Canvas::from_image(decode_rgba(path)?);
    log::info!("loaded canvas {} ({}x{})", path.display(), canvas.width(), canvas.height());
    Ok(canvas)
}

/// Encode fully in memory, write a temp file beside `path`, then rename it over
/// `path`. A failed encode or write leaves any previous file untouched.
/// The format follows the extension; JPEG drops alpha.
pub fn save_image(canvas: &Canvas, path: &Path) -> Result<(), Error> {
    write_rgba(canvas.as_image(), path)?;
    log::info!("saved canvas {}", path.display());
    Ok(())
}

fn write_rgba(image: &RgbaImage, path: &Path) -> Result<(), Error> {
    let save_err = |source| Error::ImageSave { path: path.to_path_buf(), source };
    let format = ImageFormat::from_path(path).map_err(save_err)?;

    let dynamic = DynamicImage::ImageRgba8(image.clone());
    let dynamic = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(dynamic.to_rgb8())
    } else {
        dynamic
    };

    let mut bytes = Cursor::new(Vec::new());
    dynamic.write_to(&mut bytes, format).map_err(save_err)?;
    let io_err = |source| Error::Io { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(&bytes.into_inner()).map_err(io_err)?;
    staged.flush().map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// File names of supported images in `dir`, sorted.
pub fn list_sprites(dir: &Path) -> Result<Vec<String>, Error> {
    let io_err = |source| Error::Io { path: dir.to_path_buf(), source };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() || !is_supported(&path) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// The defect sprites available to a session.
#[derive(Debug, Clone, Default)]
pub struct SpriteLibrary {
    dir: PathBuf,
    names: Vec<String>,
}

impl SpriteLibrary {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        let names = list_sprites(&dir)?;
        log::info!("sprite library {}: {} sprites", dir.display(), names.len());
        Ok(Self { dir, names })
    }

    /// Empty library (no sprites directory).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn load_sprite(&self, index: usize) -> Result<Sprite, Error> {
        let name = self.names.get(index).ok_or(Error::NoSpriteSelected)?;
        let path = self.dir.join(name);
        let image = decode_rgba(&path)?;
        log::debug!("loaded sprite {} ({}x{})", name, image.width(), image.height());
        Ok(Sprite::from_image(image))
    }
}

/// Re-encode every supported image in `dir` as `defect_001.png`, `defect_002.png`, …
/// in listing order. Non-PNG originals are removed once their PNG exists.
/// Everything is decoded before anything is written, so renumbering can't clobber
/// an input that hasn't been read yet. Returns how many images were written.
pub fn normalize_directory(dir: &Path) -> Result<usize, Error> {
    let names = list_sprites(dir)?;
    let mut decoded = Vec::with_capacity(names.len());
    for name in &names {
        let path = dir.join(name);
        decoded.push((path.clone(), decode_rgba(&path)?));
    }

    for (index, (source, image)) in decoded.iter().enumerate() {
        let target = dir.join(format!("defect_{:03}.png", index + 1));
        write_rgba(image, &target)?;

        let is_png = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if !is_png && *source != target {
            fs::remove_file(source).map_err(|e| Error::Io { path: source.clone(), source: e })?;
        }
        log::info!("{} -> {}", source.display(), target.display());
    }
    Ok(decoded.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;
    use image::Rgba;
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, px: [u8; 4]) {
        RgbaImage::from_pixel(w, h, Rgba(px)).save(dir.join(name)).unwrap();
    }

    #[test]
    fn listing_filters_and_sorts() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "b.png", 2, 2, [0, 0, 0, 255]);
        write_png(dir.path(), "a.PNG", 2, 2, [0, 0, 0, 255]);
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub.png")).unwrap();
        assert_eq!(list_sprites(dir.path()).unwrap(), vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(list_sprites(&dir.path().join("nope")), Err(Error::Io { .. })));
    }

    #[test]
    fn sprite_keeps_alpha() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "d.png", 3, 2, [9, 8, 7, 100]);
        let lib = SpriteLibrary::open(dir.path()).unwrap();
        assert_eq!(lib.len(), 1);
        let s = lib.load_sprite(0).unwrap();
        assert_eq!((s.width(), s.height()), (3, 2));
        assert_eq!(s.pixel(2, 1), Color::rgba(9, 8, 7, 100));
        assert!(matches!(lib.load_sprite(1), Err(Error::NoSpriteSelected)));
    }

    #[test]
    fn canvas_round_trip_through_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        let canvas = Canvas::filled(5, 4, Color::rgb(1, 2, 3));
        save_image(&canvas, &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!(back.as_image(), canvas.as_image());
    }

    #[test]
    fn jpeg_save_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save_image(&Canvas::filled(8, 8, Color::rgb(200, 200, 200)), &path).unwrap();
        let back = load_image(&path).unwrap();
        assert_eq!((back.width(), back.height()), (8, 8));
    }

    #[test]
    fn unknown_extension_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.nope");
        let err = save_image(&Canvas::filled(2, 2, Color::WHITE), &path);
        assert!(matches!(err, Err(Error::ImageSave { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn load_failure_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        fs::write(&path, b"not a png").unwrap();
        match load_image(&path) {
            Err(Error::ImageLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected {:?}", other.map(|c| c.width())),
        }
    }

    #[test]
    fn normalize_renumbers_and_removes_non_png() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "scratch.png", 2, 2, [1, 1, 1, 255]);
        RgbaImage::from_pixel(3, 3, Rgba([5, 5, 5, 255]))
            .save_with_format(dir.path().join("blob.bmp"), ImageFormat::Bmp)
            .unwrap();

        assert_eq!(normalize_directory(dir.path()).unwrap(), 2);

        let names = list_sprites(dir.path()).unwrap();
        // blob.bmp sorts first → defect_001; the original png is kept.
        assert_eq!(names, vec!["defect_001.png", "defect_002.png", "scratch.png"]);
        let first = image::open(dir.path().join("defect_001.png")).unwrap();
        assert_eq!((first.width(), first.height()), (3, 3));
    }

    #[test]
    fn normalize_does_not_clobber_unread_inputs() {
        let dir = tempdir().unwrap();
        // "a.bmp" becomes defect_001.png; the existing defect_001.png must be read first.
        RgbaImage::from_pixel(1, 1, Rgba([10, 0, 0, 255]))
            .save_with_format(dir.path().join("a.bmp"), ImageFormat::Bmp)
            .unwrap();
        write_png(dir.path(), "defect_001.png", 2, 2, [20, 0, 0, 255]);

        normalize_directory(dir.path()).unwrap();

        let one = image::open(dir.path().join("defect_001.png")).unwrap();
        let two = image::open(dir.path().join("defect_002.png")).unwrap();
        assert_eq!(one.width(), 1);
        assert_eq!(two.width(), 2);
        assert!(!dir.path().join("a.bmp").exists());
    }

    #[test]
    fn overwrite_replaces_previous_save_without_leftovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&Canvas::filled(2, 2, Color::rgb(1, 1, 1)), &path).unwrap();
        save_image(&Canvas::filled(3, 3, Color::rgb(9, 9, 9)), &path).unwrap();
        assert_eq!(load_image(&path).unwrap().pixel(2, 2), Some(Color::rgb(9, 9, 9)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_keeps_target_and_cleans_up() {
        let dir = tempdir().unwrap();
        // A directory in the way: the rename onto it fails after the bytes are staged.
        let path = dir.path().join("taken.png");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "x").unwrap();

        let err = save_image(&Canvas::filled(2, 2, Color::WHITE), &path);
        assert!(matches!(err, Err(Error::Io { .. })));
        assert!(path.join("keep.txt").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn tiff_inputs_are_listed_and_normalized() {
        let dir = tempdir().unwrap();
        RgbaImage::from_pixel(4, 2, Rgba([7, 7, 7, 255]))
            .save_with_format(dir.path().join("dent.tiff"), ImageFormat::Tiff)
            .unwrap();
        RgbaImage::from_pixel(1, 1, Rgba([7, 7, 7, 255]))
            .save_with_format(dir.path().join("pit.TIF"), ImageFormat::Tiff)
            .unwrap();
        assert_eq!(list_sprites(dir.path()).unwrap(), vec!["dent.tiff", "pit.TIF"]);

        assert_eq!(normalize_directory(dir.path()).unwrap(), 2);
        assert_eq!(list_sprites(dir.path()).unwrap(), vec!["defect_001.png", "defect_002.png"]);
        let first = image::open(dir.path().join("defect_001.png")).unwrap();
        assert_eq!((first.width(), first.height()), (4, 2));
    }
}

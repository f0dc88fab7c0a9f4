//! Font resolution for the overlay stage.
//!
//! ```text
//! requested path -> system font dirs -> built-in bitmap font -> unavailable
//! ```

mod bitmap;
mod scalable;

pub use bitmap::BitmapFont;
pub use scalable::{FontLoadError, ScalableFont};

use image::{Rgb, RgbImage};
use tracing::{debug, warn};

/// Image height is divided by this to get the font pixel size.
pub const FONT_SIZE_DIVISOR: u32 = 15;

/// Extra pixels between stacked lines of a multi-line caption.
pub const LINE_SPACING: u32 = 4;

#[cfg(test)]
pub(crate) const TEST_FONT: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/DejaVuSans.ttf");

/// What to do when the requested font cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontFallback {
    /// Use the embedded bitmap font.
    #[default]
    Builtin,
    /// No fallback font exists; the overlay is skipped.
    Disabled,
}

/// Ink extent of a rendered string, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

pub enum FontHandle {
    Scalable(ScalableFont),
    Bitmap(BitmapFont),
}

impl FontHandle {
    pub fn pixel_size(&self) -> u32 {
        match self {
            Self::Scalable(f) => f.pixel_size(),
            Self::Bitmap(f) => f.pixel_size(),
        }
    }

    pub fn measure(&self, text: &str) -> TextExtent {
        match self {
            Self::Scalable(f) => f.measure(text),
            Self::Bitmap(f) => f.measure(text),
        }
    }

    /// Draw `text` with its layout origin at (`x`, `y`). Lines split on
    /// `'\n'` stack downwards, left-aligned. Pixels falling outside the
    /// canvas are dropped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        match self {
            Self::Scalable(f) => f.draw(canvas, x, y, text, color),
            Self::Bitmap(f) => f.draw(canvas, x, y, text, color),
        }
    }
}

pub enum FontResolution {
    Loaded(FontHandle),
    Fallback(FontHandle),
    Unavailable,
}

/// Pixel size for captions on an image of the given height.
pub fn font_pixel_size(image_height: u32) -> u32 {
    (image_height / FONT_SIZE_DIVISOR).max(1)
}

pub fn resolve_font(path: &str, image_height: u32, fallback: FontFallback) -> FontResolution {
    let px = font_pixel_size(image_height);

    match ScalableFont::load(path, px) {
        Ok(font) => {
            debug!(path, px, source = %font.source().display(), "loaded font");
            return FontResolution::Loaded(FontHandle::Scalable(font));
        }
        Err(err) => warn!(path, %err, "font not found, using fallback font"),
    }

    match fallback {
        FontFallback::Builtin => {
            let font = BitmapFont::default();
            debug!(px = font.pixel_size(), "using built-in bitmap font");
            FontResolution::Fallback(FontHandle::Bitmap(font))
        }
        FontFallback::Disabled => {
            warn!("could not load fallback font");
            FontResolution::Unavailable
        }
    }
}

pub(crate) fn put_pixel_clipped(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    canvas.put_pixel(x as u32, y as u32, color);
}

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use tracing::debug;

/// Pixel representation of a buffer, coarse enough to decide whether it can
/// take arbitrary RGB values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Greyscale,
    GreyscaleAlpha,
    Rgb,
    Rgba,
    Other,
}

impl ColorMode {
    pub fn of(img: &DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => Self::Greyscale,
            DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => Self::GreyscaleAlpha,
            DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgb32F(_) => Self::Rgb,
            DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgba32F(_) => Self::Rgba,
            _ => Self::Other,
        }
    }
}

/// True only for 8-bit RGB, the one layout the overlay stage draws into.
pub fn is_rgb8(img: &DynamicImage) -> bool {
    matches!(img, DynamicImage::ImageRgb8(_))
}

/// Promote any buffer to 8-bit RGB.
///
/// Greyscale duplicates the luminance value across channels. Alpha is
/// dropped without compositing. Deeper samples are scaled down to 8 bits.
pub fn ensure_rgb(img: DynamicImage) -> DynamicImage {
    if is_rgb8(&img) {
        return img;
    }
    debug!(from = ?ColorMode::of(&img), "promoting to rgb8");
    DynamicImage::ImageRgb8(img.into_rgb8())
}

/// ITU-R 601-2 luma in 16.16 fixed point, rounded.
pub fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    let l = r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000;
    (l >> 16) as u8
}

/// Collapse RGB to a single luminance channel.
pub fn rgb_to_luma(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let Rgb([r, g, b]) = *img.get_pixel(x, y);
        Luma([luma_601(r, g, b)])
    })
}

/// Parse a color given as `R,G,B` or `#RRGGBB`.
pub fn parse_rgb(s: &str) -> Option<Rgb<u8>> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Rgb([channel(0)?, channel(2)?, channel(4)?]));
    }

    let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb([r, g, b]))
}

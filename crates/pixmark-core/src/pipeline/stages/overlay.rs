use image::DynamicImage;
use tracing::{debug, warn};

use crate::color::ensure_rgb;
use crate::font::{FontFallback, FontResolution, TextExtent, resolve_font};
use crate::params::{OverlayRequest, ProcessParams};
use crate::pipeline::stage::Stage;

/// Gap between the bottom of the text and the bottom edge of the image.
pub const BOTTOM_PADDING: i64 = 10;

pub struct Overlay;

impl Stage for Overlay {
    fn name(&self) -> &str {
        "overlay"
    }

    fn process(&self, input: DynamicImage, params: &ProcessParams) -> DynamicImage {
        apply_overlay(input, params.overlay.as_ref(), params.font_fallback)
    }
}

/// Top-left of the text layout box on the canvas. Either coordinate may be
/// negative when the text is larger than the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

/// Bottom-center placement.
pub fn place_text(canvas_width: u32, canvas_height: u32, extent: TextExtent) -> Placement {
    let x = (canvas_width as i64 - extent.width as i64).div_euclid(2);
    let y = canvas_height as i64 - extent.height as i64 - BOTTOM_PADDING;
    Placement {
        x: x as i32,
        y: y as i32,
    }
}

/// Stamp the requested text at the bottom center of the image.
///
/// With no request, or when no font at all can be loaded, the input comes
/// back untouched.
pub fn apply_overlay(
    input: DynamicImage,
    request: Option<&OverlayRequest>,
    fallback: FontFallback,
) -> DynamicImage {
    let Some(request) = request.filter(|r| !r.text.is_empty()) else {
        return input;
    };

    let font = match resolve_font(&request.font_path, input.height(), fallback) {
        FontResolution::Loaded(font) | FontResolution::Fallback(font) => font,
        FontResolution::Unavailable => {
            warn!("font not available, skipping text overlay");
            return input;
        }
    };

    let mut canvas = ensure_rgb(input).into_rgb8();
    let extent = font.measure(&request.text);
    let at = place_text(canvas.width(), canvas.height(), extent);
    debug!(
        text = %request.text,
        px = font.pixel_size(),
        text_width = extent.width,
        text_height = extent.height,
        x = at.x,
        y = at.y,
        "drawing overlay"
    );
    font.draw(&mut canvas, at.x, at.y, &request.text, request.color);
    DynamicImage::ImageRgb8(canvas)
}

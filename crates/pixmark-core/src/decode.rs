use std::io::Cursor;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::color::ColorMode;
use crate::error::{Failure, PixmarkResult};

/// Decode an in-memory encoded image. The container format is sniffed from
/// the leading bytes, never from a file name or content type.
pub fn decode(bytes: &[u8]) -> PixmarkResult<DynamicImage> {
    let t0 = std::time::Instant::now();

    if bytes.is_empty() {
        return Err(Failure::decode("payload is empty"));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Failure::decode(format!("cannot sniff format: {e}")))?;
    let format = reader
        .format()
        .ok_or_else(|| Failure::decode("payload is not a recognized image format"))?;
    let img = reader
        .decode()
        .map_err(|e| Failure::decode(format!("{format:?}: {e}")))?;

    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        ?format,
        mode = ?ColorMode::of(&img),
        width = img.width(),
        height = img.height(),
        "image decode"
    );
    Ok(img)
}

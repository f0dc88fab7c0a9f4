// Output encoding.
//
// save() picks the container from the file extension:
// - .png  (lossless, default for captions)
// - .jpg / .jpeg (lossy, no alpha)
// - .bmp
// - .tif / .tiff

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use pixmark_core::color::ensure_rgb;
use pixmark_core::{Failure, PixmarkResult};
use tracing::{debug, info};

/// Map a file extension to an output container.
pub fn format_for_path(path: &Path) -> PixmarkResult<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "bmp" => Ok(ImageFormat::Bmp),
        "tif" | "tiff" => Ok(ImageFormat::Tiff),
        _ => Err(Failure::write(format!(
            "unsupported extension '.{ext}' for {}; supported: .png .jpg .bmp .tiff",
            path.display()
        ))),
    }
}

/// Encode into memory.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> PixmarkResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let result = match format {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg if img.color().has_alpha() => ensure_rgb(img.clone())
            .write_to(&mut Cursor::new(&mut bytes), format),
        _ => img.write_to(&mut Cursor::new(&mut bytes), format),
    };
    result.map_err(|e| Failure::write(format!("encode {format:?}: {e}")))?;
    debug!(?format, size = bytes.len(), "encoded output");
    Ok(bytes)
}

/// Encode and write `img` to `path`, creating parent directories.
///
/// The image is fully encoded before the file is created, so an encoding
/// failure never leaves a partial file behind.
pub fn save(img: &DynamicImage, path: &Path) -> PixmarkResult<PathBuf> {
    let format = format_for_path(path)?;
    let bytes = encode(img, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| Failure::write(format!("create {}: {e}", parent.display())))?;
    }
    fs::write(path, &bytes).map_err(|e| Failure::write(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), width = img.width(), height = img.height(), "image saved");
    Ok(path.to_path_buf())
}

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use rusttype::{Font, PositionedGlyph, Scale, point};
use tracing::debug;

use super::{LINE_SPACING, TextExtent, put_pixel_clipped};

/// Glyph coverage at or above this is painted; below is left alone.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// How deep to descend into system font directories.
const MAX_SEARCH_DEPTH: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum FontLoadError {
    #[error("no font file named '{0}' found")]
    NotFound(String),

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not a usable TrueType/OpenType font", .0.display())]
    Invalid(PathBuf),
}

/// A TrueType/OpenType font rendered at a fixed pixel size.
pub struct ScalableFont {
    font: Font<'static>,
    px: u32,
    source: PathBuf,
}

impl ScalableFont {
    /// Load a font file. A relative name that does not exist as given is
    /// looked up in the system font directories.
    pub fn load(path: &str, px: u32) -> Result<Self, FontLoadError> {
        let source = locate(path).ok_or_else(|| FontLoadError::NotFound(path.to_string()))?;
        let data = fs::read(&source).map_err(|e| FontLoadError::Read {
            path: source.clone(),
            source: e,
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| FontLoadError::Invalid(source.clone()))?;
        Ok(Self { font, px, source })
    }

    pub fn pixel_size(&self) -> u32 {
        self.px
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    fn scale(&self) -> Scale {
        Scale::uniform(self.px as f32)
    }

    /// Distance between the origins of consecutive lines: the bottom of a
    /// capital letter plus [`LINE_SPACING`].
    fn line_advance(&self) -> f32 {
        let scale = self.scale();
        let ascent = self.font.v_metrics(scale).ascent;
        let cap_bottom = self
            .font
            .glyph('A')
            .scaled(scale)
            .positioned(point(0.0, ascent))
            .pixel_bounding_box()
            .map_or(ascent, |bb| bb.max.y as f32);
        cap_bottom + LINE_SPACING as f32
    }

    /// Lay out every line of `text` with the first line's origin (top of
    /// the ascender line) at (`x`, `y`).
    fn layout_lines(&self, text: &str, x: f32, y: f32) -> Vec<PositionedGlyph<'static>> {
        let scale = self.scale();
        let ascent = self.font.v_metrics(scale).ascent;
        let advance = self.line_advance();
        text.split('\n')
            .enumerate()
            .flat_map(|(i, line)| {
                let origin = point(x, y + ascent + i as f32 * advance);
                self.font.layout(line, scale, origin)
            })
            .collect()
    }

    /// Ink box of the laid-out glyphs relative to the layout origin. The
    /// ink itself starts at the first glyph's bearings, not at the origin.
    pub fn measure(&self, text: &str) -> TextExtent {
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for glyph in self.layout_lines(text, 0.0, 0.0) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            bounds = Some(match bounds {
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                Some((x0, y0, x1, y1)) => (
                    x0.min(bb.min.x),
                    y0.min(bb.min.y),
                    x1.max(bb.max.x),
                    y1.max(bb.max.y),
                ),
            });
        }

        match bounds {
            Some((x0, y0, x1, y1)) => TextExtent {
                width: (x1 - x0) as u32,
                height: (y1 - y0) as u32,
            },
            None => TextExtent::default(),
        }
    }

    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        for glyph in self.layout_lines(text, x as f32, y as f32) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                if v >= COVERAGE_THRESHOLD {
                    let px = bb.min.x as i64 + gx as i64;
                    let py = bb.min.y as i64 + gy as i64;
                    put_pixel_clipped(canvas, px, py, color);
                }
            });
        }
    }
}

/// Resolve a font reference to an existing file.
fn locate(path: &str) -> Option<PathBuf> {
    let given = Path::new(path);
    if given.is_file() {
        return Some(given.to_path_buf());
    }
    if path.is_empty() || given.is_absolute() {
        return None;
    }

    let name = given.file_name()?;
    for dir in system_font_dirs() {
        let direct = dir.join(given);
        if direct.is_file() {
            return Some(direct);
        }
        if let Some(found) = find_file(&dir, name, MAX_SEARCH_DEPTH) {
            debug!(path, found = %found.display(), "font located in system directory");
            return Some(found);
        }
    }
    None
}

fn system_font_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::font_dir() {
        candidates.push(dir);
    }
    if let Some(dir) = dirs::data_dir() {
        candidates.push(dir.join("fonts"));
    }
    for dir in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
    ] {
        candidates.push(PathBuf::from(dir));
    }
    if let Some(windir) = std::env::var_os("WINDIR") {
        candidates.push(PathBuf::from(windir).join("Fonts"));
    }
    candidates.retain(|d| d.is_dir());
    candidates
}

fn find_file(dir: &Path, name: &std::ffi::OsStr, depth: usize) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name() == Some(name) {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|sub| find_file(sub, name, depth - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::TEST_FONT;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    /// Inclusive (min_x, min_y, max_x, max_y) of painted pixels.
    fn ink_bounds(canvas: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == RED.0)
            .fold(None, |acc, (x, y, _)| match acc {
                None => Some((x, y, x, y)),
                Some((x0, y0, x1, y1)) => {
                    Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y)))
                }
            })
    }

    fn bundled(px: u32) -> ScalableFont {
        ScalableFont::load(TEST_FONT, px).unwrap()
    }

    #[test]
    fn bundled_font_loads_from_file() {
        let font = bundled(13);
        assert_eq!(font.pixel_size(), 13);
        assert_eq!(font.source(), Path::new(TEST_FONT));
    }

    #[test]
    fn measure_is_ink_box_no_taller_than_pixel_size() {
        let font = bundled(20);
        let extent = font.measure("TEST");
        assert!(extent.width > extent.height);
        assert!(extent.height > 0 && extent.height <= 20);
        assert_eq!(font.measure(""), TextExtent::default());
        assert_eq!(font.measure("   "), TextExtent::default());
    }

    #[test]
    fn drawn_ink_matches_measured_size() {
        let font = bundled(20);
        let extent = font.measure("TEST");
        let mut canvas = RgbImage::new(200, 60);
        font.draw(&mut canvas, 30, 10, "TEST", RED);

        let (x0, y0, x1, y1) = ink_bounds(&canvas).unwrap();
        // Threshold rendering can trim a partially covered edge column/row.
        assert!((x1 - x0 + 1).abs_diff(extent.width) <= 2);
        assert!((y1 - y0 + 1).abs_diff(extent.height) <= 2);
        // Ink sits at the glyph bearings, just inside the layout origin.
        assert!(x0 >= 30 && x0 <= 33);
        assert!(y0 > 10 && y0 < 10 + 20);
    }

    #[test]
    fn newline_starts_a_second_line() {
        let font = bundled(20);
        let one = font.measure("A");
        let two = font.measure("A\nA");
        assert_eq!(two.width, one.width);
        assert!(two.height >= 2 * one.height + LINE_SPACING);

        let mut single = RgbImage::new(80, 80);
        font.draw(&mut single, 10, 5, "A", RED);
        let mut stacked = RgbImage::new(80, 80);
        font.draw(&mut stacked, 10, 5, "A\nA", RED);

        let (sx0, _, sx1, sy1) = ink_bounds(&single).unwrap();
        let (tx0, _, tx1, ty1) = ink_bounds(&stacked).unwrap();
        assert_eq!((tx0, tx1), (sx0, sx1));
        assert!(ty1 > sy1 + one.height);
        // A blank row separates the two lines.
        let gap = sy1 + 1;
        assert!((0..80).all(|x| stacked.get_pixel(x, gap).0 != RED.0));
    }

    #[test]
    fn missing_absolute_path_is_not_found() {
        let err = ScalableFont::load("/nonexistent/NoSuchFont.ttf", 12).err().unwrap();
        assert!(matches!(err, FontLoadError::NotFound(_)));
        assert!(err.to_string().contains("NoSuchFont.ttf"));
    }

    #[test]
    fn empty_path_is_not_found() {
        assert!(matches!(
            ScalableFont::load("", 12),
            Err(FontLoadError::NotFound(_))
        ));
    }

    #[test]
    fn garbage_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, [0u8; 64]).unwrap();
        let err = ScalableFont::load(path.to_str().unwrap(), 12).err().unwrap();
        assert!(matches!(err, FontLoadError::Invalid(_)));
    }

    #[test]
    fn find_file_descends_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("family");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Caption.ttf"), b"x").unwrap();

        let found = find_file(dir.path(), std::ffi::OsStr::new("Caption.ttf"), 4).unwrap();
        assert_eq!(found, nested.join("Caption.ttf"));
        assert!(find_file(dir.path(), std::ffi::OsStr::new("Caption.ttf"), 0).is_none());
    }

    #[test]
    fn locate_accepts_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.ttf");
        fs::write(&path, b"x").unwrap();
        assert_eq!(locate(path.to_str().unwrap()), Some(path));
    }
}

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::font::FontFallback;

pub const DEFAULT_TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const DEFAULT_FONT_PATH: &str = "DejaVuSans.ttf";

/// Which single filter to run.
///
/// Parsing never fails: a name that matches nothing becomes
/// `Unrecognized`, which the filter stage treats as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterKind {
    #[default]
    None,
    Blur,
    Grayscale,
    Unsharp,
    Unrecognized(String),
}

impl FilterKind {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Self::None,
            "blur" => Self::Blur,
            "grayscale" => Self::Grayscale,
            "unsharp" => Self::Unsharp,
            _ => Self::Unrecognized(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Blur => "blur",
            Self::Grayscale => "grayscale",
            Self::Unsharp => "unsharp",
            Self::Unrecognized(name) => name,
        }
    }
}

impl FromStr for FilterKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for FilterKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<FilterKind> for String {
    fn from(kind: FilterKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text to stamp at the bottom center of the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayRequest {
    pub text: String,
    pub color: Rgb<u8>,
    /// Path or bare file name of a TrueType/OpenType font.
    pub font_path: String,
}

impl OverlayRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: DEFAULT_TEXT_COLOR,
            font_path: DEFAULT_FONT_PATH.to_string(),
        }
    }

    pub fn with_color(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_font_path(mut self, font_path: impl Into<String>) -> Self {
        self.font_path = font_path.into();
        self
    }
}

/// Everything one pipeline run needs besides the pixels.
#[derive(Clone, Debug, Default)]
pub struct ProcessParams {
    pub filter: FilterKind,
    pub overlay: Option<OverlayRequest>,
    pub font_fallback: FontFallback,
}

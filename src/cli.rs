use std::path::PathBuf;

use clap::Parser;
use pixmark_core::color::parse_rgb;
use pixmark_core::image::Rgb;

/// Fetch an image, optionally filter it, stamp a caption and save it.
///
/// Flags override values from the config file.
#[derive(Parser, Debug)]
#[command(name = "pixmark", author, version, about, long_about = None)]
pub struct Cli {
    /// Image URL to fetch
    pub url: Option<String>,

    /// Filter to apply (none, blur, grayscale, unsharp)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Caption drawn at the bottom center
    #[arg(short, long)]
    pub text: Option<String>,

    /// Caption color as R,G,B or #RRGGBB
    #[arg(short, long, value_parser = parse_color)]
    pub color: Option<Rgb<u8>>,

    /// TrueType/OpenType font file or name
    #[arg(long)]
    pub font: Option<String>,

    /// Output file; the extension picks the format
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the caption instead of using the built-in font when the font is missing
    #[arg(long, default_value_t = false)]
    pub no_fallback_font: bool,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_color(s: &str) -> Result<Rgb<u8>, String> {
    parse_rgb(s).ok_or_else(|| format!("invalid color '{s}', expected R,G,B or #RRGGBB"))
}

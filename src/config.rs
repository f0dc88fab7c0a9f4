use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pixmark_core::font::FontFallback;
use pixmark_core::image::Rgb;
use pixmark_core::params::{DEFAULT_FONT_PATH, DEFAULT_TEXT_COLOR};
use pixmark_core::{FilterKind, OverlayRequest, ProcessParams};
use pixmark_fetch::FetchOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cli::Cli;

pub const SAMPLE_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/mikolalysenko/lena/master/lena.png";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub url: String,
    pub filter_type: FilterKind,
    pub text_overlay: Option<String>,
    pub text_color: [u8; 3],
    pub font_path: String,
    pub output: PathBuf,
    /// Use the built-in bitmap font when `font_path` cannot be loaded.
    pub fallback_font: bool,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: SAMPLE_IMAGE_URL.to_string(),
            filter_type: FilterKind::None,
            text_overlay: None,
            text_color: DEFAULT_TEXT_COLOR.0,
            font_path: DEFAULT_FONT_PATH.to_string(),
            output: PathBuf::from("filtered_image_with_text.png"),
            fallback_font: true,
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// `<config dir>/pixmark/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pixmark").join("config.json"))
    }

    /// Load from an explicit path, which must exist, or from the default
    /// location if a file is there. Unparseable files fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(p) => p,
                None => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("read config: {}", path.display()))?;
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot parse config, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Command-line values win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.url = url.clone();
        }
        if let Some(filter) = &cli.filter {
            self.filter_type = FilterKind::parse(filter);
        }
        if let Some(text) = &cli.text {
            self.text_overlay = Some(text.clone());
        }
        if let Some(color) = cli.color {
            self.text_color = color.0;
        }
        if let Some(font) = &cli.font {
            self.font_path = font.clone();
        }
        if let Some(output) = &cli.output {
            self.output = output.clone();
        }
        if cli.no_fallback_font {
            self.fallback_font = false;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
    }

    pub fn process_params(&self) -> ProcessParams {
        let overlay = self
            .text_overlay
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|text| {
                OverlayRequest::new(text)
                    .with_color(Rgb(self.text_color))
                    .with_font_path(self.font_path.clone())
            });
        ProcessParams {
            filter: self.filter_type.clone(),
            overlay,
            font_fallback: if self.fallback_font {
                FontFallback::Builtin
            } else {
                FontFallback::Disabled
            },
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }
}

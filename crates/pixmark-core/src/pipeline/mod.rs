pub mod stage;
pub mod stages;

use image::DynamicImage;
use tracing::debug;

use crate::decode::decode;
use crate::error::PixmarkResult;
use crate::params::ProcessParams;
use stage::Stage;

/// Processing pipeline that runs each stage once, in order.
///
/// ```text
/// bytes -> decode -> filter -> overlay -> RGB buffer
/// ```
///
/// Only decoding can fail. The stages degrade instead: an unknown filter
/// is skipped, a missing font falls back or skips the caption.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: vec![Box::new(stages::Filter), Box::new(stages::Overlay)],
        }
    }

    /// Decode an encoded image and run every stage on it.
    pub fn process(&self, raw: &[u8], params: &ProcessParams) -> PixmarkResult<DynamicImage> {
        let img = decode(raw)?;
        Ok(self.process_image(img, params))
    }

    /// Run every stage on an already decoded image.
    pub fn process_image(&self, input: DynamicImage, params: &ProcessParams) -> DynamicImage {
        let mut current = input;
        for stage in &self.stages {
            let t0 = std::time::Instant::now();
            current = stage.process(current, params);
            debug!(
                stage = stage.name(),
                elapsed_ms = t0.elapsed().as_millis(),
                "processed"
            );
        }
        current
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot convenience over [`Pipeline::process`].
pub fn process(raw: &[u8], params: &ProcessParams) -> PixmarkResult<DynamicImage> {
    Pipeline::new().process(raw, params)
}

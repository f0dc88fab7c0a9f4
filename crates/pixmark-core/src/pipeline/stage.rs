use image::DynamicImage;

use crate::params::ProcessParams;

/// A single step in the processing pipeline.
///
/// Stages never fail. Anything a stage cannot do is logged and the buffer
/// is passed on with reduced processing.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;
    fn process(&self, input: DynamicImage, params: &ProcessParams) -> DynamicImage;
}

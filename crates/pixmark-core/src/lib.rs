pub mod color;
pub mod decode;
pub mod error;
pub mod font;
pub mod params;
pub mod pipeline;

pub use error::{Failure, PixmarkResult};
pub use image;
pub use params::{FilterKind, OverlayRequest, ProcessParams};
pub use pipeline::Pipeline;

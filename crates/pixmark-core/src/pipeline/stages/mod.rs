mod filter;
mod overlay;

pub use filter::{
    BLUR_RADIUS, Filter, UNSHARP_PERCENT, UNSHARP_RADIUS, UNSHARP_THRESHOLD, apply_filter,
};
pub use overlay::{BOTTOM_PADDING, Overlay, Placement, apply_overlay, place_text};

use image::{DynamicImage, RgbImage};
use tracing::{debug, warn};

use crate::color::{ensure_rgb, rgb_to_luma};
use crate::params::{FilterKind, ProcessParams};
use crate::pipeline::stage::Stage;

/// Gaussian standard deviation for `blur`, in source pixels.
pub const BLUR_RADIUS: f32 = 5.0;
pub const UNSHARP_RADIUS: f32 = 5.0;
/// Strength of the sharpening, as a percentage of the high-pass detail.
pub const UNSHARP_PERCENT: i32 = 150;
/// Detail smaller than this (per channel, 0-255) is left untouched.
pub const UNSHARP_THRESHOLD: i32 = 3;

pub struct Filter;

impl Stage for Filter {
    fn name(&self) -> &str {
        "filter"
    }

    fn process(&self, input: DynamicImage, params: &ProcessParams) -> DynamicImage {
        apply_filter(input, &params.filter)
    }
}

/// Run the selected filter. The result is always 8-bit RGB with the input's
/// dimensions, whichever branch ran.
pub fn apply_filter(input: DynamicImage, kind: &FilterKind) -> DynamicImage {
    let output = match kind {
        FilterKind::None => input,
        FilterKind::Blur => input.blur(BLUR_RADIUS),
        FilterKind::Grayscale => grayscale(input),
        FilterKind::Unsharp => DynamicImage::ImageRgb8(unsharp_mask(
            input.into_rgb8(),
            UNSHARP_RADIUS,
            UNSHARP_PERCENT,
            UNSHARP_THRESHOLD,
        )),
        FilterKind::Unrecognized(name) => {
            warn!(filter = %name, "unknown filter, no filter applied");
            input
        }
    };
    debug!(filter = %kind, width = output.width(), height = output.height(), "filter applied");
    ensure_rgb(output)
}

/// Luminance only, stored as RGB so colored text can still be drawn on it.
fn grayscale(input: DynamicImage) -> DynamicImage {
    let luma = rgb_to_luma(&input.into_rgb8());
    DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(luma).into_rgb8())
}

fn unsharp_mask(input: RgbImage, radius: f32, percent: i32, threshold: i32) -> RgbImage {
    let blurred = image::imageops::blur(&input, radius);
    let mut output = input;
    for (px, &soft) in output.iter_mut().zip(blurred.iter()) {
        let diff = *px as i32 - soft as i32;
        if diff.abs() >= threshold {
            *px = (*px as i32 + diff * percent / 100).clamp(0, 255) as u8;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorMode, is_rgb8};
    use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage};

    fn checkerboard(w: u32, h: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([230, 40, 40])
            } else {
                Rgb([20, 60, 200])
            }
        }))
    }

    fn all_kinds() -> Vec<FilterKind> {
        vec![
            FilterKind::None,
            FilterKind::Blur,
            FilterKind::Grayscale,
            FilterKind::Unsharp,
            FilterKind::Unrecognized("sepia".into()),
        ]
    }

    #[test]
    fn every_filter_preserves_dimensions() {
        for kind in all_kinds() {
            let out = apply_filter(checkerboard(37, 21, 4), &kind);
            assert_eq!((out.width(), out.height()), (37, 21), "filter {kind}");
        }
    }

    #[test]
    fn every_filter_yields_rgb8() {
        let inputs = [
            DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([90]))),
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 128]))),
            checkerboard(8, 8, 2),
        ];
        for kind in all_kinds() {
            for input in &inputs {
                let out = apply_filter(input.clone(), &kind);
                assert!(is_rgb8(&out), "filter {kind} from {:?}", ColorMode::of(input));
            }
        }
    }

    #[test]
    fn none_is_identity_for_rgb() {
        let input = checkerboard(10, 10, 3);
        let out = apply_filter(input.clone(), &FilterKind::None);
        assert_eq!(out.as_rgb8(), input.as_rgb8());
    }

    #[test]
    fn unknown_filter_matches_none() {
        let input = checkerboard(16, 16, 4);
        let sepia = apply_filter(input.clone(), &FilterKind::parse("sepia"));
        let none = apply_filter(input, &FilterKind::parse("none"));
        assert_eq!(sepia.as_rgb8(), none.as_rgb8());
    }

    #[test]
    fn unknown_filter_on_greyscale_still_promotes() {
        let input = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([33])));
        let out = apply_filter(input, &FilterKind::parse("posterize"));
        assert!(out.as_rgb8().unwrap().pixels().all(|p| p.0 == [33, 33, 33]));
    }

    #[test]
    fn grayscale_is_achromatic() {
        let out = apply_filter(checkerboard(12, 12, 3), &FilterKind::Grayscale);
        for p in out.as_rgb8().unwrap().pixels() {
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
        }
    }

    #[test]
    fn grayscale_uses_luma_weights() {
        let input = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])));
        let out = apply_filter(input, &FilterKind::Grayscale);
        assert_eq!(out.as_rgb8().unwrap().get_pixel(0, 0).0, [76, 76, 76]);
    }

    #[test]
    fn blur_smooths_edges() {
        let input = checkerboard(64, 64, 16);
        let out = apply_filter(input.clone(), &FilterKind::Blur);
        assert_ne!(out.as_rgb8(), input.as_rgb8());
        // Right at a cell boundary the two colors must have mixed.
        let p = out.as_rgb8().unwrap().get_pixel(16, 8).0;
        assert!(p[0] > 20 && p[0] < 230, "red channel not mixed: {p:?}");
    }

    #[test]
    fn blur_keeps_greyscale_values_achromatic() {
        let input = DynamicImage::ImageLuma8(GrayImage::from_fn(20, 20, |x, _| {
            Luma([if x < 10 { 0 } else { 255 }])
        }));
        let out = apply_filter(input, &FilterKind::Blur);
        for p in out.as_rgb8().unwrap().pixels() {
            assert!(p.0[0] == p.0[1] && p.0[1] == p.0[2]);
        }
    }

    #[test]
    fn unsharp_increases_edge_contrast() {
        let input = RgbImage::from_fn(40, 10, |x, _| {
            if x < 20 {
                Rgb([100, 100, 100])
            } else {
                Rgb([150, 150, 150])
            }
        });
        let out = unsharp_mask(input, UNSHARP_RADIUS, UNSHARP_PERCENT, UNSHARP_THRESHOLD);
        assert!(out.get_pixel(19, 5).0[0] < 100);
        assert!(out.get_pixel(20, 5).0[0] > 150);
    }

    #[test]
    fn unsharp_leaves_flat_regions_alone() {
        let input = RgbImage::from_pixel(30, 30, Rgb([120, 80, 40]));
        let out = unsharp_mask(input.clone(), UNSHARP_RADIUS, UNSHARP_PERCENT, UNSHARP_THRESHOLD);
        assert_eq!(out, input);
    }

    #[test]
    fn unsharp_clamps_to_range() {
        let input = RgbImage::from_fn(20, 4, |x, _| {
            if x < 10 {
                Rgb([5, 5, 5])
            } else {
                Rgb([250, 250, 250])
            }
        });
        let out = unsharp_mask(input, UNSHARP_RADIUS, 500, 0);
        assert_eq!(out.get_pixel(9, 1).0[0], 0);
        assert_eq!(out.get_pixel(10, 1).0[0], 255);
    }

    #[test]
    fn stage_reads_filter_from_params() {
        let params = ProcessParams {
            filter: FilterKind::Grayscale,
            ..Default::default()
        };
        let out = Filter.process(checkerboard(6, 6, 2), &params);
        let p = out.as_rgb8().unwrap().get_pixel(0, 0).0;
        assert!(p[0] == p[1] && p[1] == p[2]);
        assert_eq!(Filter.name(), "filter");
    }
}

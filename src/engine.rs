// src/engine.rs
//
// The core of convert-my-image. One conversion:
// 1. Decodes the source bytes into a raster
// 2. Computes the target box from the resize policy
// 3. Draws the source onto a surface of that size
// 4. Encodes the surface and parks the bytes in a revocable blob
//
// This file is a facade that wires up the modules in engine/

// =============================================================================
// LIMITS AND CONSTANTS
// =============================================================================

/// Maximum allowed image dimension (width or height), for sources and surfaces.
/// Matches the largest canvas side browsers will allocate.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 400MB uncompressed RGBA.
pub const MAX_PIXELS: u64 = 100_000_000;

/// Encoder quality factor for JPEG and WebP (PNG ignores it).
pub const DEFAULT_QUALITY: f32 = 0.9;

/// Appended to the source stem when naming outputs.
pub const OUTPUT_SUFFIX: &str = "_vibed";

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod batch;
mod codec;
mod common;
mod config;
mod decoder;
mod encoder;
mod geometry;
mod result;
mod session;
mod source;
mod surface;
mod transformer;

pub use batch::{progress_percent, run_batch, BatchReport, Progress};
pub use codec::{DecodedImage, DrawSurface, ImageCodec, NativeCodec, RasterHandle};
pub use common::{run_with_panic_policy, EngineResult};
pub use config::{DecodeLimits, TransformerConfig};
pub use decoder::{decode_image, detect_format};
pub use encoder::{encode, encode_jpeg, encode_png, encode_webp, quality_to_percent};
pub use geometry::{centered_offset, cover_source_rect, source_rect, target_dimensions, Rect};
pub use result::{format_size, ConversionResult, ItemOutcome, ResultList};
pub use session::ConversionSession;
pub use source::{output_file_name, SourceImage};
pub use surface::RasterSurface;
pub use transformer::ImageTransformer;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::ResizePolicy;

    mod target_dimension_tests {
        use super::*;

        #[test]
        fn test_original_keeps_source_size() {
            assert_eq!(
                target_dimensions(1000, 800, &ResizePolicy::Original),
                (1000, 800)
            );
        }

        #[test]
        fn test_explicit_ignores_aspect_ratio() {
            let policy = ResizePolicy::ExplicitDimensions {
                width: 300,
                height: 900,
            };
            assert_eq!(target_dimensions(1000, 500, &policy), (300, 900));
            assert_eq!(target_dimensions(10, 10, &policy), (300, 900));
        }

        #[test]
        fn test_wider_source_keeps_height() {
            // 1920x1080 is wider than 1:1 -> keep height, width = 1080 * 1
            let (w, h) = target_dimensions(1920, 1080, &ResizePolicy::FixedRatio(1.0));
            assert_eq!((w, h), (1080, 1080));
        }

        #[test]
        fn test_taller_source_keeps_width() {
            // 1080x1920 is narrower than 16:9 -> keep width, height = 1080 / (16/9)
            let (w, h) =
                target_dimensions(1080, 1920, &ResizePolicy::FixedRatio(16.0 / 9.0));
            assert_eq!(w, 1080);
            assert_eq!(h, 608); // 607.5 rounds up
        }

        #[test]
        fn test_story_from_landscape() {
            // 1000 * 9/16 = 562.5 -> 563
            let (w, h) =
                target_dimensions(2000, 1000, &ResizePolicy::FixedRatio(9.0 / 16.0));
            assert_eq!((w, h), (563, 1000));
        }

        #[test]
        fn test_equal_ratio_takes_else_branch() {
            // 1600x900 has exactly 16:9 -> width kept, height recomputed
            let (w, h) =
                target_dimensions(1600, 900, &ResizePolicy::FixedRatio(16.0 / 9.0));
            assert_eq!((w, h), (1600, 900));
        }

        #[test]
        fn test_fit_never_exceeds_source() {
            for (sw, sh) in [(1, 1), (7, 3), (3, 7), (640, 480), (480, 640)] {
                for ratio in [9.0 / 16.0, 1.0, 16.0 / 9.0, 0.1, 10.0] {
                    let (w, h) = target_dimensions(sw, sh, &ResizePolicy::FixedRatio(ratio));
                    assert!(w <= sw && h <= sh, "{sw}x{sh} @ {ratio} -> {w}x{h}");
                }
            }
        }

        #[test]
        fn test_tiny_sides_round_to_zero() {
            let (w, h) = target_dimensions(1, 1, &ResizePolicy::FixedRatio(0.4));
            assert_eq!((w, h), (0, 1));
            let (w, h) = target_dimensions(1, 1, &ResizePolicy::FixedRatio(2.5));
            assert_eq!((w, h), (1, 0));
        }
    }

    mod composite_tests {
        use super::*;
        use crate::ops::CompositeMode;

        #[test]
        fn test_centered_offset() {
            assert_eq!(centered_offset(200, 100, 100, 100), (50.0, 0.0));
            assert_eq!(centered_offset(100, 300, 100, 100), (0.0, 100.0));
            // Upscaling yields a negative offset
            assert_eq!(centered_offset(10, 10, 20, 30), (-5.0, -10.0));
        }

        #[test]
        fn test_stretch_uses_whole_source() {
            let rect = source_rect(CompositeMode::Stretch, 200, 100, 100, 100);
            assert_eq!(rect, Rect::new(0.0, 0.0, 200.0, 100.0));
        }

        #[test]
        fn test_cover_crop_matches_centered_offset_for_fixed_ratio() {
            let (tw, th) = target_dimensions(200, 100, &ResizePolicy::FixedRatio(1.0));
            let rect = source_rect(CompositeMode::CoverCrop, 200, 100, tw, th);
            let (ox, oy) = centered_offset(200, 100, tw, th);
            assert_eq!(rect, Rect::new(ox, oy, tw as f64, th as f64));
        }

        #[test]
        fn test_cover_crop_for_explicit_upscale() {
            // 100x100 source into 400x200: crop a centered 100x50 band
            let rect = cover_source_rect(100, 100, 400, 200);
            assert_eq!(rect, Rect::new(0.0, 25.0, 100.0, 50.0));
        }
    }
}

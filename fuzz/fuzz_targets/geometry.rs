#![no_main]

//! Fuzz target for target-box arithmetic and option parsing.

use arbitrary::Arbitrary;
use convert_my_image::engine::{cover_source_rect, target_dimensions};
use convert_my_image::{ConvertOptions, ResizePolicy};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct GeometrySeed {
    src_w: u32,
    src_h: u32,
    ratio: f64,
    custom_width: String,
    custom_height: String,
}

fuzz_target!(|seed: GeometrySeed| {
    let src_w = seed.src_w.max(1);
    let src_h = seed.src_h.max(1);

    let policy = ResizePolicy::FixedRatio(seed.ratio);
    if policy.validate().is_ok() {
        let (w, h) = target_dimensions(src_w, src_h, &policy);
        assert!(w == src_w || h == src_h);

        if w > 0 && h > 0 {
            let rect = cover_source_rect(src_w, src_h, w, h);
            assert!(rect.width <= src_w as f64 + 1.0 && rect.height <= src_h as f64 + 1.0);
        }
    }

    let options = ConvertOptions::default().with_custom_size(seed.custom_width, seed.custom_height);
    if let Ok((ResizePolicy::ExplicitDimensions { width, height }, _)) = options.resolve() {
        assert!(width >= 1 && height >= 1);
    }
});

use convert_my_image::engine::{
    centered_offset, cover_source_rect, output_file_name, progress_percent, target_dimensions,
};
use convert_my_image::ops::parse_int_prefix;
use convert_my_image::{ErrorKind, OutputFormat, ResizePolicy};
use proptest::prelude::*;

fn ratio_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(9.0 / 16.0),
        Just(1.0),
        Just(16.0 / 9.0),
        0.05f64..20.0,
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_original_keeps_source_size(w in 1u32..=20_000, h in 1u32..=20_000) {
        prop_assert_eq!(target_dimensions(w, h, &ResizePolicy::Original), (w, h));
    }

    #[test]
    fn prop_explicit_ignores_source(
        w in 1u32..=20_000,
        h in 1u32..=20_000,
        tw in 1u32..=20_000,
        th in 1u32..=20_000,
    ) {
        let policy = ResizePolicy::ExplicitDimensions { width: tw, height: th };
        prop_assert_eq!(target_dimensions(w, h, &policy), (tw, th));
    }

    #[test]
    fn prop_fixed_ratio_fits_within_source(
        w in 1u32..=20_000,
        h in 1u32..=20_000,
        r in ratio_strategy(),
    ) {
        let (tw, th) = target_dimensions(w, h, &ResizePolicy::FixedRatio(r));
        let source_ratio = w as f64 / h as f64;
        if source_ratio > r {
            prop_assert_eq!(th, h);
            prop_assert_eq!(tw, (h as f64 * r).round() as u32);
            prop_assert!(tw <= w);
        } else {
            prop_assert_eq!(tw, w);
            prop_assert_eq!(th, (w as f64 / r).round() as u32);
            prop_assert!(th <= h);
        }
    }

    #[test]
    fn prop_non_positive_ratio_rejected(r in -100.0f64..=0.0) {
        let err = ResizePolicy::FixedRatio(r).validate().unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InvalidPolicy);
    }

    #[test]
    fn prop_offset_centers_target(w in 1u32..=5000, h in 1u32..=5000, tw in 1u32..=5000, th in 1u32..=5000) {
        let (x, y) = centered_offset(w, h, tw, th);
        prop_assert_eq!(x * 2.0 + tw as f64, w as f64);
        prop_assert_eq!(y * 2.0 + th as f64, h as f64);
    }

    #[test]
    fn prop_cover_rect_inside_source(w in 1u32..=5000, h in 1u32..=5000, tw in 1u32..=5000, th in 1u32..=5000) {
        let rect = cover_source_rect(w, h, tw, th);
        let eps = 1e-6;
        prop_assert!(rect.x >= -eps && rect.y >= -eps);
        prop_assert!(rect.x + rect.width <= w as f64 + eps);
        prop_assert!(rect.y + rect.height <= h as f64 + eps);
        // Same aspect as the target
        let lhs = rect.width * th as f64;
        let rhs = rect.height * tw as f64;
        prop_assert!((lhs - rhs).abs() <= 1e-6 * lhs.max(rhs));
    }

    #[test]
    fn prop_output_name_drops_after_first_dot(
        stem in "[a-zA-Z0-9_-]{0,12}",
        rest in proptest::collection::vec("[a-z0-9]{1,5}", 0..4),
    ) {
        let mut name = stem.clone();
        for part in &rest {
            name.push('.');
            name.push_str(part);
        }
        for format in OutputFormat::ALL {
            prop_assert_eq!(
                output_file_name(&name, "_vibed", format),
                format!("{stem}_vibed.{}", format.extension())
            );
        }
    }

    #[test]
    fn prop_parse_int_prefix_accepts_trailing_text(n in 0i64..=1_000_000, tail in "[a-z. ]{0,6}") {
        prop_assert_eq!(parse_int_prefix(&format!("  {n}{tail}")), Some(n));
    }

    #[test]
    fn prop_progress_is_monotonic(total in 1usize..=500) {
        let mut previous = 0u8;
        for completed in 1..=total {
            let percent = progress_percent(completed, total);
            prop_assert!(percent >= previous);
            previous = percent;
        }
        prop_assert_eq!(previous, 100);
    }
}

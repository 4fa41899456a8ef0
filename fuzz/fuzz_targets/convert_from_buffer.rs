#![no_main]

//! Fuzz target for full conversions of arbitrary bytes.
//! Decoding must fail cleanly on garbage; anything that decodes must encode.

use arbitrary::{Arbitrary, Unstructured};
use convert_my_image::engine::{ImageTransformer, SourceImage, TransformerConfig};
use convert_my_image::{ErrorKind, OutputFormat, ResizePolicy};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ConvertSeed {
    policy: u8,
    format: u8,
    width: u16,
    height: u16,
    ratio: f64,
    cover: bool,
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);
    let Ok(seed) = ConvertSeed::arbitrary(&mut unstructured) else {
        return;
    };
    let payload = unstructured.take_rest();

    let policy = match seed.policy % 3 {
        0 => ResizePolicy::Original,
        1 => ResizePolicy::FixedRatio(seed.ratio),
        _ => ResizePolicy::ExplicitDimensions {
            width: u32::from(seed.width % 512),
            height: u32::from(seed.height % 512),
        },
    };
    let format = OutputFormat::ALL[seed.format as usize % OutputFormat::ALL.len()];

    // Keep sources and surfaces small so the fuzzer explores parsing, not allocation
    let config = if seed.cover {
        TransformerConfig::cover_crop()
    } else {
        TransformerConfig::stretch()
    }
    .with_limits(2048, 1_000_000);
    let Ok(transformer) = ImageTransformer::with_config(config) else {
        return;
    };

    let source = SourceImage::new("fuzz.bin", "application/octet-stream", payload.to_vec());
    match transformer.convert(&source, &policy, format) {
        Ok(result) => {
            assert!(result.width >= 1 && result.height >= 1);
            assert!(!result.bytes().unwrap().is_empty());
        }
        Err(err) => {
            assert!(matches!(
                err.kind(),
                ErrorKind::Decode | ErrorKind::Encode | ErrorKind::InvalidPolicy | ErrorKind::ResourceLimit
            ));
        }
    }
});

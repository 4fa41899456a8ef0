// src/engine/encoder.rs
//
// Encoder operations: JPEG (mozjpeg), PNG (image crate), WebP (libwebp).
//
// Quality is taken as a 0.0..=1.0 factor and mapped to the 0-100 scale the
// native encoders expect. PNG is lossless and ignores it.

use super::common::{run_with_panic_policy, EngineResult};
use crate::error::ConvertError;
use crate::ops::OutputFormat;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use mozjpeg::{ColorSpace, Compress};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::debug;

/// Map a 0.0..=1.0 quality factor to the encoders' 0-100 scale.
pub fn quality_to_percent(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Encode `img` to `format`.
pub fn encode(img: &DynamicImage, format: OutputFormat, quality: f32) -> EngineResult<Vec<u8>> {
    let encoded = match format {
        OutputFormat::Jpeg => encode_jpeg(img, quality_to_percent(quality))?,
        OutputFormat::Png => encode_png(img)?,
        OutputFormat::WebP => encode_webp(img, quality_to_percent(quality))?,
    };
    debug!(
        format = format.encoder_name(),
        width = img.width(),
        height = img.height(),
        bytes = encoded.len(),
        "surface encoded"
    );
    Ok(encoded)
}

/// Encode to JPEG using mozjpeg. Translucent pixels are composited onto
/// opaque black first, so fully transparent pixels come out black.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> EngineResult<Vec<u8>> {
    run_with_panic_policy(
        "encode:jpeg",
        |msg| ConvertError::encode_failed("jpeg", msg),
        || {
            let rgb: Cow<'_, RgbImage> = match img {
                DynamicImage::ImageRgb8(rgb) => Cow::Borrowed(rgb),
                _ if img.color().has_alpha() => Cow::Owned(flatten_onto_black(img)),
                _ => Cow::Owned(img.to_rgb8()),
            };
            let (w, h) = rgb.dimensions();
            if w == 0 || h == 0 {
                return Err(ConvertError::encode_failed("jpeg", "image has no pixels"));
            }

            let mut comp = Compress::new(ColorSpace::JCS_RGB);
            comp.set_size(w as usize, h as usize);
            comp.set_quality(quality as f32);

            let mut output = Vec::with_capacity((w as usize * h as usize * 3 / 10).max(4096));
            {
                let mut writer = comp.start_compress(&mut output).map_err(|e| {
                    ConvertError::encode_failed(
                        "jpeg",
                        format!("mozjpeg: failed to start compress: {e:?}"),
                    )
                })?;

                let stride = w as usize * 3;
                for row in rgb.as_raw().chunks(stride) {
                    writer.write_scanlines(row).map_err(|e| {
                        ConvertError::encode_failed(
                            "jpeg",
                            format!("mozjpeg: failed to write scanlines: {e:?}"),
                        )
                    })?;
                }

                writer.finish().map_err(|e| {
                    ConvertError::encode_failed("jpeg", format!("mozjpeg: failed to finish: {e:?}"))
                })?;
            }
            Ok(output)
        },
    )
}

/// Drop alpha by compositing onto black: each channel is scaled by alpha/255.
fn flatten_onto_black(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

/// Encode to PNG, keeping the alpha channel.
pub fn encode_png(img: &DynamicImage) -> EngineResult<Vec<u8>> {
    run_with_panic_policy(
        "encode:png",
        |msg| ConvertError::encode_failed("png", msg),
        || {
            let mut buf = Vec::new();
            img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .map_err(|e| ConvertError::encode_failed("png", e.to_string()))?;
            Ok(buf)
        },
    )
}

/// Encode to lossy WebP. The alpha plane is only carried when the image has one.
pub fn encode_webp(img: &DynamicImage, quality: u8) -> EngineResult<Vec<u8>> {
    run_with_panic_policy(
        "encode:webp",
        |msg| ConvertError::encode_failed("webp", msg),
        || {
            let mut config = webp::WebPConfig::new().map_err(|_| {
                ConvertError::encode_failed("webp", "failed to create WebPConfig")
            })?;
            config.quality = quality as f32;

            let mem = if img.color().has_alpha() {
                let rgba = img.to_rgba8();
                let (w, h) = rgba.dimensions();
                webp::Encoder::from_rgba(rgba.as_raw(), w, h).encode_advanced(&config)
            } else {
                let rgb = img.to_rgb8();
                let (w, h) = rgb.dimensions();
                webp::Encoder::from_rgb(rgb.as_raw(), w, h).encode_advanced(&config)
            }
            .map_err(|e| ConvertError::encode_failed("webp", format!("WebP encode failed: {e:?}")))?;

            Ok(mem.to_vec())
        },
    )
}

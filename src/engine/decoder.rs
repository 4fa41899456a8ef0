// src/engine/decoder.rs
//
// Decoder operations: JPEG (mozjpeg), WebP (libwebp), PNG (image crate).

use super::codec::DecodedImage;
use super::common::{run_with_panic_policy, EngineResult};
use super::config::DecodeLimits;
use crate::error::ConvertError;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use mozjpeg::Decompress;
use std::io::Cursor;
use tracing::debug;
use webp::{BitstreamFeatures, Decoder as WebPDecoder};

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Unified decode entrypoint:
/// - Detect format once (magic bytes); only JPEG, PNG and WebP are accepted
/// - Reject oversized images from the header before allocating pixels
/// - Route JPEG to mozjpeg, WebP to libwebp, PNG to the image crate
pub fn decode_image(bytes: &[u8], limits: &DecodeLimits) -> EngineResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(ConvertError::decode_failed("empty input"));
    }

    let detected = detect_format(bytes)
        .ok_or_else(|| ConvertError::unsupported_format("unrecognized data"))?;

    check_header_dimensions(bytes, limits)?;

    let image = match detected {
        ImageFormat::Jpeg => decode_jpeg_mozjpeg(bytes, limits)?,
        ImageFormat::WebP => decode_webp_libwebp(bytes, limits)?,
        ImageFormat::Png => decode_with_image_crate(bytes)?,
        other => {
            return Err(ConvertError::unsupported_format(
                other.to_mime_type().to_string(),
            ))
        }
    };

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ConvertError::decode_failed(format!(
            "decoded image has no pixels ({width}x{height})"
        )));
    }
    limits.check(width, height)?;

    debug!(
        format = ?detected,
        width,
        height,
        bytes = bytes.len(),
        "source decoded"
    );
    Ok(DecodedImage::new(image, Some(detected)))
}

/// Read dimensions from the header only. Unreadable headers are left to the
/// full decoder to report.
fn check_header_dimensions(bytes: &[u8], limits: &DecodeLimits) -> EngineResult<()> {
    let reader = match ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
        Ok(reader) => reader,
        Err(_) => return Ok(()),
    };
    match reader.into_dimensions() {
        Ok((width, height)) => limits.check(width, height),
        Err(_) => Ok(()),
    }
}

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo)
pub fn decode_jpeg_mozjpeg(data: &[u8], limits: &DecodeLimits) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:jpeg", ConvertError::decode_failed, || {
        // Truncated files make libjpeg abort mid-scan; catch the obvious case up front
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(ConvertError::decode_failed(
                "jpeg: missing end-of-image marker",
            ));
        }

        let decompress = Decompress::new_mem(data).map_err(|e| {
            ConvertError::decode_failed(format!("jpeg: decompress init failed: {e:?}"))
        })?;

        let mut decompress = decompress.rgb().map_err(|e| {
            ConvertError::decode_failed(format!("jpeg: rgb conversion failed: {e:?}"))
        })?;

        let width = u32::try_from(decompress.width())
            .map_err(|_| ConvertError::decode_failed("jpeg: width out of range"))?;
        let height = u32::try_from(decompress.height())
            .map_err(|_| ConvertError::decode_failed("jpeg: height out of range"))?;
        limits.check(width, height)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            ConvertError::decode_failed(format!("jpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat: Vec<u8> = pixels.into_iter().flatten().collect();

        RgbImage::from_raw(width, height, flat)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| ConvertError::decode_failed("jpeg: scanline data is short"))
    })
}

/// Decode WebP using libwebp. Animated WebP falls back to the image crate,
/// which yields the first frame.
pub fn decode_webp_libwebp(data: &[u8], limits: &DecodeLimits) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:webp", ConvertError::decode_failed, || {
        let features = BitstreamFeatures::new(data)
            .ok_or_else(|| ConvertError::decode_failed("webp: failed to read bitstream features"))?;
        limits.check(features.width(), features.height())?;

        if features.has_animation() {
            return image::load_from_memory_with_format(data, ImageFormat::WebP).map_err(|e| {
                ConvertError::decode_failed(format!("webp (animated): {e}"))
            });
        }

        let decoded = WebPDecoder::new(data)
            .decode()
            .ok_or_else(|| ConvertError::decode_failed("webp: decode failed"))?;
        Ok(decoded.to_image())
    })
}

/// Decode through the image crate.
pub fn decode_with_image_crate(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:image", ConvertError::decode_failed, || {
        image::load_from_memory(data)
            .map_err(|e| ConvertError::decode_failed(format!("decode failed: {e}")))
    })
}

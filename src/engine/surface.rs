// src/engine/surface.rs
//
// In-memory RGBA drawing surface used by the native codec.
//
// A fresh surface is fully transparent. draw() resamples a source region
// with fast_image_resize (Lanczos3, alpha premultiplied) and composites it
// at the destination box; if fir rejects the input the image crate does the
// same work.

use super::codec::{DecodedImage, DrawSurface, RasterHandle};
use super::common::{run_with_panic_policy, EngineResult};
use super::encoder;
use super::geometry::Rect;
use crate::error::ConvertError;
use crate::ops::OutputFormat;
use fast_image_resize::{self as fir, MulDiv, PixelType, ResizeOptions};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RasterSurface {
    canvas: DynamicImage,
    drawn: bool,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConvertError::surface_unavailable(
                width,
                height,
                "surface needs at least one pixel",
            ));
        }
        Ok(Self {
            canvas: DynamicImage::ImageRgba8(RgbaImage::new(width, height)),
            drawn: false,
        })
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.canvas
    }

    pub fn into_image(self) -> DynamicImage {
        self.canvas
    }
}

impl DrawSurface for RasterSurface {
    type Raster = DecodedImage;

    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn draw(&mut self, source: &DecodedImage, src: Rect, dst: Rect) -> EngineResult<()> {
        let (src_w, src_h) = source.dimensions();
        let src = src.clip_to(src_w, src_h);

        let dst_x = dst.x.round() as i64;
        let dst_y = dst.y.round() as i64;
        let dst_w = dst.width.round().max(0.0) as u32;
        let dst_h = dst.height.round().max(0.0) as u32;

        if src.is_empty() || dst_w == 0 || dst_h == 0 {
            debug!(?src, ?dst, "empty draw skipped");
            return Ok(());
        }

        let target = (dst_w, dst_h);
        let resized = run_with_panic_policy(
            "draw",
            |msg| ConvertError::draw_failed((src_w, src_h), target, msg),
            || {
                resample(source.image(), src, dst_w, dst_h)
                    .map_err(|msg| ConvertError::draw_failed((src_w, src_h), target, msg))
            },
        )?;

        // First draw over the exact surface box replaces the transparent canvas
        if !self.drawn && (dst_x, dst_y) == (0, 0) && target == (self.width(), self.height()) {
            self.canvas = DynamicImage::ImageRgba8(resized);
        } else {
            imageops::overlay(&mut self.canvas, &resized, dst_x, dst_y);
        }
        self.drawn = true;
        Ok(())
    }

    fn to_bytes(&self, format: OutputFormat, quality: f32) -> EngineResult<Vec<u8>> {
        encoder::encode(&self.canvas, format, quality)
    }
}

/// Resample `src` of `img` to `dst_w x dst_h` RGBA pixels.
fn resample(img: &DynamicImage, src: Rect, dst_w: u32, dst_h: u32) -> Result<RgbaImage, String> {
    let rgba = img.to_rgba8();
    match resample_fir(&rgba, src, dst_w, dst_h) {
        Ok(out) => Ok(out),
        Err(err) => resample_image_crate(&rgba, src, dst_w, dst_h)
            .map_err(|fallback_err| format!("{err}; image crate fallback failed: {fallback_err}")),
    }
}

fn resample_fir(rgba: &RgbaImage, src: Rect, dst_w: u32, dst_h: u32) -> Result<RgbaImage, String> {
    let (src_w, src_h) = rgba.dimensions();
    let mut src_image =
        fir::images::Image::from_vec_u8(src_w, src_h, rgba.as_raw().clone(), PixelType::U8x4)
            .map_err(|e| format!("fir source image error: {e:?}"))?;
    let mut dst_image = fir::images::Image::new(dst_w, dst_h, PixelType::U8x4);

    let options = ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3))
        .crop(src.x, src.y, src.width, src.height);

    let mul_div = MulDiv::default();
    mul_div
        .multiply_alpha_inplace(&mut src_image)
        .map_err(|e| format!("failed to premultiply alpha: {e}"))?;

    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| format!("fir resize error: {e:?}"))?;

    mul_div
        .divide_alpha_inplace(&mut dst_image)
        .map_err(|e| format!("failed to unpremultiply alpha: {e}"))?;

    RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| "failed to create rgba image from resized data".to_string())
}

fn resample_image_crate(
    rgba: &RgbaImage,
    src: Rect,
    dst_w: u32,
    dst_h: u32,
) -> Result<RgbaImage, String> {
    // Whole-pixel crop; the fractional part of the window is lost here
    let x = src.x.floor() as u32;
    let y = src.y.floor() as u32;
    let w = (src.width.round() as u32).max(1);
    let h = (src.height.round() as u32).max(1);
    let cropped = imageops::crop_imm(rgba, x, y, w, h).to_image();
    if cropped.width() == 0 || cropped.height() == 0 {
        return Err("crop window is outside the source".to_string());
    }
    Ok(imageops::resize(&cropped, dst_w, dst_h, FilterType::Lanczos3))
}

// src/engine/codec.rs
//
// Codec capabilities injected into the transformer.
//
// ImageCodec decodes bytes into a raster and hands out drawing surfaces;
// DrawSurface takes draw calls and serializes itself. The transformer only
// talks to these traits, so it can be driven by a fake codec in tests.
// Rasters and surfaces are released when dropped.

use super::common::EngineResult;
use super::config::DecodeLimits;
use super::decoder;
use super::geometry::Rect;
use super::surface::RasterSurface;
use crate::ops::OutputFormat;
use image::{DynamicImage, ImageFormat};

/// A decoded image whose pixel size is known.
pub trait RasterHandle {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

/// A fixed-size drawable target.
pub trait DrawSurface {
    type Raster: RasterHandle;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Resample `src` (in source pixels) of `source` into `dst` (in surface pixels).
    fn draw(&mut self, source: &Self::Raster, src: Rect, dst: Rect) -> EngineResult<()>;

    /// Serialize the surface. `quality` is a 0.0..=1.0 factor, ignored by PNG.
    fn to_bytes(&self, format: OutputFormat, quality: f32) -> EngineResult<Vec<u8>>;
}

pub trait ImageCodec {
    type Raster: RasterHandle;
    type Surface: DrawSurface<Raster = Self::Raster>;

    fn decode(&self, bytes: &[u8]) -> EngineResult<Self::Raster>;

    fn create_surface(&self, width: u32, height: u32) -> EngineResult<Self::Surface>;
}

/// Raster produced by [`NativeCodec`].
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
    format: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, format: Option<ImageFormat>) -> Self {
        Self { image, format }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Container format the bytes were sniffed as.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image, None)
    }
}

impl RasterHandle for DecodedImage {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Codec backed by mozjpeg, libwebp and the image crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec {
    limits: DecodeLimits,
}

impl NativeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DecodeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> DecodeLimits {
        self.limits
    }
}

impl ImageCodec for NativeCodec {
    type Raster = DecodedImage;
    type Surface = RasterSurface;

    fn decode(&self, bytes: &[u8]) -> EngineResult<DecodedImage> {
        decoder::decode_image(bytes, &self.limits)
    }

    fn create_surface(&self, width: u32, height: u32) -> EngineResult<RasterSurface> {
        RasterSurface::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::encoder;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_native_codec_png_round_trip() {
        let codec = NativeCodec::new();
        let raster = DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            5,
            3,
            Rgb([200, 100, 50]),
        )));
        let bytes = encoder::encode(raster.image(), OutputFormat::Png, 0.9).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.format(), Some(ImageFormat::Png));
        assert_eq!(decoded.image().to_rgb8().get_pixel(4, 2).0, [200, 100, 50]);
    }

    #[test]
    fn test_native_codec_surface_size() {
        let surface = NativeCodec::new().create_surface(7, 9).unwrap();
        assert_eq!((surface.width(), surface.height()), (7, 9));
    }
}

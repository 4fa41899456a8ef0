// src/engine/transformer.rs
//
// ImageTransformer: one source in, one encoded and blob-backed result out.

use super::batch::{run_batch, BatchReport, Progress};
use super::codec::{DrawSurface, ImageCodec, NativeCodec, RasterHandle};
use super::config::TransformerConfig;
use super::geometry::{centered_offset, source_rect, target_dimensions, Rect};
use super::result::ConversionResult;
use super::source::SourceImage;
use crate::blob::BlobStore;
use crate::error::Result;
use crate::ops::{OutputFormat, ResizePolicy};
use tracing::{debug, info, instrument};

/// Converts source images with an injected codec.
///
/// Each call decodes the source, sizes a surface from the resize policy,
/// draws the source onto it and encodes the surface into a blob owned by
/// the returned [`ConversionResult`]. The decoded raster and the surface
/// live only for the duration of the call.
pub struct ImageTransformer<C: ImageCodec = NativeCodec> {
    codec: C,
    config: TransformerConfig,
    blobs: BlobStore,
}

impl ImageTransformer<NativeCodec> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TransformerConfig) -> Result<Self> {
        let codec = NativeCodec::with_limits(config.limits);
        Self::with_codec(codec, config)
    }
}

impl Default for ImageTransformer<NativeCodec> {
    fn default() -> Self {
        Self {
            codec: NativeCodec::default(),
            config: TransformerConfig::default(),
            blobs: BlobStore::new(),
        }
    }
}

impl<C: ImageCodec> ImageTransformer<C> {
    pub fn with_codec(codec: C, config: TransformerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codec,
            config,
            blobs: BlobStore::new(),
        })
    }

    /// Park outputs in an existing store instead of a private one.
    pub fn with_blob_store(mut self, blobs: BlobStore) -> Self {
        self.blobs = blobs;
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    pub fn blob_store(&self) -> &BlobStore {
        &self.blobs
    }

    /// Convert one source.
    ///
    /// The policy is validated before anything is decoded or allocated.
    /// Decode failures are `ErrorKind::Decode`; surface, draw and encode
    /// failures are `ErrorKind::Encode`.
    #[instrument(skip_all, fields(source = %source.name(), policy = ?policy, format = %format))]
    pub fn convert(
        &self,
        source: &SourceImage,
        policy: &ResizePolicy,
        format: OutputFormat,
    ) -> Result<ConversionResult> {
        policy.validate()?;

        let raster = self.codec.decode(source.bytes())?;
        let (src_w, src_h) = raster.dimensions();
        self.config.limits.check(src_w, src_h)?;

        let (target_w, target_h) = target_dimensions(src_w, src_h, policy);
        let (offset_x, offset_y) = centered_offset(src_w, src_h, target_w, target_h);
        debug!(
            src_w,
            src_h,
            target_w,
            target_h,
            offset_x,
            offset_y,
            composite = ?self.config.composite,
            "target box computed"
        );
        self.config.check_surface(target_w, target_h)?;

        let encoded = {
            let mut surface = self.codec.create_surface(target_w, target_h)?;
            let src = source_rect(self.config.composite, src_w, src_h, target_w, target_h);
            surface.draw(&raster, src, Rect::from_size(target_w, target_h))?;
            surface.to_bytes(format, self.config.quality)?
        };
        drop(raster);
        debug!("surface and raster released");

        let result = ConversionResult {
            original_name: source.name().to_string(),
            original_size: source.size(),
            original_type: source.mime_type().to_string(),
            file_name: source.output_name(&self.config.suffix, format),
            width: target_w,
            height: target_h,
            blob: self.blobs.create(encoded, format.mime_type()),
        };
        info!(
            file_name = %result.file_name,
            width = target_w,
            height = target_h,
            bytes = result.size(),
            "converted"
        );
        Ok(result)
    }

    /// Convert `sources` one at a time. See [`run_batch`].
    pub fn convert_batch<F>(
        &self,
        sources: &[SourceImage],
        policy: &ResizePolicy,
        format: OutputFormat,
        on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(Progress),
    {
        run_batch(self, sources, policy, format, on_progress)
    }
}

// src/engine/config.rs
//
// Transformer configuration: encoder quality, composite mode, output naming
// and the size limits enforced on sources and surfaces.

use super::{DEFAULT_QUALITY, MAX_DIMENSION, MAX_PIXELS, OUTPUT_SUFFIX};
use crate::error::{ConvertError, Result};
use crate::ops::CompositeMode;
use std::borrow::Cow;

/// Size limits for decoded sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_dimension: u32,
    pub max_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            max_pixels: MAX_PIXELS,
        }
    }
}

impl DecodeLimits {
    /// Reject images that are too large (potential decompression bomb).
    pub fn check(&self, width: u32, height: u32) -> Result<()> {
        if width > self.max_dimension || height > self.max_dimension {
            return Err(ConvertError::dimension_exceeds_limit(
                width.max(height),
                self.max_dimension,
            ));
        }
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(ConvertError::pixel_count_exceeds_limit(
                pixels,
                self.max_pixels,
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransformerConfig {
    /// Encoder quality factor in 0.0..=1.0
    pub quality: f32,
    pub composite: CompositeMode,
    /// Appended to the source stem when naming outputs
    pub suffix: Cow<'static, str>,
    pub limits: DecodeLimits,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            composite: CompositeMode::Stretch,
            suffix: Cow::Borrowed(OUTPUT_SUFFIX),
            limits: DecodeLimits::default(),
        }
    }
}

impl TransformerConfig {
    /// Draw the whole source into the target box, whatever its shape.
    pub fn stretch() -> Self {
        Self::default()
    }

    /// Draw the centered region of the source that fills the target box.
    pub fn cover_crop() -> Self {
        Self {
            composite: CompositeMode::CoverCrop,
            ..Self::default()
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_composite(mut self, composite: CompositeMode) -> Self {
        self.composite = composite;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<Cow<'static, str>>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_limits(mut self, max_dimension: u32, max_pixels: u64) -> Self {
        self.limits = DecodeLimits {
            max_dimension,
            max_pixels,
        };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ConvertError::invalid_argument(
                "quality",
                self.quality.to_string(),
                "Expected a factor between 0.0 and 1.0",
            ));
        }
        if self.suffix.is_empty() {
            return Err(ConvertError::invalid_argument(
                "suffix",
                "",
                "An empty suffix would overwrite the source name",
            ));
        }
        if self.limits.max_dimension == 0 || self.limits.max_pixels == 0 {
            return Err(ConvertError::invalid_argument(
                "limits",
                format!("{:?}", self.limits),
                "Limits must be positive",
            ));
        }
        Ok(())
    }

    /// A surface that cannot be allocated is an encode-side failure. That
    /// includes an empty one, when a side rounded down to zero.
    pub fn check_surface(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ConvertError::surface_unavailable(
                width,
                height,
                "surface needs at least one pixel",
            ));
        }
        self.limits.check(width, height).map_err(|err| {
            ConvertError::surface_unavailable(width, height, err.to_string())
        })
    }
}

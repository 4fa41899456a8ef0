// src/ops.rs
//
// Request-level value types: what geometry to produce and how to encode it.
// These are cheap to create and copy - the expensive work happens in convert().

use crate::error::{ConvertError, Result};
use image::ImageFormat;
use std::fmt;
use std::str::FromStr;

/// How the target pixel box is derived from the source.
///
/// Exactly one policy is active per conversion batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizePolicy {
    /// Keep the source dimensions
    Original,
    /// Fit a box of `width / height == ratio` inside the source
    FixedRatio(f64),
    /// Exact pixel size, aspect ratio ignored
    ExplicitDimensions { width: u32, height: u32 },
}

impl ResizePolicy {
    /// Reject non-positive ratios and zero dimensions.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Original => Ok(()),
            Self::FixedRatio(ratio) => {
                if ratio.is_finite() && ratio > 0.0 {
                    Ok(())
                } else {
                    Err(ConvertError::invalid_ratio(ratio))
                }
            }
            Self::ExplicitDimensions { width, height } => {
                if width == 0 || height == 0 {
                    Err(ConvertError::invalid_dimensions(width as i64, height as i64))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl From<ResizePreset> for ResizePolicy {
    fn from(preset: ResizePreset) -> Self {
        match preset.ratio() {
            Some(ratio) => Self::FixedRatio(ratio),
            None => Self::Original,
        }
    }
}

/// Output format for encoding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Jpeg, Self::Png, Self::WebP];

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// File extension, taken from the mime subtype (so JPEG is `jpeg`, not `jpg`).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Encoder identifier used in logs and error messages.
    pub fn encoder_name(&self) -> &'static str {
        self.extension()
    }

    /// PNG is always lossless; the quality factor only reaches JPEG and WebP.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, Self::Png)
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Ok(Self::Jpeg),
            "png" | "image/png" => Ok(Self::Png),
            "webp" | "image/webp" => Ok(Self::WebP),
            other => Err(ConvertError::invalid_argument(
                "targetFormat",
                other.to_string(),
                "Expected jpeg, png or webp",
            )),
        }
    }
}

// =============================================================================
// PRESETS - Social media aspect ratios
// =============================================================================

/// Built-in resize presets offered to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResizePreset {
    #[default]
    Original,
    /// 9:16, phone stories
    Story,
    /// 1:1, square posts
    Post,
    /// 16:9, video thumbnails
    Video,
}

impl ResizePreset {
    pub const ALL: [ResizePreset; 4] = [Self::Original, Self::Story, Self::Post, Self::Video];

    /// Width / height, or `None` for the source's own geometry.
    pub fn ratio(&self) -> Option<f64> {
        match self {
            Self::Original => None,
            Self::Story => Some(9.0 / 16.0),
            Self::Post => Some(1.0),
            Self::Video => Some(16.0 / 9.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Story => "9:16 (Story)",
            Self::Post => "1:1 (Post)",
            Self::Video => "16:9 (Video)",
        }
    }
}

impl FromStr for ResizePreset {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "9:16" | "story" => Ok(Self::Story),
            "1:1" | "post" => Ok(Self::Post),
            "16:9" | "video" => Ok(Self::Video),
            other => Err(ConvertError::invalid_argument(
                "resizePreset",
                other.to_string(),
                "Expected Original, 9:16, 1:1 or 16:9",
            )),
        }
    }
}

/// How the source is composited onto the target surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeMode {
    /// Draw the whole source stretched into the whole target box.
    #[default]
    Stretch,
    /// Draw only the centered source region that has the target's aspect
    /// ratio, so the target box is filled without distortion.
    CoverCrop,
}

// =============================================================================
// OPTIONS - The configuration surface filled in by the UI
// =============================================================================

/// Conversion options as the user entered them.
///
/// Custom width/height are kept as raw text; they override the preset only
/// when both are non-empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertOptions {
    pub target_format: OutputFormat,
    pub resize_preset: ResizePreset,
    pub custom_width: String,
    pub custom_height: String,
}

impl ConvertOptions {
    pub fn new(target_format: OutputFormat, resize_preset: ResizePreset) -> Self {
        Self {
            target_format,
            resize_preset,
            custom_width: String::new(),
            custom_height: String::new(),
        }
    }

    pub fn with_custom_size(
        mut self,
        width: impl Into<String>,
        height: impl Into<String>,
    ) -> Self {
        self.custom_width = width.into();
        self.custom_height = height.into();
        self
    }

    /// Picking a preset discards any custom size.
    pub fn select_preset(&mut self, preset: ResizePreset) {
        self.resize_preset = preset;
        self.custom_width.clear();
        self.custom_height.clear();
    }

    pub fn has_custom_size(&self) -> bool {
        !self.custom_width.is_empty() && !self.custom_height.is_empty()
    }

    /// Turn the options into the policy and format for one batch.
    pub fn resolve(&self) -> Result<(ResizePolicy, OutputFormat)> {
        let policy = if self.has_custom_size() {
            let width = parse_dimension("width", &self.custom_width)?;
            let height = parse_dimension("height", &self.custom_height)?;
            if width <= 0 || height <= 0 {
                return Err(ConvertError::invalid_dimensions(width, height));
            }
            ResizePolicy::ExplicitDimensions {
                width: clamp_to_u32(width),
                height: clamp_to_u32(height),
            }
        } else {
            ResizePolicy::from(self.resize_preset)
        };
        Ok((policy, self.target_format))
    }
}

fn parse_dimension(name: &'static str, raw: &str) -> Result<i64> {
    parse_int_prefix(raw).ok_or_else(|| ConvertError::unparseable_dimension(name, raw.to_string()))
}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Lenient integer parse: leading whitespace, optional sign, then as many
/// decimal digits as are present. Trailing garbage is ignored, so `"800px"`
/// is 800 and `"12.5"` is 12. Returns `None` when no digit leads the text.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude = rest[..digits_len].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add((digit - b'0') as i64)
    });
    Some(if negative { -magnitude } else { magnitude })
}

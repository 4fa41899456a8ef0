// src/error.rs
//
// Unified error handling for convert-my-image
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - Decode: malformed or unsupported input bytes
// - Encode: target surface unavailable, draw or serialization failed
// - InvalidPolicy: non-positive ratio or dimensions, rejected before drawing
// - ResourceLimit: decoded source exceeds dimension/pixel limits
// - Io / InvalidArgument / Revoked / Internal: everything around the core

use std::borrow::Cow;
use thiserror::Error;

/// Error kind used to classify failures at the batch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Source bytes could not be decoded as an image
    Decode,
    /// Target surface unavailable, or rasterizing/serializing it failed
    Encode,
    /// Resize policy rejected before any drawing
    InvalidPolicy,
    /// Source image exceeds the configured limits
    ResourceLimit,
    /// Reading or writing files
    Io,
    /// Unparseable option value
    InvalidArgument,
    /// Blob handle used after revocation
    Revoked,
    /// Library bugs (should not happen)
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "DecodeError",
            ErrorKind::Encode => "EncodeError",
            ErrorKind::InvalidPolicy => "InvalidPolicyError",
            ErrorKind::ResourceLimit => "ResourceLimit",
            ErrorKind::Io => "IoError",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::Revoked => "Revoked",
            ErrorKind::Internal => "InternalBug",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// convert-my-image error types
#[derive(Debug, Error)]
pub enum ConvertError {
    // File I/O Errors
    #[error("Failed to read file '{path}': {source}")]
    FileReadFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWriteFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    // Decode Errors
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    // Size Limit Errors
    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    // Policy Errors
    #[error("Invalid aspect ratio {ratio}: must be a finite number greater than zero")]
    InvalidRatio { ratio: f64 },

    #[error("Invalid target dimensions: width={width}, height={height}. Both must be positive")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Invalid custom {name}: '{value}' is not a number")]
    UnparseableDimension {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
    },

    // Encode Errors
    #[error("Drawing surface {width}x{height} unavailable: {reason}")]
    SurfaceUnavailable {
        width: u32,
        height: u32,
        reason: Cow<'static, str>,
    },

    #[error("Draw failed ({source_width}x{source_height} -> {target_width}x{target_height}): {message}")]
    DrawFailed {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
        message: Cow<'static, str>,
    },

    #[error("Failed to encode as {format}: {message}")]
    EncodeFailed {
        format: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    // Configuration Errors
    #[error("Invalid value for {name}: {value}. {reason}")]
    InvalidArgument {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    // State Errors
    #[error("Blob {url} has been revoked")]
    BlobRevoked { url: Cow<'static, str> },

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

impl Clone for ConvertError {
    fn clone(&self) -> Self {
        match self {
            Self::FileReadFailed { path, source } => Self::FileReadFailed {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Self::FileWriteFailed { path, source } => Self::FileWriteFailed {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            Self::UnsupportedFormat { format } => Self::UnsupportedFormat {
                format: format.clone(),
            },
            Self::DecodeFailed { message } => Self::DecodeFailed {
                message: message.clone(),
            },
            Self::DimensionExceedsLimit { dimension, max } => Self::DimensionExceedsLimit {
                dimension: *dimension,
                max: *max,
            },
            Self::PixelCountExceedsLimit { pixels, max } => Self::PixelCountExceedsLimit {
                pixels: *pixels,
                max: *max,
            },
            Self::InvalidRatio { ratio } => Self::InvalidRatio { ratio: *ratio },
            Self::InvalidDimensions { width, height } => Self::InvalidDimensions {
                width: *width,
                height: *height,
            },
            Self::UnparseableDimension { name, value } => Self::UnparseableDimension {
                name: name.clone(),
                value: value.clone(),
            },
            Self::SurfaceUnavailable {
                width,
                height,
                reason,
            } => Self::SurfaceUnavailable {
                width: *width,
                height: *height,
                reason: reason.clone(),
            },
            Self::DrawFailed {
                source_width,
                source_height,
                target_width,
                target_height,
                message,
            } => Self::DrawFailed {
                source_width: *source_width,
                source_height: *source_height,
                target_width: *target_width,
                target_height: *target_height,
                message: message.clone(),
            },
            Self::EncodeFailed { format, message } => Self::EncodeFailed {
                format: format.clone(),
                message: message.clone(),
            },
            Self::InvalidArgument {
                name,
                value,
                reason,
            } => Self::InvalidArgument {
                name: name.clone(),
                value: value.clone(),
                reason: reason.clone(),
            },
            Self::BlobRevoked { url } => Self::BlobRevoked { url: url.clone() },
            Self::InternalPanic { message } => Self::InternalPanic {
                message: message.clone(),
            },
        }
    }
}

// Constructor Helpers
impl ConvertError {
    pub fn file_read_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn file_write_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn invalid_ratio(ratio: f64) -> Self {
        Self::InvalidRatio { ratio }
    }

    pub fn invalid_dimensions(width: i64, height: i64) -> Self {
        Self::InvalidDimensions { width, height }
    }

    pub fn unparseable_dimension(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::UnparseableDimension {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn surface_unavailable(
        width: u32,
        height: u32,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::SurfaceUnavailable {
            width,
            height,
            reason: reason.into(),
        }
    }

    pub fn draw_failed(
        source_dims: (u32, u32),
        target_dims: (u32, u32),
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::DrawFailed {
            source_width: source_dims.0,
            source_height: source_dims.1,
            target_width: target_dims.0,
            target_height: target_dims.1,
            message: message.into(),
        }
    }

    pub fn encode_failed(
        format: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn blob_revoked(url: impl Into<Cow<'static, str>>) -> Self {
        Self::BlobRevoked { url: url.into() }
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (user can fix it by changing
    /// the input or the options and resubmitting)
    pub fn is_recoverable(&self) -> bool {
        match self.kind() {
            ErrorKind::InvalidPolicy
            | ErrorKind::InvalidArgument
            | ErrorKind::ResourceLimit
            | ErrorKind::Io => true,
            ErrorKind::Decode | ErrorKind::Encode | ErrorKind::Revoked | ErrorKind::Internal => {
                false
            }
        }
    }

    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } | Self::DecodeFailed { .. } => ErrorKind::Decode,

            Self::SurfaceUnavailable { .. }
            | Self::DrawFailed { .. }
            | Self::EncodeFailed { .. } => ErrorKind::Encode,

            Self::InvalidRatio { .. }
            | Self::InvalidDimensions { .. }
            | Self::UnparseableDimension { .. } => ErrorKind::InvalidPolicy,

            Self::DimensionExceedsLimit { .. } | Self::PixelCountExceedsLimit { .. } => {
                ErrorKind::ResourceLimit
            }

            Self::FileReadFailed { .. } | Self::FileWriteFailed { .. } => ErrorKind::Io,

            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,

            Self::BlobRevoked { .. } => ErrorKind::Revoked,

            Self::InternalPanic { .. } => ErrorKind::Internal,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, ConvertError>;

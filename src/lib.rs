// lib.rs
//
// convert-my-image: client-side image conversion and resizing
//
// Takes uploaded JPEG/PNG/WebP files, resizes them to a social-media aspect
// ratio or an explicit size, re-encodes them to the chosen format and hands
// each output back as a revocable, downloadable blob.

pub mod blob;
pub mod engine;
pub mod error;
pub mod ops;

pub use blob::{BlobRef, BlobStore};
pub use engine::{
    BatchReport, ConversionResult, ConversionSession, ImageTransformer, ItemOutcome, Progress,
    ResultList, SourceImage, TransformerConfig,
};
pub use error::{ConvertError, ErrorKind, Result};
pub use ops::{CompositeMode, ConvertOptions, OutputFormat, ResizePolicy, ResizePreset};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Mime types accepted as input.
pub fn supported_input_formats() -> Vec<&'static str> {
    vec!["image/jpeg", "image/png", "image/webp"]
}

pub fn supported_output_formats() -> Vec<&'static str> {
    OutputFormat::ALL.iter().map(OutputFormat::mime_type).collect()
}

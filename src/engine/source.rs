// src/engine/source.rs
//
// Source images handed to the transformer, and output naming.

use crate::error::{ConvertError, Result};
use crate::ops::OutputFormat;
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// An uploaded file: its name, declared mime type and raw bytes.
///
/// Pixel dimensions are unknown until the bytes are decoded. The bytes are
/// shared, so cloning a source is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The mime type is guessed from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ConvertError::file_read_failed(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = ImageFormat::from_path(path)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn output_name(&self, suffix: &str, format: OutputFormat) -> String {
        output_file_name(&self.name, suffix, format)
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// `<stem><suffix>.<ext>`, where the stem is everything before the first
/// `.` of `name`. Names with several dots lose all of them:
/// `photo.vacation.jpg` becomes `photo_vibed.webp`.
pub fn output_file_name(name: &str, suffix: &str, format: OutputFormat) -> String {
    let stem = name.split('.').next().unwrap_or_default();
    format!("{stem}{suffix}.{}", format.extension())
}

// src/engine/result.rs
//
// Conversion results and the session's result list.

use crate::blob::BlobRef;
use crate::error::{ConvertError, ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// One successfully converted image.
///
/// Owns the blob holding the encoded bytes; dropping the result revokes it.
#[derive(Debug)]
pub struct ConversionResult {
    pub original_name: String,
    pub original_size: u64,
    pub original_type: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub blob: BlobRef,
}

impl ConversionResult {
    /// Identifier of this result, unique within the blob store.
    pub fn id(&self) -> u64 {
        self.blob.id()
    }

    pub fn url(&self) -> &str {
        self.blob.url()
    }

    pub fn bytes(&self) -> Result<Arc<[u8]>> {
        self.blob.bytes()
    }

    pub fn size(&self) -> u64 {
        self.blob.size() as u64
    }

    pub fn mime_type(&self) -> &'static str {
        self.blob.mime_type()
    }

    pub fn revoke(&self) -> bool {
        self.blob.revoke()
    }

    /// One-line description, e.g. `"1.5 KB • 1080x1920 • WEBP"`.
    pub fn summary(&self) -> String {
        let format = self
            .mime_type()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        format!(
            "{} • {}x{} • {}",
            format_size(self.size()),
            self.width,
            self.height,
            format
        )
    }

    /// Write the encoded bytes to `dir/<file_name>`.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        let bytes = self.bytes()?;
        std::fs::write(&path, &bytes[..])
            .map_err(|e| ConvertError::file_write_failed(path.display().to_string(), e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "result saved");
        Ok(path)
    }
}

/// Per-item batch outcome.
#[derive(Debug)]
pub enum ItemOutcome {
    Success(ConversionResult),
    Failure {
        source_name: String,
        error: ConvertError,
    },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Error kind of a failed item.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error, .. } => Some(error.kind()),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            Self::Success(result) => &result.original_name,
            Self::Failure { source_name, .. } => source_name,
        }
    }

    pub fn into_result(self) -> Result<ConversionResult> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

/// Ordered list of results held for the session.
#[derive(Debug, Default)]
pub struct ResultList {
    items: Vec<ConversionResult>,
}

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ConversionResult) {
        self.items.push(result);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ConversionResult> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversionResult> {
        self.items.iter()
    }

    pub fn total_size(&self) -> u64 {
        self.items.iter().map(ConversionResult::size).sum()
    }

    /// Drop every result, revoking its blob.
    pub fn clear(&mut self) {
        let count = self.items.len();
        for result in self.items.drain(..) {
            result.revoke();
        }
        if count > 0 {
            debug!(count, "results cleared");
        }
    }

    /// Save every result into `dir`, in list order. Each save is attempted
    /// on its own, so a revoked or unwritable result does not stop the rest;
    /// the returned list has one outcome per result.
    pub fn download_all(&self, dir: impl AsRef<Path>) -> Vec<Result<PathBuf>> {
        let dir = dir.as_ref();
        self.items
            .iter()
            .map(|result| {
                result.save_to(dir).inspect_err(|err| {
                    warn!(file_name = %result.file_name, error = %err, "save skipped");
                })
            })
            .collect()
    }
}

impl Extend<ConversionResult> for ResultList {
    fn extend<T: IntoIterator<Item = ConversionResult>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl FromIterator<ConversionResult> for ResultList {
    fn from_iter<T: IntoIterator<Item = ConversionResult>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultList {
    type Item = &'a ConversionResult;
    type IntoIter = std::slice::Iter<'a, ConversionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Human-readable byte size in base-1024 units, up to GB, with at most two
/// decimals and trailing zeros dropped (`1536` is `"1.5 KB"`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut divisor = 1u64;
    while unit + 1 < UNITS.len() && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }
    let value = format!("{:.2}", bytes as f64 / divisor as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value} {}", UNITS[unit])
}

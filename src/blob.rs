// src/blob.rs
//
// Transient, revocable byte handles.
//
// A BlobStore plays the role of the browser's object-URL registry: every
// encoded output is parked there and handed out as a BlobRef carrying an
// addressable URL. Revoking the ref frees the backing bytes; any later read
// fails with BlobRevoked. BlobRef is deliberately not Clone - whoever holds
// it owns the backing storage, and dropping it revokes.

use crate::error::{ConvertError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const URL_PREFIX: &str = "blob:convert-my-image/";

#[derive(Default)]
struct Registry {
    entries: HashMap<u64, Arc<[u8]>>,
    next_id: u64,
}

/// Shared registry of live blobs. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<Registry>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `bytes` in the store and return the owning handle.
    pub fn create(&self, bytes: Vec<u8>, mime_type: &'static str) -> BlobRef {
        let size = bytes.len();
        let id = {
            let mut registry = self.inner.lock();
            registry.next_id += 1;
            let id = registry.next_id;
            registry.entries.insert(id, Arc::from(bytes));
            id
        };
        debug!(id, size, mime_type, "blob created");
        BlobRef {
            id,
            url: format!("{URL_PREFIX}{id}"),
            size,
            mime_type,
            store: self.clone(),
        }
    }

    /// Look a blob up by URL, the way a download link would.
    pub fn fetch(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url.strip_prefix(URL_PREFIX)?.parse::<u64>().ok()?;
        self.inner.lock().entries.get(&id).cloned()
    }

    /// Number of blobs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn live_bytes(&self) -> usize {
        self.inner.lock().entries.values().map(|b| b.len()).sum()
    }

    fn get(&self, id: u64) -> Option<Arc<[u8]>> {
        self.inner.lock().entries.get(&id).cloned()
    }

    fn remove(&self, id: u64) -> bool {
        self.inner.lock().entries.remove(&id).is_some()
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owning handle to one blob in a [`BlobStore`].
pub struct BlobRef {
    id: u64,
    url: String,
    size: usize,
    mime_type: &'static str,
    store: BlobStore,
}

impl BlobRef {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Size in bytes at creation time; stays readable after revocation.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn bytes(&self) -> Result<Arc<[u8]>> {
        self.store
            .get(self.id)
            .ok_or_else(|| ConvertError::blob_revoked(self.url.clone()))
    }

    pub fn is_revoked(&self) -> bool {
        self.store.get(self.id).is_none()
    }

    /// Release the backing bytes. Returns false if already revoked.
    pub fn revoke(&self) -> bool {
        let removed = self.store.remove(self.id);
        if removed {
            debug!(id = self.id, url = %self.url, "blob revoked");
        }
        removed
    }
}

impl Drop for BlobRef {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRef")
            .field("url", &self.url)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

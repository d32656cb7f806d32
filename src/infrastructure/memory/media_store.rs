//! In-Memory Media Store Implementation

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::MediaStorePort;
use crate::domain::session::MediaHandle;

/// 内存媒体存储
pub struct InMemoryMediaStore {
    blobs: DashMap<MediaHandle, Arc<Vec<u8>>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self {
            blobs: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaStorePort for InMemoryMediaStore {
    fn put(&self, bytes: Vec<u8>) -> MediaHandle {
        let handle = MediaHandle::new();
        tracing::debug!(handle = %handle, size = bytes.len(), "Media stored");
        self.blobs.insert(handle.clone(), Arc::new(bytes));
        handle
    }

    fn get(&self, handle: &MediaHandle) -> Option<Arc<Vec<u8>>> {
        self.blobs.get(handle).map(|b| Arc::clone(&b))
    }

    fn release(&self, handle: &MediaHandle) -> bool {
        let released = self.blobs.remove(handle).is_some();
        if released {
            tracing::debug!(handle = %handle, "Media released");
        }
        released
    }

    fn contains(&self, handle: &MediaHandle) -> bool {
        self.blobs.contains_key(handle)
    }
}

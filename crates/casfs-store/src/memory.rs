use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use casfs_types::NodeHash;
use tracing::trace;

use crate::error::StoreResult;
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock`; the
/// lock is never held across an await point.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<NodeHash, Vec<u8>>>,
    puts: AtomicU64,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            puts: AtomicU64::new(0),
        }
    }

    /// Number of distinct blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Number of `put` calls served, including idempotent repeats.
    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Return a sorted list of all keys in the store.
    pub fn all_keys(&self) -> Vec<NodeHash> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut keys: Vec<NodeHash> = map.keys().copied().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &NodeHash) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    async fn put(&self, key: &NodeHash, bytes: Vec<u8>) -> StoreResult<()> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        let mut map = self.blobs.write().expect("lock poisoned");
        // Same key means same bytes; keep the first copy.
        map.entry(*key).or_insert_with(|| {
            trace!(key = %key.short_hex(), len = bytes.len(), "blob stored");
            bytes
        });
        Ok(())
    }

    async fn has(&self, key: &NodeHash) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

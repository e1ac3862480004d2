use async_trait::async_trait;
use casfs_types::NodeHash;

use crate::error::StoreResult;

/// Flat content-keyed blob store.
///
/// All implementations must satisfy these invariants:
/// - `put` under an existing key is a no-op. Content addressing means one
///   key always carries one byte string.
/// - `put` of the same key from concurrent callers must not lose data.
/// - The store never interprets blob contents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the bytes stored under `key`. `Ok(None)` if absent.
    async fn get(&self, key: &NodeHash) -> StoreResult<Option<Vec<u8>>>;

    /// Store `bytes` under `key`.
    async fn put(&self, key: &NodeHash, bytes: Vec<u8>) -> StoreResult<()>;

    /// Check whether `key` is present.
    async fn has(&self, key: &NodeHash) -> StoreResult<bool>;
}

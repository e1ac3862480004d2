//! Large files.
//!
//! Content bigger than one node goes through the block splitter in
//! `casfs-chunk`. The splitter only knows about a blob store, so it is
//! handed a [`HookedBlobStore`] that reports every block to the
//! node-stored hook just like the engine's own writes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use casfs_chunk::{open_stream, read_file, write_file, ChunkContext};
use casfs_codec::{decode, Node};
use casfs_store::{BlobStore, StoreError, StoreResult};
use casfs_types::NodeHash;
use futures::{Stream, TryStreamExt};
use serde::Serialize;
use tracing::debug;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::hooks::{HookError, NodeStoredHook, StoredNodeInfo};
use crate::resolve::parse_segments;
use crate::write::{place_file, WriteResult};

/// Blob store wrapper that fires the node-stored hook after every `put`.
///
/// A hook failure fails the `put` and is kept so the caller can report it
/// as a hook error rather than a storage error.
pub struct HookedBlobStore {
    inner: Arc<dyn BlobStore>,
    hook: Option<Arc<dyn NodeStoredHook>>,
    hook_failure: Mutex<Option<HookError>>,
}

impl HookedBlobStore {
    pub fn new(inner: Arc<dyn BlobStore>, hook: Option<Arc<dyn NodeStoredHook>>) -> Self {
        Self {
            inner,
            hook,
            hook_failure: Mutex::new(None),
        }
    }

    /// The first hook failure seen by this store, if any.
    pub fn take_hook_failure(&self) -> Option<HookError> {
        self.hook_failure.lock().expect("lock poisoned").take()
    }
}

#[async_trait]
impl BlobStore for HookedBlobStore {
    async fn get(&self, key: &NodeHash) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &NodeHash, data: Vec<u8>) -> StoreResult<()> {
        let Some(hook) = &self.hook else {
            return self.inner.put(key, data).await;
        };

        let node = decode(&data).map_err(|e| StoreError::Rejected {
            key: *key,
            reason: e.to_string(),
        })?;
        let logical_size = match &node {
            Node::Directory(_) => 0,
            Node::File(file) => file.size,
            Node::Successor(block) => block.payload.len() as u64,
        };

        self.inner.put(key, data.clone()).await?;
        let info = StoredNodeInfo {
            hash: *key,
            bytes: &data,
            kind: node.kind(),
            logical_size,
        };
        if let Err(e) = hook.on_node_stored(&info).await {
            let reason = format!("node-stored hook failed: {e}");
            self.hook_failure
                .lock()
                .expect("lock poisoned")
                .get_or_insert(e);
            return Err(StoreError::Rejected { key: *key, reason });
        }
        Ok(())
    }

    async fn has(&self, key: &NodeHash) -> StoreResult<bool> {
        self.inner.has(key).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeWriteResult {
    pub key: NodeHash,
    pub size: u64,
    /// Successor blocks written; 0 when the content fit in one node.
    pub block_count: usize,
}

fn hooked_store(ctx: &FsContext) -> Arc<HookedBlobStore> {
    Arc::new(HookedBlobStore::new(
        Arc::clone(&ctx.store),
        ctx.on_node_stored.clone(),
    ))
}

fn chunk_context(ctx: &FsContext) -> ChunkContext {
    ChunkContext::new(hooked_store(ctx), ctx.config.node_size_limit)
}

fn check_override(ctx: &FsContext, size: usize) -> FsResult<()> {
    match ctx.config.max_file_size_override {
        Some(max) if size as u64 > max => Err(FsError::FileTooLarge {
            size: size as u64,
            max,
            large_file_api: false,
        }),
        _ => Ok(()),
    }
}

/// Store `data` as a file of any size without placing it in a tree.
pub async fn write_large(
    ctx: &FsContext,
    data: &[u8],
    content_type: &str,
) -> FsResult<LargeWriteResult> {
    check_override(ctx, data.len())?;
    let store = hooked_store(ctx);
    let chunk_ctx = ChunkContext::new(store.clone(), ctx.config.node_size_limit);
    let written = match write_file(&chunk_ctx, data, content_type).await {
        Ok(written) => written,
        Err(e) => {
            return Err(match store.take_hook_failure() {
                Some(hook_err) => FsError::Hook(hook_err),
                None => e.into(),
            })
        }
    };
    Ok(LargeWriteResult {
        key: written.root,
        size: written.size,
        block_count: written.block_count,
    })
}

/// Store `data` as a file of any size and place it at `path`, with the same
/// create-or-overwrite rules as [`write`](crate::write::write).
pub async fn write_large_at(
    ctx: &FsContext,
    root: NodeHash,
    path: &str,
    data: &[u8],
    content_type: &str,
) -> FsResult<WriteResult> {
    let segments = parse_segments(path)?;
    let written = write_large(ctx, data, content_type).await?;
    let (new_root, created) = place_file(ctx, root, &segments, written.key).await?;
    debug!(path, size = written.size, blocks = written.block_count, root = %new_root.short_hex(), "large write placed");
    Ok(WriteResult {
        new_root,
        key: written.key.to_key(),
        size: written.size,
        content_type: content_type.to_string(),
        created,
    })
}

/// Read a whole file of any size into memory.
pub async fn read_large(ctx: &FsContext, key: &NodeHash) -> FsResult<Vec<u8>> {
    Ok(read_file(&chunk_context(ctx), *key).await?)
}

/// Stream a file of any size block by block.
pub fn stream_large(
    ctx: &FsContext,
    key: &NodeHash,
) -> impl Stream<Item = FsResult<Vec<u8>>> + Send + 'static {
    open_stream(&chunk_context(ctx), *key).map_err(FsError::from)
}

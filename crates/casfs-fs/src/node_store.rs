//! Content-addressed node fetch and store.

use casfs_codec::{decode, encode_directory, DirectoryNode, EncodedNode, Node};
use casfs_types::NodeHash;
use tracing::warn;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::hooks::StoredNodeInfo;

/// Fetch and decode a node.
///
/// Returns `Ok(None)` when the node is absent or its bytes do not decode.
/// Store I/O errors propagate.
pub async fn get_decoded(ctx: &FsContext, hash: &NodeHash) -> FsResult<Option<Node>> {
    let Some(bytes) = ctx.store.get(hash).await? else {
        return Ok(None);
    };
    match decode(&bytes) {
        Ok(node) => Ok(Some(node)),
        Err(e) => {
            warn!(key = %hash.short_hex(), error = %e, "undecodable node treated as missing");
            Ok(None)
        }
    }
}

/// Put an encoded node under its hash and fire the node-stored hook.
pub async fn store_node(ctx: &FsContext, encoded: EncodedNode) -> FsResult<NodeHash> {
    let EncodedNode {
        bytes,
        hash,
        kind,
        logical_size,
    } = encoded;

    match &ctx.on_node_stored {
        Some(hook) => {
            ctx.store.put(&hash, bytes.clone()).await?;
            let info = StoredNodeInfo {
                hash,
                bytes: &bytes,
                kind,
                logical_size,
            };
            hook.on_node_stored(&info).await?;
        }
        None => ctx.store.put(&hash, bytes).await?,
    }
    Ok(hash)
}

/// Encode and store a directory.
pub async fn store_directory(ctx: &FsContext, dir: &DirectoryNode) -> FsResult<NodeHash> {
    store_node(ctx, encode_directory(dir)?).await
}

/// Store an empty directory and return its hash, the starting root of a
/// fresh tree.
pub async fn empty_root(ctx: &FsContext) -> FsResult<NodeHash> {
    store_directory(ctx, &DirectoryNode::empty()).await
}

pub(crate) async fn load_root(ctx: &FsContext, root: &NodeHash) -> FsResult<Node> {
    get_decoded(ctx, root)
        .await?
        .ok_or_else(|| FsError::InvalidRoot { key: root.to_key() })
}

pub(crate) async fn load_child(ctx: &FsContext, hash: &NodeHash) -> FsResult<Node> {
    get_decoded(ctx, hash)
        .await?
        .ok_or_else(|| FsError::NodeNotFound { key: hash.to_key() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hooks::{HookError, NodeStoredHook};
    use crate::testing::{context, context_with_hook};
    use async_trait::async_trait;
    use casfs_codec::{encode_file, FileNode, NodeKind};
    use casfs_store::BlobStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn store_then_get_decoded() {
        let (_, ctx) = context();
        let file = FileNode::inline(b"data".to_vec(), "text/plain");
        let hash = store_node(&ctx, encode_file(&file).unwrap()).await.unwrap();
        assert_eq!(get_decoded(&ctx, &hash).await.unwrap(), Some(Node::File(file)));
    }

    #[tokio::test]
    async fn absent_node_is_none() {
        let (_, ctx) = context();
        let missing = NodeHash::from_hash([4; 32]);
        assert!(get_decoded(&ctx, &missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_node_is_none() {
        let (store, ctx) = context();
        let key = NodeHash::from_hash([8; 32]);
        store.put(&key, vec![0xde, 0xad]).await.unwrap();
        assert!(get_decoded(&ctx, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hook_sees_every_store() {
        let (_, hook, ctx) = context_with_hook();
        let root = empty_root(&ctx).await.unwrap();
        let file = encode_file(&FileNode::inline(vec![1, 2, 3], "x/y")).unwrap();
        store_node(&ctx, file).await.unwrap();

        let seen = hook.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (root, NodeKind::Directory, 0));
        assert_eq!(seen[1].1, NodeKind::File);
        assert_eq!(seen[1].2, 3);
    }

    struct FailingHook;

    #[async_trait]
    impl NodeStoredHook for FailingHook {
        async fn on_node_stored(&self, _info: &StoredNodeInfo<'_>) -> Result<(), HookError> {
            Err(HookError::new("refcount table unavailable"))
        }
    }

    #[tokio::test]
    async fn hook_failure_is_hard_error() {
        let (_, ctx) = context();
        let ctx = ctx.with_node_stored_hook(Arc::new(FailingHook));
        let err = empty_root(&ctx).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::HookFailed);
    }

    #[tokio::test]
    async fn missing_root_and_child_errors() {
        let (_, ctx) = context();
        let missing = NodeHash::from_hash([2; 32]);
        assert_eq!(load_root(&ctx, &missing).await.unwrap_err().code(), ErrorCode::InvalidRoot);
        assert_eq!(load_child(&ctx, &missing).await.unwrap_err().code(), ErrorCode::NodeNotFound);
    }
}

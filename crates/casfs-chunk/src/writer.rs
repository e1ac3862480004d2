use casfs_codec::{encode_file, encode_successor, EncodedNode, FileNode, SuccessorNode};
use casfs_types::NodeHash;
use tracing::debug;

use crate::context::ChunkContext;
use crate::error::ChunkResult;

/// Result of writing a file through the splitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenFile {
    /// Hash of the file node.
    pub root: NodeHash,
    /// Logical size in bytes.
    pub size: u64,
    /// Successor blocks written (0 for inline files).
    pub block_count: usize,
}

/// Store `data` as a file, splitting it into blocks when it exceeds one node.
pub async fn write_file(
    ctx: &ChunkContext,
    data: &[u8],
    content_type: &str,
) -> ChunkResult<WrittenFile> {
    let size = data.len() as u64;

    if data.len() <= ctx.block_size() {
        let encoded = encode_file(&FileNode::inline(data.to_vec(), content_type))?;
        let root = put(ctx, encoded).await?;
        return Ok(WrittenFile {
            root,
            size,
            block_count: 0,
        });
    }

    let mut level = Vec::with_capacity(data.len().div_ceil(ctx.block_size()));
    for chunk in data.chunks(ctx.block_size()) {
        let encoded = encode_successor(&SuccessorNode::leaf(chunk.to_vec()))?;
        level.push(put(ctx, encoded).await?);
    }
    let mut block_count = level.len();

    // Group levels until the top fits in the file node.
    let fanout = ctx.fanout();
    while level.len() > fanout {
        let mut next = Vec::with_capacity(level.len().div_ceil(fanout));
        for group in level.chunks(fanout) {
            let encoded = encode_successor(&SuccessorNode::interior(group.to_vec()))?;
            next.push(put(ctx, encoded).await?);
        }
        block_count += next.len();
        level = next;
    }

    let encoded = encode_file(&FileNode::with_successors(level, size, content_type))?;
    let root = put(ctx, encoded).await?;
    debug!(root = %root.short_hex(), size, block_count, "large file written");

    Ok(WrittenFile {
        root,
        size,
        block_count,
    })
}

async fn put(ctx: &ChunkContext, encoded: EncodedNode) -> ChunkResult<NodeHash> {
    let hash = encoded.hash;
    ctx.store.put(&hash, encoded.bytes).await?;
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casfs_codec::{decode, FileBody, Node};
    use casfs_store::{BlobStore, InMemoryBlobStore};
    use std::sync::Arc;

    fn context(max_node_size: usize) -> (Arc<InMemoryBlobStore>, ChunkContext) {
        let store = Arc::new(InMemoryBlobStore::new());
        let ctx = ChunkContext::new(store.clone(), max_node_size);
        (store, ctx)
    }

    async fn load(store: &InMemoryBlobStore, hash: &NodeHash) -> Node {
        decode(&store.get(hash).await.unwrap().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn small_file_is_inline() {
        let (store, ctx) = context(64);
        let written = write_file(&ctx, b"tiny", "text/plain").await.unwrap();
        assert_eq!(written.block_count, 0);
        assert_eq!(written.size, 4);
        assert_eq!(store.len(), 1);

        let Node::File(file) = load(&store, &written.root).await else {
            panic!("expected file node");
        };
        assert_eq!(file.payload(), Some(&b"tiny"[..]));
    }

    #[tokio::test]
    async fn exactly_one_block_is_inline() {
        let (_, ctx) = context(8);
        let written = write_file(&ctx, &[1; 8], "application/octet-stream").await.unwrap();
        assert_eq!(written.block_count, 0);
    }

    #[tokio::test]
    async fn large_file_builds_successor_levels() {
        // 64-byte blocks, fanout 2: 10 leaves need interior levels.
        let (store, ctx) = context(64);
        let data: Vec<u8> = (0..640u32).map(|i| (i % 251) as u8).collect();
        let written = write_file(&ctx, &data, "application/octet-stream").await.unwrap();

        assert_eq!(written.size, 640);
        // 10 leaves + 5 + 3 + 2 interior blocks.
        assert_eq!(written.block_count, 20);

        let Node::File(file) = load(&store, &written.root).await else {
            panic!("expected file node");
        };
        assert_eq!(file.size, 640);
        match file.body {
            FileBody::Successors(top) => assert!(top.len() <= ctx.fanout()),
            FileBody::Inline(_) => panic!("expected successors"),
        }
    }

    #[tokio::test]
    async fn repeated_blocks_are_stored_once() {
        let (store, ctx) = context(16);
        let data = vec![0xaa; 16 * 4];
        write_file(&ctx, &data, "application/octet-stream").await.unwrap();
        // One distinct leaf, one distinct interior pair, one file root.
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn content_type_does_not_change_blocks() {
        let (store, ctx) = context(16);
        let data = vec![7; 40];
        let a = write_file(&ctx, &data, "a/b").await.unwrap();
        let before = store.len();
        let b = write_file(&ctx, &data, "c/d").await.unwrap();
        assert_ne!(a.root, b.root);
        assert_eq!(store.len(), before + 1);
    }
}

use std::sync::Arc;

use casfs_codec::{decode, ContentHasher, FileBody, Node};
use casfs_store::BlobStore;
use casfs_types::NodeHash;
use futures::stream::{self, Stream, TryStreamExt};

use crate::context::ChunkContext;
use crate::error::{ChunkError, ChunkResult};

/// Deeper than any tree the writer produces for addressable sizes.
const MAX_DEPTH: usize = 64;

/// Read a whole file into memory.
pub async fn read_file(ctx: &ChunkContext, root: NodeHash) -> ChunkResult<Vec<u8>> {
    open_stream(ctx, root)
        .try_fold(Vec::new(), |mut acc, block| async move {
            acc.extend_from_slice(&block);
            Ok::<_, ChunkError>(acc)
        })
        .await
}

/// Stream a file block by block, in order.
///
/// Memory use is bounded by the tree depth times the fan-out plus one
/// block, regardless of the file size.
pub fn open_stream(
    ctx: &ChunkContext,
    root: NodeHash,
) -> impl Stream<Item = ChunkResult<Vec<u8>>> + Send + 'static {
    let cursor = Cursor {
        store: Arc::clone(&ctx.store),
        root,
        pending_root: true,
        stack: Vec::new(),
    };
    stream::try_unfold(cursor, Cursor::next_block)
}

struct Cursor {
    store: Arc<dyn BlobStore>,
    root: NodeHash,
    pending_root: bool,
    /// Unvisited successor hashes, one iterator per tree level.
    stack: Vec<std::vec::IntoIter<NodeHash>>,
}

impl Cursor {
    async fn next_block(mut self) -> ChunkResult<Option<(Vec<u8>, Self)>> {
        if self.pending_root {
            self.pending_root = false;
            let root_node = self.load(&self.root).await?;
            match root_node {
                Node::File(file) => match file.body {
                    FileBody::Inline(payload) => return Ok(Some((payload, self))),
                    FileBody::Successors(top) => self.stack.push(top.into_iter()),
                },
                other => {
                    return Err(ChunkError::NotAFile {
                        hash: self.root,
                        kind: other.kind(),
                    })
                }
            }
        }

        loop {
            let Some(level) = self.stack.last_mut() else {
                return Ok(None);
            };
            let Some(hash) = level.next() else {
                self.stack.pop();
                continue;
            };

            let block = match self.load(&hash).await? {
                Node::Successor(block) => block,
                other => {
                    return Err(ChunkError::UnexpectedNode {
                        hash,
                        kind: other.kind(),
                    })
                }
            };

            if !block.successors.is_empty() {
                if self.stack.len() >= MAX_DEPTH {
                    return Err(ChunkError::TooDeep(self.root));
                }
                self.stack.push(block.successors.into_iter());
            }
            if !block.payload.is_empty() {
                return Ok(Some((block.payload, self)));
            }
        }
    }

    async fn load(&self, hash: &NodeHash) -> ChunkResult<Node> {
        let bytes = self
            .store
            .get(hash)
            .await?
            .ok_or(ChunkError::MissingBlock(*hash))?;
        if !ContentHasher::NODE.verify(&bytes, hash) {
            return Err(ChunkError::HashMismatch(*hash));
        }
        Ok(decode(&bytes)?)
    }
}

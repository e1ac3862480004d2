use std::sync::Arc;

use casfs_store::BlobStore;
use casfs_types::HASH_LEN;

/// Everything the splitter needs: where blocks go and how big they may be.
#[derive(Clone)]
pub struct ChunkContext {
    pub store: Arc<dyn BlobStore>,
    /// Maximum payload bytes per block, and the inline threshold.
    pub max_node_size: usize,
}

impl ChunkContext {
    pub fn new(store: Arc<dyn BlobStore>, max_node_size: usize) -> Self {
        Self {
            store,
            max_node_size,
        }
    }

    /// Payload bytes per leaf block.
    pub fn block_size(&self) -> usize {
        self.max_node_size.max(1)
    }

    /// Successor hashes per interior block (never below 2).
    pub fn fanout(&self) -> usize {
        (self.max_node_size / HASH_LEN).max(2)
    }
}

impl std::fmt::Debug for ChunkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkContext")
            .field("max_node_size", &self.max_node_size)
            .finish_non_exhaustive()
    }
}

use casfs_codec::NodeKind;
use casfs_types::NodeHash;

/// Errors from splitting or reassembling large objects.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// A block referenced by the tree is not in the store.
    #[error("block not found: {0:?}")]
    MissingBlock(NodeHash),

    /// Stored bytes do not hash to their key (data corruption).
    #[error("hash mismatch for block {0:?}")]
    HashMismatch(NodeHash),

    /// The root of a read is not a file node.
    #[error("node {hash:?} is a {kind}, not a file")]
    NotAFile { hash: NodeHash, kind: NodeKind },

    /// A successor position holds something other than a successor block.
    #[error("unexpected {kind} node {hash:?} inside a block tree")]
    UnexpectedNode { hash: NodeHash, kind: NodeKind },

    /// The block tree is deeper than any tree this splitter writes.
    #[error("block tree under {0:?} exceeds maximum depth")]
    TooDeep(NodeHash),

    #[error("codec error: {0}")]
    Codec(#[from] casfs_codec::CodecError),

    #[error("store error: {0}")]
    Store(#[from] casfs_store::StoreError),
}

/// Result alias for splitter operations.
pub type ChunkResult<T> = Result<T, ChunkError>;

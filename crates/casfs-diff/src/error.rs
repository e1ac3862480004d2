use casfs_codec::NodeKind;
use casfs_types::NodeHash;

/// Errors that can occur while diffing two roots.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A node referenced by either tree is not in the store.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeHash),

    /// A root handed to the diff is not a directory.
    #[error("root {hash:?} is a {kind}, not a directory")]
    NotADirectory { hash: NodeHash, kind: NodeKind },

    #[error("store error: {0}")]
    Store(#[from] casfs_store::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] casfs_codec::CodecError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;

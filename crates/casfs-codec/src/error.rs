/// Errors from encoding or decoding nodes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed (for example the node exceeds the encode limit).
    #[error("encode error: {0}")]
    Encode(String),

    /// The bytes are not a valid node encoding.
    #[error("decode error: {0}")]
    Decode(String),

    /// The bytes were written by an unknown format version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// The bytes decode but violate a node invariant.
    #[error("invalid node: {0}")]
    InvalidNode(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

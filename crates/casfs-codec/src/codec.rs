//! Deterministic binary encoding of nodes.
//!
//! Layout: one format-version byte followed by the bincode encoding of the
//! node (fixed-width integers, little endian, no trailing bytes).

use bincode::Options;
use casfs_types::NodeHash;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::hasher::ContentHasher;
use crate::node::{DirectoryNode, FileBody, FileNode, Node, NodeKind, SuccessorNode};

/// Version byte prefixed to every encoded node.
pub const FORMAT_VERSION: u8 = 1;

/// Upper bound on the size of a single encoded node.
pub const MAX_ENCODED_LEN: u64 = 64 * 1024 * 1024;

/// Bytes and hash of an encoded node, ready to store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedNode {
    pub bytes: Vec<u8>,
    pub hash: NodeHash,
    pub kind: NodeKind,
    /// Directories: 0. Files: logical file size. Successors: payload length.
    pub logical_size: u64,
}

// Borrowed mirror of `Node`. Variant order must match `Node` exactly.
#[derive(Serialize)]
enum NodeRef<'a> {
    Directory(&'a DirectoryNode),
    File(&'a FileNode),
    Successor(&'a SuccessorNode),
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_ENCODED_LEN)
        .reject_trailing_bytes()
}

fn encode_ref(node: NodeRef<'_>, kind: NodeKind, logical_size: u64) -> CodecResult<EncodedNode> {
    let body = options()
        .serialize(&node)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    let mut bytes = Vec::with_capacity(body.len() + 1);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&body);
    let hash = ContentHasher::NODE.hash(&bytes);
    Ok(EncodedNode {
        bytes,
        hash,
        kind,
        logical_size,
    })
}

/// Encode a directory node.
pub fn encode_directory(dir: &DirectoryNode) -> CodecResult<EncodedNode> {
    encode_ref(NodeRef::Directory(dir), NodeKind::Directory, 0)
}

/// Encode a file node.
pub fn encode_file(file: &FileNode) -> CodecResult<EncodedNode> {
    validate_file(file)?;
    encode_ref(NodeRef::File(file), NodeKind::File, file.size)
}

/// Encode a successor block.
pub fn encode_successor(block: &SuccessorNode) -> CodecResult<EncodedNode> {
    encode_ref(
        NodeRef::Successor(block),
        NodeKind::Successor,
        block.payload.len() as u64,
    )
}

/// Encode any node.
pub fn encode(node: &Node) -> CodecResult<EncodedNode> {
    match node {
        Node::Directory(dir) => encode_directory(dir),
        Node::File(file) => encode_file(file),
        Node::Successor(block) => encode_successor(block),
    }
}

/// Decode bytes produced by [`encode`].
pub fn decode(bytes: &[u8]) -> CodecResult<Node> {
    let (&version, body) = bytes
        .split_first()
        .ok_or_else(|| CodecError::Decode("empty input".into()))?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let node: Node = options()
        .deserialize(body)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    if let Node::File(file) = &node {
        validate_file(file)?;
    }
    Ok(node)
}

fn validate_file(file: &FileNode) -> CodecResult<()> {
    if let FileBody::Inline(payload) = &file.body {
        if payload.len() as u64 != file.size {
            return Err(CodecError::InvalidNode(format!(
                "inline file declares size {} but carries {} bytes",
                file.size,
                payload.len()
            )));
        }
    }
    Ok(())
}

//! Node model and codec for casfs.
//!
//! Every node in a casfs tree is stored as the deterministic binary encoding
//! of a [`Node`], keyed by the domain-separated BLAKE3 hash of those bytes.
//!
//! # Node Types
//!
//! - [`DirectoryNode`] -- ordered `(name, hash)` entries
//! - [`FileNode`] -- single-block payload or a list of successor blocks
//! - [`SuccessorNode`] -- interior or leaf block of a large file
//!
//! # Design Rules
//!
//! 1. Encoding is byte-deterministic: equal nodes always encode to equal
//!    bytes, so equal content always shares one hash.
//! 2. `decode(encode(n)) == n` for every node.
//! 3. The codec never touches storage; it only maps nodes to bytes and hashes.

pub mod codec;
pub mod error;
pub mod hasher;
pub mod node;

pub use codec::{
    decode, encode, encode_directory, encode_file, encode_successor, EncodedNode,
    FORMAT_VERSION, MAX_ENCODED_LEN,
};
pub use error::{CodecError, CodecResult};
pub use hasher::ContentHasher;
pub use node::{DirEntry, DirectoryNode, FileBody, FileNode, Node, NodeKind, SuccessorNode};

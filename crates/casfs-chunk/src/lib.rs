//! Large-object splitter for casfs.
//!
//! Files larger than one node are stored as a tree of successor blocks:
//! leaves hold at most `max_node_size` payload bytes, interior blocks hold
//! at most `max_node_size / 32` successor hashes, and the root is a file
//! node whose body lists the top level of the tree. Files that fit in one
//! node are stored inline.
//!
//! Identical blocks share one hash, so repeated content is stored once.

pub mod context;
pub mod error;
pub mod reader;
pub mod writer;

pub use context::ChunkContext;
pub use error::{ChunkError, ChunkResult};
pub use reader::{open_stream, read_file};
pub use writer::{write_file, WrittenFile};

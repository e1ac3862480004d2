//! Blob storage for casfs.
//!
//! A blob store is a flat `NodeHash -> bytes` map. It never interprets the
//! bytes it holds; decoding, hashing and tree structure live in the layers
//! above it.
//!
//! # Storage Backends
//!
//! All backends implement the async [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. `put` is idempotent: the same key always carries the same bytes, so a
//!    repeated or concurrent `put` of one key is a no-op.
//! 2. Concurrent reads are always safe (blobs are immutable).
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;

//! Copy-on-write filesystem engine for casfs.
//!
//! A filesystem is a tree of immutable, content-addressed nodes and a root
//! is just the hash of its top directory. Every mutating verb takes a root
//! and returns a new one: the touched path is re-encoded from the changed
//! node up to the root, and everything else is shared by hash with the old
//! tree.
//!
//! # Verbs
//!
//! - Read: [`stat`], [`read`], [`ls`]
//! - Write: [`write`], [`mkdir`], [`rm`], [`mv`], [`cp`], [`rewrite`]
//! - Large files: [`write_large`], [`write_large_at`], [`read_large`],
//!   [`stream_large`]
//! - Merging: [`apply_merge_ops`]
//!
//! # Design Rules
//!
//! 1. Operations are pure functions of `(root, inputs)`; the only side
//!    effects are idempotent blob-store `put`s and hook calls.
//! 2. A failed operation never yields a partially applied root. Nodes it
//!    already stored may remain unreferenced.
//! 3. Policy (bookkeeping, link authorization, key aliases) comes from
//!    hooks on [`FsContext`], never from the engine.

pub mod config;
pub mod context;
pub mod ensure;
pub mod error;
pub mod hooks;
pub mod keys;
pub mod large;
pub mod merge;
pub mod merkle;
pub mod mutate;
pub mod node_store;
pub mod read;
pub mod resolve;
pub mod rewrite;
pub mod write;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, FsConfig};
pub use context::FsContext;
pub use ensure::{ensure_parent_dirs, EnsuredParent};
pub use error::{ErrorCode, ErrorPayload, FsError, FsResult};
pub use hooks::{
    DenyAllLinks, HookError, LinkAuthorizer, NodeKeyResolver, NodeStoredHook, StoredNodeInfo,
};
pub use keys::resolve_node_key;
pub use large::{
    read_large, stream_large, write_large, write_large_at, HookedBlobStore, LargeWriteResult,
};
pub use merge::{apply_merge_ops, MergeApplyResult, MergeOp};
pub use merkle::rebuild;
pub use mutate::{insert_child, remove_child};
pub use node_store::{empty_root, get_decoded, store_directory, store_node};
pub use read::{ls, read, stat, EntryType, LsResult, ReadResult, StatResult};
pub use resolve::{parse_segments, resolve, resolve_path, ParentLink, ResolvedNode};
pub use rewrite::{rewrite, EntrySource, RewriteEntry, RewriteRequest, RewriteResult};
pub use write::{
    cp, mkdir, mv, rm, write, CpResult, MkdirResult, MvResult, RmResult, Target, WriteResult,
};

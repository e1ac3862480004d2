//! Tree diff for casfs.
//!
//! Compares two roots stored in the same blob store. Subtrees with equal
//! hashes are skipped without being loaded, so the cost is proportional to
//! what changed rather than to the size of the trees.
//!
//! # Key Types
//!
//! - [`TreeDiff`] / [`TreeChange`] -- path-level changes between two roots
//! - [`TreeDiff::to_merge_ops`] -- the same changes as
//!   [`MergeOp`](casfs_fs::MergeOp)s for [`apply_merge_ops`](casfs_fs::apply_merge_ops)

pub mod error;
pub mod tree_diff;

pub use error::{DiffError, DiffResult};
pub use tree_diff::{diff_roots, TreeChange, TreeDiff};

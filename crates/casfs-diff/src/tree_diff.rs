//! Root-level diff: walk two trees and report what changed, by path.
//!
//! Entries are matched by name within each directory. Directories present
//! on both sides with different hashes are descended into; anything else
//! that differs is reported as a whole. A deletion and an addition of the
//! same node are folded into a rename.

use std::collections::BTreeMap;

use casfs_codec::{decode, Node};
use casfs_fs::MergeOp;
use casfs_store::BlobStore;
use casfs_types::NodeHash;
use serde::Serialize;
use tracing::debug;

use crate::error::{DiffError, DiffResult};

/// The result of comparing two roots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeDiff {
    /// Changes ordered by path.
    pub changes: Vec<TreeChange>,
}

impl TreeDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Express the diff as merge operations that turn the old root into
    /// the new one when applied with
    /// [`apply_merge_ops`](casfs_fs::apply_merge_ops).
    pub fn to_merge_ops(&self) -> Vec<MergeOp> {
        let mut ops = Vec::with_capacity(self.changes.len());
        for change in &self.changes {
            match change {
                TreeChange::Added { path, new_key } => ops.push(MergeOp::Add {
                    path: path.clone(),
                    key: new_key.to_key(),
                }),
                TreeChange::Deleted { path, .. } => ops.push(MergeOp::Remove { path: path.clone() }),
                TreeChange::Modified { path, new_key, .. } => ops.push(MergeOp::Update {
                    path: path.clone(),
                    key: new_key.to_key(),
                }),
                TreeChange::Renamed {
                    old_path,
                    new_path,
                    key,
                } => {
                    ops.push(MergeOp::Remove {
                        path: old_path.clone(),
                    });
                    ops.push(MergeOp::Add {
                        path: new_path.clone(),
                        key: key.to_key(),
                    });
                }
            }
        }
        ops
    }
}

/// A single change between two roots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum TreeChange {
    Added {
        path: String,
        new_key: NodeHash,
    },
    Deleted {
        path: String,
        old_key: NodeHash,
    },
    /// Same path, different node. Covers a file turning into a directory
    /// and back.
    Modified {
        path: String,
        old_key: NodeHash,
        new_key: NodeHash,
    },
    /// The same node moved to another path.
    Renamed {
        old_path: String,
        new_path: String,
        key: NodeHash,
    },
}

impl TreeChange {
    /// Path the change is reported under (the new path for renames).
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Deleted { path, .. } | Self::Modified { path, .. } => {
                path
            }
            Self::Renamed { new_path, .. } => new_path,
        }
    }
}

/// Compare two roots held in `store`.
pub async fn diff_roots(
    store: &dyn BlobStore,
    old_root: &NodeHash,
    new_root: &NodeHash,
) -> DiffResult<TreeDiff> {
    let mut changes = Vec::new();
    let mut pending = vec![(String::new(), *old_root, *new_root)];

    while let Some((prefix, old_hash, new_hash)) = pending.pop() {
        if old_hash == new_hash {
            continue;
        }
        let old_node = load(store, &old_hash).await?;
        let new_node = load(store, &new_hash).await?;

        let (old_dir, new_dir) = match (old_node, new_node) {
            (Node::Directory(old_dir), Node::Directory(new_dir)) => (old_dir, new_dir),
            (old_node, new_node) if prefix.is_empty() => {
                let (hash, kind) = if old_node.is_directory() {
                    (new_hash, new_node.kind())
                } else {
                    (old_hash, old_node.kind())
                };
                return Err(DiffError::NotADirectory { hash, kind });
            }
            _ => {
                changes.push(TreeChange::Modified {
                    path: prefix,
                    old_key: old_hash,
                    new_key: new_hash,
                });
                continue;
            }
        };

        let old_entries: BTreeMap<&str, NodeHash> = old_dir
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.hash))
            .collect();
        let new_entries: BTreeMap<&str, NodeHash> = new_dir
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.hash))
            .collect();

        for (name, old_child) in &old_entries {
            let path = join(&prefix, name);
            match new_entries.get(name) {
                Some(new_child) if new_child == old_child => {}
                Some(new_child) => pending.push((path, *old_child, *new_child)),
                None => changes.push(TreeChange::Deleted {
                    path,
                    old_key: *old_child,
                }),
            }
        }
        for (name, new_child) in &new_entries {
            if !old_entries.contains_key(name) {
                changes.push(TreeChange::Added {
                    path: join(&prefix, name),
                    new_key: *new_child,
                });
            }
        }
    }

    let mut changes = fold_renames(changes);
    changes.sort_by(|a, b| a.path().cmp(b.path()));
    debug!(
        old = %old_root.short_hex(),
        new = %new_root.short_hex(),
        changes = changes.len(),
        "tree diff computed"
    );
    Ok(TreeDiff { changes })
}

async fn load(store: &dyn BlobStore, hash: &NodeHash) -> DiffResult<Node> {
    let bytes = store
        .get(hash)
        .await?
        .ok_or(DiffError::NodeNotFound(*hash))?;
    Ok(decode(&bytes)?)
}

/// Pair deletions with additions of the same node.
fn fold_renames(changes: Vec<TreeChange>) -> Vec<TreeChange> {
    let mut deleted = Vec::new();
    let mut added = Vec::new();
    let mut out = Vec::with_capacity(changes.len());
    for change in changes {
        match change {
            TreeChange::Deleted { path, old_key } => deleted.push((path, old_key)),
            TreeChange::Added { path, new_key } => added.push(Some((path, new_key))),
            other => out.push(other),
        }
    }

    for (old_path, old_key) in deleted {
        let matched = added
            .iter_mut()
            .find(|slot| matches!(slot, Some((_, key)) if *key == old_key))
            .and_then(Option::take);
        match matched {
            Some((new_path, key)) => out.push(TreeChange::Renamed {
                old_path,
                new_path,
                key,
            }),
            None => out.push(TreeChange::Deleted {
                path: old_path,
                old_key,
            }),
        }
    }
    out.extend(
        added
            .into_iter()
            .flatten()
            .map(|(path, new_key)| TreeChange::Added { path, new_key }),
    );
    out
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

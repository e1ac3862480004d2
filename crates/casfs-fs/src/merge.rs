use casfs_types::NodeHash;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::FsContext;
use crate::error::FsResult;
use crate::rewrite::{rewrite, RewriteEntry, RewriteRequest};

/// One change produced by a merge or diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MergeOp {
    Add { path: String, key: String },
    Update { path: String, key: String },
    Remove { path: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeApplyResult {
    pub new_root: NodeHash,
    pub entries_applied: usize,
    pub deleted: usize,
}

/// Apply merge operations as a single rewrite.
///
/// Removals run first, then adds and updates in order, each linking the
/// given key. Either every operation applies or the call fails.
pub async fn apply_merge_ops(
    ctx: &FsContext,
    root: NodeHash,
    ops: &[MergeOp],
) -> FsResult<MergeApplyResult> {
    if ops.is_empty() {
        return Ok(MergeApplyResult {
            new_root: root,
            entries_applied: 0,
            deleted: 0,
        });
    }

    let mut request = RewriteRequest::default();
    for op in ops {
        match op {
            MergeOp::Add { path, key } | MergeOp::Update { path, key } => {
                request
                    .entries
                    .push(RewriteEntry::link(path.clone(), key.clone(), None));
            }
            MergeOp::Remove { path } => request.deletes.push(path.clone()),
        }
    }

    match rewrite(ctx, root, request).await {
        Ok(result) => Ok(MergeApplyResult {
            new_root: result.new_root,
            entries_applied: result.entries_applied,
            deleted: result.deleted,
        }),
        Err(e) => {
            warn!(root = %root.short_hex(), ops = ops.len(), error = %e, "merge apply failed");
            Err(e)
        }
    }
}

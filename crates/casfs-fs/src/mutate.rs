use casfs_codec::DirectoryNode;
use casfs_types::NodeHash;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::merkle::rebuild;
use crate::node_store::store_directory;
use crate::resolve::ParentLink;

/// Append `name -> child` to `dir` and rebuild up to a new root.
///
/// `parent_path` is the ancestor chain of `dir` itself. Duplicate names are
/// the caller's concern.
pub async fn insert_child(
    ctx: &FsContext,
    parent_path: &[ParentLink],
    dir: &DirectoryNode,
    name: &str,
    child: NodeHash,
) -> FsResult<NodeHash> {
    let max = ctx.config.max_collection_children;
    if dir.len() >= max {
        return Err(FsError::CollectionFull { max });
    }
    check_name(ctx, name)?;

    let updated = dir.with_entry(name, child);
    let hash = store_directory(ctx, &updated).await?;
    rebuild(ctx, parent_path, hash).await
}

/// Drop the entry at `index` from `dir` and rebuild up to a new root.
pub async fn remove_child(
    ctx: &FsContext,
    parent_path: &[ParentLink],
    dir: &DirectoryNode,
    index: usize,
) -> FsResult<NodeHash> {
    let updated = dir.without_entry(index);
    let hash = store_directory(ctx, &updated).await?;
    rebuild(ctx, parent_path, hash).await
}

pub(crate) fn check_name(ctx: &FsContext, name: &str) -> FsResult<()> {
    let max = ctx.config.max_name_bytes;
    if name.len() > max {
        return Err(FsError::NameTooLong {
            len: name.len(),
            max,
        });
    }
    Ok(())
}

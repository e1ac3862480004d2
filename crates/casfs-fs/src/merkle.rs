use casfs_types::NodeHash;
use tracing::debug;

use crate::context::FsContext;
use crate::error::FsResult;
use crate::node_store::store_directory;
use crate::resolve::ParentLink;

/// Re-encode every ancestor in `parent_path` around a new leaf hash.
///
/// Works from the innermost ancestor outwards; each level swaps in the hash
/// produced by the level below. Siblings keep their hashes. An empty parent
/// path makes `new_leaf` the new root.
pub async fn rebuild(
    ctx: &FsContext,
    parent_path: &[ParentLink],
    new_leaf: NodeHash,
) -> FsResult<NodeHash> {
    let mut current = new_leaf;
    for link in parent_path.iter().rev() {
        let dir = link.dir.with_hash_at(link.index, current);
        current = store_directory(ctx, &dir).await?;
    }
    debug!(depth = parent_path.len(), root = %current.short_hex(), "merkle path rebuilt");
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve_path;
    use crate::testing::{context, fresh_root, put};

    #[tokio::test]
    async fn empty_parent_path_returns_leaf() {
        let (_, ctx) = context();
        let leaf = NodeHash::from_hash([6; 32]);
        assert_eq!(rebuild(&ctx, &[], leaf).await.unwrap(), leaf);
    }

    #[tokio::test]
    async fn rebuilding_with_same_leaf_is_identity() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "a/b/c.txt", "content").await;

        let resolved = resolve_path(&ctx, root, "a/b/c.txt").await.unwrap();
        let rebuilt = rebuild(&ctx, &resolved.parent_path, resolved.hash).await.unwrap();
        assert_eq!(rebuilt, root);
    }

    #[tokio::test]
    async fn rebuild_touches_one_node_per_level() {
        let (store, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "a/b/c.txt", "one").await;
        let root = put(&ctx, root, "a/side.txt", "two").await;

        let resolved = resolve_path(&ctx, root, "a/b/c.txt").await.unwrap();
        let before = store.put_count();
        let leaf = NodeHash::from_hash([1; 32]);
        let new_root = rebuild(&ctx, &resolved.parent_path, leaf).await.unwrap();

        assert_eq!(store.put_count() - before, 3);
        let side_before = resolve_path(&ctx, root, "a/side.txt").await.unwrap().hash;
        let a = resolve_path(&ctx, new_root, "a").await.unwrap();
        let side_entry = a.node.as_directory().unwrap().find("side.txt").unwrap().1;
        assert_eq!(side_entry.hash, side_before);
    }
}

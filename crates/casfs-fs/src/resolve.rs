//! Path resolution.
//!
//! Resolution walks from a root through each segment, recording every
//! directory it passes through. That record (the parent path) is exactly
//! what [`rebuild`](crate::merkle::rebuild) needs to produce a new root once
//! the resolved node changes.

use casfs_codec::{DirectoryNode, Node};
use casfs_types::{format_path, parse_path, NodeHash, PathSegment};

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::node_store::{load_child, load_root};

/// One ancestor on the way to a resolved node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentLink {
    /// Hash of the ancestor directory.
    pub hash: NodeHash,
    pub dir: DirectoryNode,
    /// Position of the next step within `dir`.
    pub index: usize,
}

/// A node found by path, with everything needed to rebuild its ancestors.
#[derive(Clone, Debug)]
pub struct ResolvedNode {
    pub hash: NodeHash,
    pub node: Node,
    /// Name of the node in its parent; empty for the root.
    pub name: String,
    /// Ancestors from the root down to (not including) this node.
    pub parent_path: Vec<ParentLink>,
}

impl ResolvedNode {
    /// Immediate parent link and the ancestors above it. `None` for the root.
    pub fn split_parent(&self) -> Option<(&ParentLink, &[ParentLink])> {
        self.parent_path.split_last()
    }

    /// The node's path spelled with entry names only, whatever segments
    /// were used to reach it.
    pub fn name_path(&self) -> String {
        let names: Vec<&str> = self
            .parent_path
            .iter()
            .filter_map(|link| link.dir.get(link.index))
            .map(|entry| entry.name.as_str())
            .collect();
        names.join("/")
    }
}

/// Parse a path string, mapping syntax errors to [`FsError::InvalidPath`].
pub fn parse_segments(path: &str) -> FsResult<Vec<PathSegment>> {
    parse_path(path).map_err(|e| FsError::InvalidPath(e.to_string()))
}

/// Resolve `segments` against `root`.
pub async fn resolve(
    ctx: &FsContext,
    root: NodeHash,
    segments: &[PathSegment],
) -> FsResult<ResolvedNode> {
    let mut hash = root;
    let mut node = load_root(ctx, &root).await?;
    let mut name = String::new();
    let mut parent_path = Vec::with_capacity(segments.len());

    for (pos, segment) in segments.iter().enumerate() {
        let dir = match node {
            Node::Directory(dir) => dir,
            _ => {
                return Err(FsError::NotADirectory {
                    segment: segment.to_string(),
                    resolved: format_path(&segments[..pos]),
                })
            }
        };

        let index = match segment {
            PathSegment::Name(wanted) => match dir.find(wanted) {
                Some((index, _)) => index,
                None => {
                    return Err(FsError::PathNotFound {
                        path: format_path(&segments[..=pos]),
                    })
                }
            },
            PathSegment::Index(index) => {
                if *index >= dir.len() {
                    return Err(FsError::IndexOutOfBounds {
                        index: *index,
                        max: dir.len().checked_sub(1),
                        path: format_path(&segments[..=pos]),
                    });
                }
                *index
            }
        };

        let entry = &dir.entries[index];
        let child_hash = entry.hash;
        name = entry.name.clone();
        node = load_child(ctx, &child_hash).await?;
        parent_path.push(ParentLink { hash, dir, index });
        hash = child_hash;
    }

    Ok(ResolvedNode {
        hash,
        node,
        name,
        parent_path,
    })
}

/// Resolve a path string.
pub async fn resolve_path(ctx: &FsContext, root: NodeHash, path: &str) -> FsResult<ResolvedNode> {
    resolve(ctx, root, &parse_segments(path)?).await
}

/// Resolve, turning "nothing there" into `Ok(None)`.
pub(crate) async fn lookup(
    ctx: &FsContext,
    root: NodeHash,
    segments: &[PathSegment],
) -> FsResult<Option<ResolvedNode>> {
    match resolve(ctx, root, segments).await {
        Ok(resolved) => Ok(Some(resolved)),
        Err(FsError::PathNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{context, fresh_root, put};

    #[tokio::test]
    async fn empty_path_is_root() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let resolved = resolve(&ctx, root, &[]).await.unwrap();
        assert_eq!(resolved.hash, root);
        assert!(resolved.parent_path.is_empty());
        assert_eq!(resolved.name, "");
        assert!(resolved.split_parent().is_none());
    }

    #[tokio::test]
    async fn resolves_names_and_records_parents() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "a/b/c.txt", "hi").await;

        let resolved = resolve_path(&ctx, root, "a/b/c.txt").await.unwrap();
        assert_eq!(resolved.name, "c.txt");
        assert_eq!(resolved.parent_path.len(), 3);
        assert_eq!(resolved.parent_path[0].hash, root);
        assert!(matches!(resolved.node, Node::File(_)));
    }

    #[tokio::test]
    async fn index_segments_mix_with_names() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "docs/one.md", "1").await;
        let root = put(&ctx, root, "docs/two.md", "2").await;

        let resolved = resolve_path(&ctx, root, "docs/~1").await.unwrap();
        assert_eq!(resolved.name, "two.md");
        assert_eq!(resolved.parent_path[1].index, 1);

        let by_index = resolve_path(&ctx, root, "~0/two.md").await.unwrap();
        assert_eq!(by_index.hash, resolved.hash);
    }

    #[tokio::test]
    async fn index_out_of_bounds_reports_max() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "x.txt", "x").await;

        let err = resolve_path(&ctx, root, "~3").await.unwrap_err();
        match err {
            FsError::IndexOutOfBounds { index, max, .. } => {
                assert_eq!(index, 3);
                assert_eq!(max, Some(0));
            }
            other => panic!("expected IndexOutOfBounds, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn descending_into_file_is_not_a_directory() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "a/file.txt", "x").await;

        let err = resolve_path(&ctx, root, "a/file.txt/deeper").await.unwrap_err();
        match err {
            FsError::NotADirectory { segment, resolved } => {
                assert_eq!(segment, "deeper");
                assert_eq!(resolved, "a/file.txt");
            }
            other => panic!("expected NotADirectory, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_name_and_root() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let err = resolve_path(&ctx, root, "nope/x").await.unwrap_err();
        assert!(matches!(err, FsError::PathNotFound { ref path } if path == "nope"));

        let bogus = NodeHash::from_hash([3; 32]);
        let err = resolve(&ctx, bogus, &[]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRoot);
    }

    #[tokio::test]
    async fn lookup_maps_only_missing_paths() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "f", "x").await;
        assert!(lookup(&ctx, root, &parse_segments("g").unwrap()).await.unwrap().is_none());
        assert!(lookup(&ctx, root, &parse_segments("f/g").unwrap()).await.is_err());
    }

    #[test]
    fn bad_syntax_is_invalid_path() {
        assert_eq!(parse_segments("a/../b").unwrap_err().code(), ErrorCode::InvalidPath);
    }
}

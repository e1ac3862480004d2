//! Intermediate directory creation.

use casfs_codec::{DirectoryNode, Node};
use casfs_types::{format_path, NodeHash, PathSegment};
use tracing::debug;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::mutate::{check_name, insert_child};
use crate::node_store::{load_child, load_root, store_directory};
use crate::resolve::ParentLink;

/// The directory that will hold the last segment of a target path.
#[derive(Clone, Debug)]
pub struct EnsuredParent {
    /// Root the parent path belongs to. Differs from the input root when
    /// directories were created.
    pub root: NodeHash,
    pub hash: NodeHash,
    pub dir: DirectoryNode,
    /// Ancestors of `dir`.
    pub parent_path: Vec<ParentLink>,
}

/// Make sure every segment of `segments` except the last names a directory,
/// creating missing ones.
///
/// Index segments never create anything; they must point at existing
/// directories.
pub async fn ensure_parent_dirs(
    ctx: &FsContext,
    root: NodeHash,
    segments: &[PathSegment],
) -> FsResult<EnsuredParent> {
    let parents = &segments[..segments.len().saturating_sub(1)];
    let mut root = root;

    'walk: loop {
        let mut hash = root;
        let mut node = load_root(ctx, &root).await?;
        let mut parent_path = Vec::with_capacity(parents.len());

        for (pos, segment) in parents.iter().enumerate() {
            let dir = match node {
                Node::Directory(dir) => dir,
                _ => {
                    return Err(FsError::NotADirectory {
                        segment: segment.to_string(),
                        resolved: format_path(&parents[..pos]),
                    })
                }
            };

            let index = match segment {
                PathSegment::Name(name) => match dir.find(name) {
                    Some((index, _)) => index,
                    None => {
                        root = create_missing(ctx, &parent_path, &dir, &parents[pos..]).await?;
                        continue 'walk;
                    }
                },
                PathSegment::Index(index) => {
                    if *index >= dir.len() {
                        return Err(FsError::IndexOutOfBounds {
                            index: *index,
                            max: dir.len().checked_sub(1),
                            path: format_path(&parents[..=pos]),
                        });
                    }
                    *index
                }
            };

            let child = dir.entries[index].hash;
            node = load_child(ctx, &child).await?;
            parent_path.push(ParentLink { hash, dir, index });
            hash = child;
        }

        return match node {
            Node::Directory(dir) => Ok(EnsuredParent {
                root,
                hash,
                dir,
                parent_path,
            }),
            _ => Err(FsError::NotADirectory {
                segment: segments.last().map(ToString::to_string).unwrap_or_default(),
                resolved: format_path(parents),
            }),
        };
    }
}

/// Attach the missing directories `remaining` below `dir`, returning the new
/// root.
async fn create_missing(
    ctx: &FsContext,
    parent_path: &[ParentLink],
    dir: &DirectoryNode,
    remaining: &[PathSegment],
) -> FsResult<NodeHash> {
    let names: Option<Vec<&str>> = remaining.iter().map(PathSegment::as_name).collect();

    match names {
        Some(names) => {
            for name in &names {
                check_name(ctx, name)?;
            }
            // Innermost first; each level wraps the one below.
            let mut child = store_directory(ctx, &DirectoryNode::empty()).await?;
            for name in names[1..].iter().rev() {
                child = store_directory(ctx, &DirectoryNode::single(*name, child)).await?;
            }
            let root = insert_child(ctx, parent_path, dir, names[0], child).await?;
            debug!(created = names.len(), root = %root.short_hex(), "created directory chain");
            Ok(root)
        }
        None => {
            let name = remaining[0].as_name().unwrap_or_default();
            let empty = store_directory(ctx, &DirectoryNode::empty()).await?;
            insert_child(ctx, parent_path, dir, name, empty).await
        }
    }
}

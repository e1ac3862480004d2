//! Mutating verbs: `write`, `mkdir`, `rm`, `mv`, `cp`.
//!
//! Every verb takes a root and returns a new one. Nothing is persisted
//! besides the content-addressed nodes themselves; publishing the new root
//! is up to the caller.

use casfs_codec::{encode_file, DirectoryNode, FileNode, Node};
use casfs_types::{format_path, NodeHash, PathSegment};
use serde::Serialize;
use tracing::debug;

use crate::context::FsContext;
use crate::ensure::ensure_parent_dirs;
use crate::error::{FsError, FsResult};
use crate::merkle::rebuild;
use crate::mutate::{insert_child, remove_child};
use crate::node_store::{store_directory, store_node};
use crate::resolve::{lookup, parse_segments, resolve};

/// Where a verb applies: a path string, or a path of child indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Path(String),
    Indices(Vec<usize>),
}

impl Target {
    /// Parse a colon-separated index path such as `0:2:1`. The empty
    /// string addresses the root.
    pub fn parse_index_path(s: &str) -> FsResult<Self> {
        if s.is_empty() {
            return Ok(Self::Indices(Vec::new()));
        }
        s.split(':')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| FsError::InvalidPath(format!("bad index {part:?} in {s:?}")))
            })
            .collect::<FsResult<Vec<_>>>()
            .map(Self::Indices)
    }

    pub fn segments(&self) -> FsResult<Vec<PathSegment>> {
        match self {
            Self::Path(path) => parse_segments(path),
            Self::Indices(indices) => Ok(indices.iter().copied().map(PathSegment::Index).collect()),
        }
    }
}

impl From<&str> for Target {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<Vec<usize>> for Target {
    fn from(indices: Vec<usize>) -> Self {
        Self::Indices(indices)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub new_root: NodeHash,
    pub key: String,
    pub size: u64,
    pub content_type: String,
    /// `false` when an existing file was overwritten.
    pub created: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MkdirResult {
    pub new_root: NodeHash,
    pub key: String,
    pub created: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RmResult {
    pub new_root: NodeHash,
    /// Key of the removed node.
    pub removed: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MvResult {
    pub new_root: NodeHash,
    pub key: String,
    /// Source path spelled with entry names.
    pub from: String,
    /// Where the node ended up, which is below `to` when it was merged
    /// into an existing directory.
    pub to: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpResult {
    pub new_root: NodeHash,
    pub key: String,
}

/// Store `content` as a single-block file at `target`.
pub async fn write(
    ctx: &FsContext,
    root: NodeHash,
    target: &Target,
    content: &[u8],
    content_type: &str,
) -> FsResult<WriteResult> {
    let limit = ctx.config.node_size_limit;
    if content.len() > limit {
        return Err(FsError::FileTooLarge {
            size: content.len() as u64,
            max: limit as u64,
            large_file_api: true,
        });
    }
    let segments = target.segments()?;

    let encoded = encode_file(&FileNode::inline(content.to_vec(), content_type))?;
    let key = store_node(ctx, encoded).await?;
    let (new_root, created) = place_file(ctx, root, &segments, key).await?;

    debug!(path = %format_path(&segments), created, root = %new_root.short_hex(), "write");
    Ok(WriteResult {
        new_root,
        key: key.to_key(),
        size: content.len() as u64,
        content_type: content_type.to_string(),
        created,
    })
}

pub async fn mkdir(ctx: &FsContext, root: NodeHash, path: &str) -> FsResult<MkdirResult> {
    let segments = parse_segments(path)?;
    if let Some(existing) = lookup(ctx, root, &segments).await? {
        return match existing.node {
            Node::Directory(_) => Ok(MkdirResult {
                new_root: root,
                key: existing.hash.to_key(),
                created: false,
            }),
            _ => Err(FsError::ExistsAsFile {
                path: format_path(&segments),
            }),
        };
    }

    let dir = store_directory(ctx, &DirectoryNode::empty()).await?;
    let new_root = attach_new(ctx, root, &segments, dir).await?;
    debug!(path = %format_path(&segments), root = %new_root.short_hex(), "mkdir");
    Ok(MkdirResult {
        new_root,
        key: dir.to_key(),
        created: true,
    })
}

pub async fn rm(ctx: &FsContext, root: NodeHash, target: &Target) -> FsResult<RmResult> {
    let segments = target.segments()?;
    if segments.is_empty() {
        return Err(FsError::CannotRemoveRoot);
    }
    let resolved = resolve(ctx, root, &segments).await?;
    let Some((parent, ancestors)) = resolved.split_parent() else {
        return Err(FsError::CannotRemoveRoot);
    };
    let new_root = remove_child(ctx, ancestors, &parent.dir, parent.index).await?;

    debug!(path = %format_path(&segments), root = %new_root.short_hex(), "rm");
    Ok(RmResult {
        new_root,
        removed: resolved.hash.to_key(),
        name: resolved.name,
    })
}

/// Move the node at `from` to `to`.
///
/// A non-directory moved onto an existing directory lands inside it under
/// its own name. The destination is resolved after the source has been
/// detached, so index segments in `to` see the shifted entries.
pub async fn mv(ctx: &FsContext, root: NodeHash, from: &str, to: &str) -> FsResult<MvResult> {
    let from_segments = parse_segments(from)?;
    let to_segments = parse_segments(to)?;
    if from_segments.is_empty() {
        return Err(FsError::CannotMoveRoot);
    }
    let to_path = format_path(&to_segments);
    let named = from_segments.iter().all(PathSegment::is_name);
    if named {
        check_not_into_self(&format_path(&from_segments), &to_path)?;
    }

    let source = resolve(ctx, root, &from_segments).await?;
    // Index segments can alias a name, so compare on the resolved names.
    let from_path = source.name_path();
    if !named {
        check_not_into_self(&from_path, &to_path)?;
    }
    let Some((parent, ancestors)) = source.split_parent() else {
        return Err(FsError::CannotMoveRoot);
    };
    let detached = remove_child(ctx, ancestors, &parent.dir, parent.index).await?;

    let (new_root, landed) = match lookup(ctx, detached, &to_segments).await? {
        Some(dest) => match &dest.node {
            Node::Directory(dir) if !source.node.is_directory() => {
                let inner = join(&to_path, &source.name);
                if dir.find(&source.name).is_some() {
                    return Err(FsError::TargetExists { path: inner });
                }
                let new_root =
                    insert_child(ctx, &dest.parent_path, dir, &source.name, source.hash).await?;
                (new_root, inner)
            }
            _ => return Err(FsError::TargetExists { path: to_path }),
        },
        None => {
            let new_root = attach_new(ctx, detached, &to_segments, source.hash).await?;
            (new_root, to_path)
        }
    };

    debug!(from = %from_path, to = %landed, root = %new_root.short_hex(), "mv");
    Ok(MvResult {
        new_root,
        key: source.hash.to_key(),
        from: from_path,
        to: landed,
    })
}

fn check_not_into_self(from: &str, to: &str) -> FsResult<()> {
    if to == from || to.starts_with(&format!("{from}/")) {
        return Err(FsError::MoveIntoSelf {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// Reference the node at `from` again at `to`. Nothing is duplicated.
pub async fn cp(ctx: &FsContext, root: NodeHash, from: &str, to: &str) -> FsResult<CpResult> {
    let from_segments = parse_segments(from)?;
    let to_segments = parse_segments(to)?;
    let source = resolve(ctx, root, &from_segments).await?;

    if lookup(ctx, root, &to_segments).await?.is_some() {
        return Err(FsError::TargetExists {
            path: format_path(&to_segments),
        });
    }
    let new_root = attach_new(ctx, root, &to_segments, source.hash).await?;

    debug!(from = %format_path(&from_segments), to = %format_path(&to_segments), "cp");
    Ok(CpResult {
        new_root,
        key: source.hash.to_key(),
    })
}

/// Put a file node at `segments`: overwrite an existing file or create it.
/// Returns the new root and whether the entry was created.
pub(crate) async fn place_file(
    ctx: &FsContext,
    root: NodeHash,
    segments: &[PathSegment],
    file: NodeHash,
) -> FsResult<(NodeHash, bool)> {
    match lookup(ctx, root, segments).await? {
        Some(existing) => match existing.node {
            Node::Directory(_) => Err(FsError::NotAFile {
                path: format_path(segments),
            }),
            _ => Ok((rebuild(ctx, &existing.parent_path, file).await?, false)),
        },
        None => Ok((attach_new(ctx, root, segments, file).await?, true)),
    }
}

/// Put any node at `segments`, replacing whatever is there.
pub(crate) async fn put_at(
    ctx: &FsContext,
    root: NodeHash,
    segments: &[PathSegment],
    node: NodeHash,
) -> FsResult<NodeHash> {
    match lookup(ctx, root, segments).await? {
        Some(existing) => rebuild(ctx, &existing.parent_path, node).await,
        None => attach_new(ctx, root, segments, node).await,
    }
}

/// Insert `child` at a path known to be missing, creating parents.
async fn attach_new(
    ctx: &FsContext,
    root: NodeHash,
    segments: &[PathSegment],
    child: NodeHash,
) -> FsResult<NodeHash> {
    let parent = ensure_parent_dirs(ctx, root, segments).await?;
    match segments.last() {
        Some(PathSegment::Name(name)) => {
            if parent.dir.find(name).is_some() {
                return Err(FsError::TargetExists {
                    path: format_path(segments),
                });
            }
            insert_child(ctx, &parent.parent_path, &parent.dir, name, child).await
        }
        Some(PathSegment::Index(index)) => Err(FsError::IndexOutOfBounds {
            index: *index,
            max: parent.dir.len().checked_sub(1),
            path: format_path(segments),
        }),
        None => Err(FsError::TargetExists {
            path: String::new(),
        }),
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

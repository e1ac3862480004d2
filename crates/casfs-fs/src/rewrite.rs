//! Batched tree rewrite.
//!
//! A rewrite applies a list of deletes and then a list of entries against a
//! progressively updated root, producing one final root. Entries either
//! reference a node already in the tree, create an empty directory, or link
//! an arbitrary stored node by key.

use casfs_codec::DirectoryNode;
use casfs_types::{format_path, NodeHash, PathSegment};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::keys::resolve_node_key;
use crate::mutate::remove_child;
use crate::node_store::store_directory;
use crate::resolve::{parse_segments, resolve};
use crate::write::put_at;

/// What a rewrite entry places at its path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntrySource {
    /// The node currently at `path`.
    From { path: String },
    /// A fresh empty directory.
    Dir,
    /// A stored node, subject to link authorization.
    Link { key: String, proof: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteEntry {
    pub path: String,
    pub source: EntrySource,
}

impl RewriteEntry {
    pub fn from_path(path: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: EntrySource::From { path: from.into() },
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: EntrySource::Dir,
        }
    }

    pub fn link(path: impl Into<String>, key: impl Into<String>, proof: Option<String>) -> Self {
        Self {
            path: path.into(),
            source: EntrySource::Link {
                key: key.into(),
                proof,
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub entries: Vec<RewriteEntry>,
    pub deletes: Vec<String>,
}

impl RewriteRequest {
    pub fn len(&self) -> usize {
        self.entries.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.deletes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    pub new_root: NodeHash,
    pub entries_applied: usize,
    /// Deletes that removed something; missing paths are not counted.
    pub deleted: usize,
}

/// Parsed entry, ready to apply.
struct Planned<'a> {
    segments: Vec<PathSegment>,
    source: PlannedSource<'a>,
}

enum PlannedSource<'a> {
    From(Vec<PathSegment>),
    Dir,
    Link {
        key: &'a str,
        proof: Option<&'a str>,
    },
}

pub async fn rewrite(
    ctx: &FsContext,
    root: NodeHash,
    request: RewriteRequest,
) -> FsResult<RewriteResult> {
    if request.is_empty() {
        return Err(FsError::EmptyRewrite);
    }
    let max = ctx.config.max_rewrite_entries;
    if request.len() > max {
        return Err(FsError::TooManyEntries {
            count: request.len(),
            max,
        });
    }

    // Parse everything before touching the tree.
    let deletes = request
        .deletes
        .iter()
        .map(|path| parse_segments(path))
        .collect::<FsResult<Vec<_>>>()?;
    let entries = request
        .entries
        .iter()
        .map(plan_entry)
        .collect::<FsResult<Vec<_>>>()?;

    let mut root = root;
    let mut deleted = 0;
    for segments in &deletes {
        if segments.is_empty() {
            return Err(FsError::CannotRemoveRoot);
        }
        let resolved = match resolve(ctx, root, segments).await {
            Ok(resolved) => resolved,
            Err(e) if e.is_missing_path() => {
                debug!(path = %format_path(segments), "rewrite delete skipped, path missing");
                continue;
            }
            Err(e) => return Err(e),
        };
        if let Some((parent, ancestors)) = resolved.split_parent() {
            root = remove_child(ctx, ancestors, &parent.dir, parent.index).await?;
            deleted += 1;
        }
    }

    let mut entries_applied = 0;
    for entry in &entries {
        let node = match &entry.source {
            PlannedSource::From(from) => resolve(ctx, root, from).await?.hash,
            PlannedSource::Dir => store_directory(ctx, &DirectoryNode::empty()).await?,
            PlannedSource::Link { key, proof } => link_target(ctx, key, *proof).await?,
        };
        root = put_at(ctx, root, &entry.segments, node).await?;
        entries_applied += 1;
    }

    debug!(entries_applied, deleted, root = %root.short_hex(), "rewrite");
    Ok(RewriteResult {
        new_root: root,
        entries_applied,
        deleted,
    })
}

fn plan_entry(entry: &RewriteEntry) -> FsResult<Planned<'_>> {
    let segments = parse_segments(&entry.path)?;
    if segments.is_empty() {
        return Err(FsError::InvalidPath(format!(
            "rewrite entry path {:?} addresses the root",
            entry.path
        )));
    }
    let source = match &entry.source {
        EntrySource::From { path } => PlannedSource::From(parse_segments(path)?),
        EntrySource::Dir => PlannedSource::Dir,
        EntrySource::Link { key, proof } => PlannedSource::Link {
            key: key.as_str(),
            proof: proof.as_deref(),
        },
    };
    Ok(Planned { segments, source })
}

/// Resolve a link key and check the node exists and may be linked.
async fn link_target(ctx: &FsContext, key: &str, proof: Option<&str>) -> FsResult<NodeHash> {
    let hash = resolve_node_key(ctx, key).await?;
    if !ctx.store.has(&hash).await? {
        return Err(FsError::NodeNotFound { key: hash.to_key() });
    }
    if let Some(authorizer) = &ctx.link_authorizer {
        if !authorizer.authorize_link(&hash, proof).await? {
            return Err(FsError::LinkNotAuthorized { key: hash.to_key() });
        }
    }
    Ok(hash)
}

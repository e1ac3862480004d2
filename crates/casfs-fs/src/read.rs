//! Read-only verbs: `stat`, `read`, `ls`.

use casfs_codec::{FileBody, Node};
use casfs_types::{format_path, NodeHash};
use serde::Serialize;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};
use crate::node_store::load_child;
use crate::resolve::{parse_segments, resolve};

/// Default page size for [`ls`].
pub const DEFAULT_LS_LIMIT: usize = 100;
/// Largest page size [`ls`] honours.
pub const MAX_LS_LIMIT: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

/// Metadata for one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatResult {
    pub kind: EntryType,
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

impl StatResult {
    fn describe(name: String, hash: NodeHash, node: &Node) -> Self {
        let key = hash.to_key();
        match node {
            Node::Directory(dir) => Self {
                kind: EntryType::Dir,
                name,
                key,
                size: None,
                content_type: None,
                child_count: Some(dir.len()),
            },
            Node::File(file) => Self {
                kind: EntryType::File,
                name,
                key,
                size: Some(file.size),
                content_type: Some(file.content_type.clone()),
                child_count: None,
            },
            // Only reachable when a block is addressed directly.
            Node::Successor(block) => Self {
                kind: EntryType::File,
                name,
                key,
                size: Some(block.payload.len() as u64),
                content_type: None,
                child_count: None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    pub data: Vec<u8>,
    pub content_type: String,
    pub size: u64,
    pub key: String,
}

/// One page of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LsResult {
    pub children: Vec<StatResult>,
    /// Number of entries in the directory, across all pages.
    pub total: usize,
    /// Pass back as `cursor` to fetch the next page.
    pub next_cursor: Option<String>,
}

pub async fn stat(ctx: &FsContext, root: NodeHash, path: &str) -> FsResult<StatResult> {
    let resolved = resolve(ctx, root, &parse_segments(path)?).await?;
    Ok(StatResult::describe(
        resolved.name,
        resolved.hash,
        &resolved.node,
    ))
}

/// Read a single-block file. Multi-block files go through
/// [`read_large`](crate::large::read_large).
pub async fn read(ctx: &FsContext, root: NodeHash, path: &str) -> FsResult<ReadResult> {
    let segments = parse_segments(path)?;
    let resolved = resolve(ctx, root, &segments).await?;
    let file = match resolved.node {
        Node::File(file) => file,
        Node::Directory(_) | Node::Successor(_) => {
            return Err(FsError::NotAFile {
                path: format_path(&segments),
            })
        }
    };
    match file.body {
        FileBody::Inline(data) => Ok(ReadResult {
            data,
            content_type: file.content_type,
            size: file.size,
            key: resolved.hash.to_key(),
        }),
        FileBody::Successors(_) => Err(FsError::FileTooLarge {
            size: file.size,
            max: ctx.config.node_size_limit as u64,
            large_file_api: true,
        }),
    }
}

/// List a directory, one page at a time.
///
/// `cursor` is the index of the last entry of the previous page. Every
/// listed child is loaded to describe it.
pub async fn ls(
    ctx: &FsContext,
    root: NodeHash,
    path: &str,
    limit: Option<usize>,
    cursor: Option<&str>,
) -> FsResult<LsResult> {
    let segments = parse_segments(path)?;
    let resolved = resolve(ctx, root, &segments).await?;
    let dir = match resolved.node {
        Node::Directory(dir) => dir,
        _ => {
            return Err(FsError::NotADirectory {
                segment: resolved.name,
                resolved: format_path(&segments),
            })
        }
    };

    let limit = limit.unwrap_or(DEFAULT_LS_LIMIT).clamp(1, MAX_LS_LIMIT);
    let start = match cursor {
        None => 0,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| FsError::InvalidCursor(raw.to_string()))?
            .saturating_add(1),
    };

    let total = dir.len();
    let end = start.saturating_add(limit).min(total);
    let mut children = Vec::with_capacity(end.saturating_sub(start));
    for entry in dir.entries.iter().take(end).skip(start) {
        let node = load_child(ctx, &entry.hash).await?;
        children.push(StatResult::describe(entry.name.clone(), entry.hash, &node));
    }

    let next_cursor = (end < total).then(|| (end - 1).to_string());
    Ok(LsResult {
        children,
        total,
        next_cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FsConfig;
    use crate::error::ErrorCode;
    use crate::large::write_large_at;
    use crate::rewrite::{rewrite, RewriteEntry, RewriteRequest};
    use crate::testing::{context, context_with_config, fresh_root, put};
    use crate::write::{mkdir, write, Target};

    #[tokio::test]
    async fn mkdir_write_then_ls_parent() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = mkdir(&ctx, root, "src/utils").await.unwrap().new_root;
        let root = write(
            &ctx,
            root,
            &Target::from("src/utils/helper.ts"),
            b"export {}",
            "application/typescript",
        )
        .await
        .unwrap()
        .new_root;

        let listing = ls(&ctx, root, "src", None, None).await.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.next_cursor, None);
        let child = &listing.children[0];
        assert_eq!(child.name, "utils");
        assert_eq!(child.kind, EntryType::Dir);
        assert_eq!(child.child_count, Some(1));
    }

    #[tokio::test]
    async fn rewrite_dir_entry_then_stat() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let request = RewriteRequest {
            entries: vec![RewriteEntry::dir("x.txt")],
            deletes: Vec::new(),
        };
        let root = rewrite(&ctx, root, request).await.unwrap().new_root;

        let info = stat(&ctx, root, "x.txt").await.unwrap();
        assert_eq!(info.kind, EntryType::Dir);
        assert_eq!(info.child_count, Some(0));
    }

    #[tokio::test]
    async fn stat_file_and_root() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "notes/today.md", "# hi").await;

        let info = stat(&ctx, root, "notes/today.md").await.unwrap();
        assert_eq!(info.kind, EntryType::File);
        assert_eq!(info.name, "today.md");
        assert_eq!(info.size, Some(4));
        assert_eq!(info.content_type.as_deref(), Some("text/plain"));
        assert!(info.key.starts_with("node:"));

        let top = stat(&ctx, root, "").await.unwrap();
        assert_eq!(top.kind, EntryType::Dir);
        assert_eq!(top.name, "");
        assert_eq!(top.key, root.to_key());
    }

    #[tokio::test]
    async fn read_errors() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "d/f", "x").await;

        assert_eq!(read(&ctx, root, "d").await.unwrap_err().code(), ErrorCode::NotAFile);
        assert_eq!(read(&ctx, root, "d/g").await.unwrap_err().code(), ErrorCode::PathNotFound);
        assert_eq!(read(&ctx, root, "d/f").await.unwrap().data, b"x");
    }

    #[tokio::test]
    async fn multi_block_file_needs_large_api() {
        let config = FsConfig {
            node_size_limit: 64,
            ..FsConfig::default()
        };
        let (_, ctx) = context_with_config(config);
        let root = fresh_root(&ctx).await;
        let data = vec![9u8; 500];
        let root = write_large_at(&ctx, root, "big.bin", &data, "application/octet-stream")
            .await
            .unwrap()
            .new_root;

        let err = read(&ctx, root, "big.bin").await.unwrap_err();
        assert!(matches!(
            err,
            FsError::FileTooLarge {
                size: 500,
                large_file_api: true,
                ..
            }
        ));
        assert_eq!(err.status(), 413);

        let info = stat(&ctx, root, "big.bin").await.unwrap();
        assert_eq!(info.kind, EntryType::File);
        assert_eq!(info.size, Some(500));
    }

    #[tokio::test]
    async fn ls_pages_with_cursor() {
        let (_, ctx) = context();
        let mut root = fresh_root(&ctx).await;
        for name in ["a", "b", "c", "d", "e"] {
            root = put(&ctx, root, name, name).await;
        }

        let first = ls(&ctx, root, "", Some(2), None).await.unwrap();
        assert_eq!(first.total, 5);
        let names: Vec<_> = first.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(first.next_cursor.as_deref(), Some("1"));

        let second = ls(&ctx, root, "", Some(2), first.next_cursor.as_deref())
            .await
            .unwrap();
        let names: Vec<_> = second.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["c", "d"]);

        let last = ls(&ctx, root, "", Some(2), second.next_cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(last.children.len(), 1);
        assert_eq!(last.next_cursor, None);
    }

    #[tokio::test]
    async fn ls_limit_is_clamped() {
        let (_, ctx) = context();
        let mut root = fresh_root(&ctx).await;
        for name in ["a", "b"] {
            root = put(&ctx, root, name, name).await;
        }
        let page = ls(&ctx, root, "", Some(0), None).await.unwrap();
        assert_eq!(page.children.len(), 1);
        let page = ls(&ctx, root, "", Some(5000), None).await.unwrap();
        assert_eq!(page.children.len(), 2);
    }

    #[tokio::test]
    async fn ls_rejects_bad_cursor_and_files() {
        let (_, ctx) = context();
        let root = fresh_root(&ctx).await;
        let root = put(&ctx, root, "f", "x").await;

        let err = ls(&ctx, root, "", None, Some("abc")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCursor);
        let err = ls(&ctx, root, "f", None, None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotADirectory);

        let past_end = ls(&ctx, root, "", None, Some("40")).await.unwrap();
        assert!(past_end.children.is_empty());
        assert_eq!(past_end.total, 1);
    }
}

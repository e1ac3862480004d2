//! Shared fixtures for unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use casfs_codec::{FileBody, Node, NodeKind};
use casfs_store::InMemoryBlobStore;
use casfs_types::NodeHash;

use crate::config::FsConfig;
use crate::context::FsContext;
use crate::hooks::{HookError, NodeStoredHook, StoredNodeInfo};
use crate::node_store::{empty_root, get_decoded};
use crate::write::{write, Target};

/// Records every node-stored notification.
#[derive(Default)]
pub(crate) struct RecordingHook {
    stored: Mutex<Vec<(NodeHash, NodeKind, u64)>>,
}

impl RecordingHook {
    pub(crate) fn seen(&self) -> Vec<(NodeHash, NodeKind, u64)> {
        self.stored.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl NodeStoredHook for RecordingHook {
    async fn on_node_stored(&self, info: &StoredNodeInfo<'_>) -> Result<(), HookError> {
        self.stored
            .lock()
            .expect("lock poisoned")
            .push((info.hash, info.kind, info.logical_size));
        Ok(())
    }
}

pub(crate) fn context() -> (Arc<InMemoryBlobStore>, FsContext) {
    context_with_config(FsConfig::default())
}

pub(crate) fn context_with_config(config: FsConfig) -> (Arc<InMemoryBlobStore>, FsContext) {
    let store = Arc::new(InMemoryBlobStore::new());
    let ctx = FsContext::new(store.clone()).with_config(config);
    (store, ctx)
}

pub(crate) fn context_with_hook() -> (Arc<InMemoryBlobStore>, Arc<RecordingHook>, FsContext) {
    let (store, ctx) = context();
    let hook = Arc::new(RecordingHook::default());
    let ctx = ctx.with_node_stored_hook(hook.clone());
    (store, hook, ctx)
}

pub(crate) async fn fresh_root(ctx: &FsContext) -> NodeHash {
    empty_root(ctx).await.unwrap()
}

/// Write `content` at `path` and return the new root.
pub(crate) async fn put(ctx: &FsContext, root: NodeHash, path: &str, content: &str) -> NodeHash {
    write(ctx, root, &Target::from(path), content.as_bytes(), "text/plain")
        .await
        .unwrap()
        .new_root
}

/// Tree content keyed by path, independent of entry order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Snap {
    Dir,
    File(Vec<u8>),
    LargeFile(u64),
}

pub(crate) async fn snapshot(ctx: &FsContext, root: NodeHash) -> BTreeMap<String, Snap> {
    let mut out = BTreeMap::new();
    let mut pending = vec![(String::new(), root)];
    while let Some((path, hash)) = pending.pop() {
        match get_decoded(ctx, &hash).await.unwrap().expect("node present") {
            Node::Directory(dir) => {
                if !path.is_empty() {
                    out.insert(path.clone(), Snap::Dir);
                }
                for entry in dir.entries {
                    let child = if path.is_empty() {
                        entry.name
                    } else {
                        format!("{path}/{}", entry.name)
                    };
                    pending.push((child, entry.hash));
                }
            }
            Node::File(file) => {
                let snap = match file.body {
                    FileBody::Inline(data) => Snap::File(data),
                    FileBody::Successors(_) => Snap::LargeFile(file.size),
                };
                out.insert(path, snap);
            }
            Node::Successor(_) => panic!("successor block reachable by path {path}"),
        }
    }
    out
}

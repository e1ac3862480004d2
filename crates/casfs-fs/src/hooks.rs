//! Injected hooks.
//!
//! The engine itself holds no policy; callers plug it in through these
//! traits. Every hook is optional. Without a link authorizer every link is
//! allowed, and without a key resolver only native `node:<hex>` keys parse.

use async_trait::async_trait;
use casfs_codec::NodeKind;
use casfs_types::NodeHash;

use crate::error::FsResult;

/// Failure reported by a hook implementation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// What was just written to the blob store.
#[derive(Clone, Copy, Debug)]
pub struct StoredNodeInfo<'a> {
    pub hash: NodeHash,
    pub bytes: &'a [u8],
    pub kind: NodeKind,
    pub logical_size: u64,
}

/// Called after every successful node store (ownership / ref-count
/// bookkeeping). An error aborts the surrounding operation.
#[async_trait]
pub trait NodeStoredHook: Send + Sync {
    async fn on_node_stored(&self, info: &StoredNodeInfo<'_>) -> Result<(), HookError>;
}

/// Decides whether a rewrite may link an already-stored node into the tree.
#[async_trait]
pub trait LinkAuthorizer: Send + Sync {
    async fn authorize_link(&self, key: &NodeHash, proof: Option<&str>) -> Result<bool, HookError>;
}

/// Maps user-facing node keys to storage keys for key schemes the engine
/// does not understand natively.
#[async_trait]
pub trait NodeKeyResolver: Send + Sync {
    async fn resolve_node_key(&self, user_key: &str) -> FsResult<NodeHash>;
}

/// Link authorizer that refuses everything.
pub struct DenyAllLinks;

#[async_trait]
impl LinkAuthorizer for DenyAllLinks {
    async fn authorize_link(&self, _key: &NodeHash, _proof: Option<&str>) -> Result<bool, HookError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deny_all_refuses() {
        let key = NodeHash::from_hash([1; 32]);
        assert!(!DenyAllLinks.authorize_link(&key, None).await.unwrap());
        assert!(!DenyAllLinks.authorize_link(&key, Some("proof")).await.unwrap());
    }

    #[test]
    fn hook_error_displays_message() {
        assert_eq!(HookError::new("refcount store down").to_string(), "refcount store down");
    }
}

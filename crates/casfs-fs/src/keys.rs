use casfs_types::NodeHash;

use crate::context::FsContext;
use crate::error::{FsError, FsResult};

/// Turn a user-facing node key into a storage hash.
///
/// An installed [`NodeKeyResolver`](crate::hooks::NodeKeyResolver) decides
/// alone. Without one, `node:<hex>` and bare hex are accepted.
pub async fn resolve_node_key(ctx: &FsContext, user_key: &str) -> FsResult<NodeHash> {
    if let Some(resolver) = &ctx.key_resolver {
        return resolver.resolve_node_key(user_key).await;
    }
    NodeHash::from_key(user_key).map_err(|e| FsError::InvalidNodeKey {
        key: user_key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hooks::NodeKeyResolver;
    use crate::testing::context;
    use async_trait::async_trait;
    use std::sync::Arc;

    #[tokio::test]
    async fn native_key_forms() {
        let (_, ctx) = context();
        let hash = NodeHash::from_hash([0xab; 32]);
        assert_eq!(resolve_node_key(&ctx, &hash.to_key()).await.unwrap(), hash);
        assert_eq!(resolve_node_key(&ctx, &hash.to_hex()).await.unwrap(), hash);

        let err = resolve_node_key(&ctx, "node:zz").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidNodeKey);
        assert_eq!(err.status(), 400);
    }

    struct Aliases;

    #[async_trait]
    impl NodeKeyResolver for Aliases {
        async fn resolve_node_key(&self, user_key: &str) -> FsResult<NodeHash> {
            match user_key {
                "latest" => Ok(NodeHash::from_hash([7; 32])),
                other => Err(FsError::InvalidNodeKey {
                    key: other.to_string(),
                    reason: "unknown alias".into(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn resolver_hook_takes_over() {
        let (_, ctx) = context();
        let ctx = ctx.with_key_resolver(Arc::new(Aliases));
        assert_eq!(
            resolve_node_key(&ctx, "latest").await.unwrap(),
            NodeHash::from_hash([7; 32])
        );
        // Native syntax is no longer accepted once a resolver is installed.
        let native = NodeHash::from_hash([1; 32]).to_key();
        assert!(resolve_node_key(&ctx, &native).await.is_err());
    }
}

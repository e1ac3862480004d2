use std::sync::Arc;

use casfs_store::BlobStore;

use crate::config::FsConfig;
use crate::hooks::{LinkAuthorizer, NodeKeyResolver, NodeStoredHook};

/// Everything an operation needs besides its root and arguments.
///
/// Operations borrow the context; it carries no per-call state, so one
/// context can serve any number of concurrent operations.
#[derive(Clone)]
pub struct FsContext {
    pub store: Arc<dyn BlobStore>,
    pub config: FsConfig,
    pub on_node_stored: Option<Arc<dyn NodeStoredHook>>,
    pub link_authorizer: Option<Arc<dyn LinkAuthorizer>>,
    pub key_resolver: Option<Arc<dyn NodeKeyResolver>>,
}

impl FsContext {
    /// Context with default limits and no hooks.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            config: FsConfig::default(),
            on_node_stored: None,
            link_authorizer: None,
            key_resolver: None,
        }
    }

    pub fn with_config(mut self, config: FsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_node_stored_hook(mut self, hook: Arc<dyn NodeStoredHook>) -> Self {
        self.on_node_stored = Some(hook);
        self
    }

    pub fn with_link_authorizer(mut self, authorizer: Arc<dyn LinkAuthorizer>) -> Self {
        self.link_authorizer = Some(authorizer);
        self
    }

    pub fn with_key_resolver(mut self, resolver: Arc<dyn NodeKeyResolver>) -> Self {
        self.key_resolver = Some(resolver);
        self
    }
}

impl std::fmt::Debug for FsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsContext")
            .field("config", &self.config)
            .field("on_node_stored", &self.on_node_stored.is_some())
            .field("link_authorizer", &self.link_authorizer.is_some())
            .field("key_resolver", &self.key_resolver.is_some())
            .finish_non_exhaustive()
    }
}

//! In memory implementations of the hook store and of the server directory.

use crate::{
    common::{
        error::{throw, Error, ErrorResult},
        interfaces::{HookStore, ServerDirectory},
    },
    model::{Hook, HookId, Server, ServerId, ServerStatus},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

#[derive(Default)]
pub struct InMemoryHookStore {
    hooks: RwLock<HashMap<HookId, Hook>>,
}

impl InMemoryHookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook, replacing any hook with the same id
    pub async fn insert(&self, hook: Hook) {
        self.hooks.write().await.insert(hook.id, hook);
    }

    pub async fn remove(&self, hook_id: HookId) -> Option<Hook> {
        self.hooks.write().await.remove(&hook_id)
    }
}

#[async_trait]
impl HookStore for InMemoryHookStore {
    async fn get(&self, hook_id: HookId) -> ErrorResult<Option<Hook>> {
        Ok(self.hooks.read().await.get(&hook_id).cloned())
    }

    async fn update(&self, hook: &Hook) -> ErrorResult<()> {
        let mut hooks = self.hooks.write().await;
        match hooks.get_mut(&hook.id) {
            Some(current) => {
                trace!("store hook {} with checksum {}", hook.id, hook.checksum);
                *current = hook.clone();
                Ok(())
            }
            None => throw!(Error::Persistence(format!("hook {} is not stored", hook.id))),
        }
    }
}

#[derive(Default)]
pub struct InMemoryServerDirectory {
    servers: RwLock<HashMap<ServerId, Server>>,
}

impl InMemoryServerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, server: Server) {
        self.servers.write().await.insert(server.id, server);
    }

    /// Change the status of a known server, return false if unknown
    pub async fn set_status(&self, server_id: ServerId, status: ServerStatus) -> bool {
        match self.servers.write().await.get_mut(&server_id) {
            Some(server) => {
                server.status = status;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ServerDirectory for InMemoryServerDirectory {
    async fn get(&self, server_id: ServerId) -> Option<Server> {
        self.servers.read().await.get(&server_id).cloned()
    }
}

// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! Collaborators of the hook commands. The commands only see these traits,
//! the implementations are given at construction of the `HookManager`.

use crate::{
    audit::AuditEvent,
    common::error::{ErrorResult, RemoteError},
    model::{Hook, HookContent, HookId, Server, ServerId},
};
use async_trait::async_trait;

/// Durable records of the hooks and their per-server statuses.
#[async_trait]
pub trait HookStore: Send + Sync {
    async fn get(&self, hook_id: HookId) -> ErrorResult<Option<Hook>>;
    /// Overwrite the content, the checksum and the server statuses of a hook
    /// in one write.
    async fn update(&self, hook: &Hook) -> ErrorResult<()>;
}

#[async_trait]
pub trait ServerDirectory: Send + Sync {
    async fn get(&self, server_id: ServerId) -> Option<Server>;
}

/// Remote calls to the agents running on the servers.
///
/// Implementations bound the duration of each call and report a timeout as
/// a `RemoteError` instead of blocking.
#[async_trait]
pub trait HookGateway: Send + Sync {
    /// Read the copy of `hook` stored on `server_id`
    async fn fetch_hook_content(
        &self,
        hook: &Hook,
        server_id: ServerId,
    ) -> Result<HookContent, RemoteError>;

    /// Write `content` as `hook` on every server of `servers`. Fails if any
    /// of the servers failed.
    async fn apply_hook(
        &self,
        hook: &Hook,
        content: &HookContent,
        servers: &[ServerId],
    ) -> Result<(), RemoteError>;
}

pub trait AuditReporter: Send + Sync {
    fn report(&self, event: AuditEvent);
}

//! [HookGateway] over the agents http api.

use super::{
    client,
    io_msg::{HookContentInput, UpdateHookInput},
};
use crate::{
    common::{
        checksum,
        config::Settings,
        error::{errors, RemoteError},
        interfaces::{HookGateway, ServerDirectory},
    },
    model::{Hook, HookContent, Server, ServerId},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub struct HttpHookGateway {
    settings: Settings,
    directory: Arc<dyn ServerDirectory>,
}

impl HttpHookGateway {
    pub fn new(settings: Settings, directory: Arc<dyn ServerDirectory>) -> Self {
        Self {
            settings,
            directory,
        }
    }

    async fn resolve(&self, server_id: ServerId) -> Result<Server, RemoteError> {
        match self.directory.get(server_id).await {
            Some(server) => Ok(server),
            None => Err(RemoteError::new(
                errors::SERVER_NOT_FOUND,
                format!("server {server_id} is unknown"),
            )),
        }
    }

    async fn apply_on(
        &self,
        server_id: ServerId,
        input: UpdateHookInput,
    ) -> Result<(), RemoteError> {
        let server = self.resolve(server_id).await?;
        let result = client::post_update_hook(&server.host, &self.settings, input).await?;
        trace!("hook written on {} with checksum {}", server.name, result.checksum);
        Ok(())
    }
}

#[async_trait]
impl HookGateway for HttpHookGateway {
    async fn fetch_hook_content(
        &self,
        hook: &Hook,
        server_id: ServerId,
    ) -> Result<HookContent, RemoteError> {
        let server = self.resolve(server_id).await?;
        let input = HookContentInput { key: hook.key() };
        let result = client::post_hook_content(&server.host, &self.settings, input).await?;
        let received = checksum::of(&result.content);
        if received != result.checksum {
            return Err(RemoteError::new(
                errors::GLUSTER_HOOK_CHECKSUM_MISMATCH,
                format!(
                    "content of {} read on {} has digest {} instead of {}",
                    hook.key(),
                    server.name,
                    received,
                    result.checksum
                ),
            ));
        }
        debug!("fetched {} from {}", hook.key(), server.name);
        Ok(result.content)
    }

    async fn apply_hook(
        &self,
        hook: &Hook,
        content: &HookContent,
        servers: &[ServerId],
    ) -> Result<(), RemoteError> {
        let checksum = checksum::of(content);
        let mut failures = vec![];
        for server_id in servers {
            let input = UpdateHookInput {
                key: hook.key(),
                content: content.clone(),
                checksum: checksum.clone(),
            };
            if let Err(err) = self.apply_on(*server_id, input).await {
                warn!("update of {} failed on {}: {}", hook.key(), server_id, err);
                failures.push((*server_id, err));
            }
        }
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0).1),
            _ => Err(RemoteError::new(
                errors::GLUSTER_HOOK_UPDATE_FAILED,
                failures
                    .iter()
                    .map(|(server_id, err)| format!("{server_id}: {err}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }
}

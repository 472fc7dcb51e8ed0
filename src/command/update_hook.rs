// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! # UPDATE HOOK
//!
//! Propagate one content of a hook to every server of the hook and clear the
//! conflicts. The content is the one recorded in the store, or the copy of a
//! chosen server when a source server is given.
//!
//! ```mermaid
//! flowchart
//! Conflict --> |success| NoConflict
//! Conflict --> |remote or store failure| Conflict
//! NoConflict --> |rejected, NoConflictServers| NoConflict
//! ```

use super::{CommandContext, ReturnValue, UpdateHookParameters};
use crate::{
    audit::{AuditEvent, AuditLogType},
    common::error::{throw, Error, ErrorResult},
    model::Hook,
};
use tracing::{debug, error, trace};

pub struct UpdateHookCommand {
    params: UpdateHookParameters,
    pub(super) context: CommandContext,
    /// Audit type of the last execution
    audit_log_type: Option<AuditLogType>,
}

impl UpdateHookCommand {
    pub fn new(params: UpdateHookParameters, context: CommandContext) -> Self {
        Self {
            params,
            context,
            audit_log_type: None,
        }
    }

    pub fn parameters(&self) -> &UpdateHookParameters {
        &self.params
    }

    /// Audit type the command terminated with, none if it was not executed
    pub fn audit_log_type(&self) -> Option<AuditLogType> {
        self.audit_log_type
    }

    /// Validate then execute the command.
    ///
    /// # Result
    /// - `Ok` with `valid == false` if a validation rule failed, nothing was
    ///   executed.
    /// - `Ok` with `succeeded == true` once the servers and the store agree.
    /// - `Err(Remote)` if the fetch or the apply failed, the store is left
    ///   untouched.
    /// - `Err(Persistence)` if the servers were updated but the store write
    ///   failed.
    pub async fn run(&mut self) -> ErrorResult<ReturnValue> {
        let hook = match self.validate().await? {
            Ok(hook) => hook,
            Err(message) => return Ok(ReturnValue::rejected(message)),
        };
        self.execute(hook).await
    }

    /// Execute the command on a validated `hook` snapshot. Fetch, apply and
    /// store run one after the other, each only if the previous succeeded.
    pub async fn execute(&mut self, hook: Hook) -> ErrorResult<ReturnValue> {
        let content = match self.params.source_server_id {
            Some(server_id) => {
                trace!("fetch hook {} from server {}", hook.key(), server_id);
                let fetched = self.context.gateway.fetch_hook_content(&hook, server_id).await;
                match fetched {
                    Ok(content) => content,
                    Err(err) => return self.fail(&hook, Error::Remote(err)),
                }
            }
            None => hook.content.clone(),
        };

        let servers = hook.server_ids();
        debug!("apply hook {} on {} servers", hook.key(), servers.len());
        let applied = self
            .context
            .gateway
            .apply_hook(&hook, &content, &servers)
            .await;
        if let Err(err) = applied {
            return self.fail(&hook, Error::Remote(err));
        }

        let mut updated = hook.clone();
        updated.resolve(content);
        let stored = self.context.store.update(&updated).await;
        if let Err(err) = stored {
            error!(
                "hook {} applied on the servers but not stored, a rediscovery is needed: {}",
                hook.id, err
            );
            let message = match *err {
                Error::Persistence(message) => message,
                other => other.to_string(),
            };
            return self.fail(&hook, Error::Persistence(message));
        }

        self.report(&updated, AuditLogType::GlusterHookUpdated, None);
        Ok(ReturnValue::succeeded())
    }

    fn fail(&mut self, hook: &Hook, err: Error) -> ErrorResult<ReturnValue> {
        self.report(
            hook,
            AuditLogType::GlusterHookUpdateFailed,
            Some(err.to_string()),
        );
        throw!(err)
    }

    fn report(&mut self, hook: &Hook, log_type: AuditLogType, reason: Option<String>) {
        self.audit_log_type = Some(log_type);
        self.context
            .audit
            .report(AuditEvent::new(log_type, hook, reason));
    }
}

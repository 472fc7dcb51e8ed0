// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

use crate::{
    api::gateway::HttpHookGateway,
    audit::AuditLogType,
    command::{CommandContext, ReturnValue, UpdateHookCommand, UpdateHookParameters},
    common::{
        config::{self, Settings},
        error::ErrorResult,
        interfaces::{AuditReporter, HookGateway, HookStore, ServerDirectory},
        logging,
    },
    model::HookId,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

type HookLocks = Arc<StdMutex<HashMap<HookId, Arc<Mutex<()>>>>>;

/// Exclusive access to one hook. The lock is forgotten by the manager when
/// the last holder releases it and nobody waits on it.
struct HookGuard {
    hook_id: HookId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: HookLocks,
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.hook_id)
            .map_or(false, |lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.hook_id);
        }
    }
}

/// Entry point of the controller side. Holds the collaborators of the
/// commands and runs at most one command at a time per hook.
#[derive(Clone)]
pub struct HookManager {
    /// Settings of the controller
    pub settings: Settings,
    /// Collaborators handed to each command
    pub context: CommandContext,
    /// One lock per hook with a command running or waiting
    hook_locks: HookLocks,
}

impl HookManager {
    /// Creates a manager talking to the agents over http. Settings are read
    /// from the file given as first argument, defaults are used otherwise.
    pub fn new(
        store: Arc<dyn HookStore>,
        directory: Arc<dyn ServerDirectory>,
        audit: Arc<dyn AuditReporter>,
    ) -> Self {
        let settings = config::read_or_default(config::path_from_args());
        logging::init(&settings);
        let gateway = Arc::new(HttpHookGateway::new(settings.clone(), directory.clone()));
        Self::new_with_settings(settings, store, directory, gateway, audit)
    }

    pub fn new_with_settings(
        settings: Settings,
        store: Arc<dyn HookStore>,
        directory: Arc<dyn ServerDirectory>,
        gateway: Arc<dyn HookGateway>,
        audit: Arc<dyn AuditReporter>,
    ) -> Self {
        Self {
            settings,
            context: CommandContext {
                store,
                directory,
                gateway,
                audit,
            },
            hook_locks: Default::default(),
        }
    }

    async fn lock_hook(&self, hook_id: HookId) -> HookGuard {
        let lock = self
            .hook_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(hook_id)
            .or_default()
            .clone();
        HookGuard {
            hook_id,
            guard: Some(lock.lock_owned().await),
            locks: self.hook_locks.clone(),
        }
    }

    /// Number of hooks with a command running or waiting
    #[cfg(test)]
    pub(crate) fn locked_hooks(&self) -> usize {
        self.hook_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Propagate a hook content to its servers. See [UpdateHookCommand::run].
    ///
    /// Concurrent updates of the same hook wait for each other.
    pub async fn update_hook(&self, params: UpdateHookParameters) -> ErrorResult<ReturnValue> {
        self.update_hook_audited(params).await.0
    }

    /// Same as `update_hook`, also return the audit type the command
    /// terminated with.
    pub async fn update_hook_audited(
        &self,
        params: UpdateHookParameters,
    ) -> (ErrorResult<ReturnValue>, Option<AuditLogType>) {
        let _guard = match params.hook_id {
            Some(hook_id) => Some(self.lock_hook(hook_id).await),
            None => None,
        };
        trace!("run update hook {:?}", params);
        let mut command = UpdateHookCommand::new(params, self.context.clone());
        let res = command.run().await;
        (res, command.audit_log_type())
    }
}

// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! # VALIDATE UPDATE HOOK
//!
//! Rules checked before a hook update, in order, the first failing rule is
//! the one reported:
//! 1. a hook id is given
//! 2. the hook exists
//! 3. at least one server runs a custom copy of the hook
//! 4. the source server, if any, then every server of the hook are up
//!
//! The servers are checked before anything is fetched or applied.

use super::{UpdateHookCommand, UpdateHookParameters, ValidationMessage};
use crate::{
    common::error::ErrorResult,
    model::{Hook, Server, ServerId},
};
use std::collections::HashMap;
use tracing::trace;

/// Check the parameters of an update against the current `hook` record and
/// the `servers` records the directory returned for the source server and
/// the servers of the hook. A server absent from `servers` is not up.
pub fn check_update<'a>(
    params: &UpdateHookParameters,
    hook: Option<&'a Hook>,
    servers: &HashMap<ServerId, Server>,
) -> Result<&'a Hook, ValidationMessage> {
    if params.hook_id.is_none() {
        return Err(ValidationMessage::HookIdRequired);
    }
    let hook = match hook {
        Some(hook) => hook,
        None => return Err(ValidationMessage::HookDoesNotExist),
    };
    if !hook.is_in_conflict() {
        return Err(ValidationMessage::NoConflictServers);
    }
    let is_up = |server_id: ServerId| servers.get(&server_id).map_or(false, Server::is_up);
    if params.source_server_id.map_or(false, |source| !is_up(source)) {
        return Err(ValidationMessage::ServerStatusNotUp);
    }
    if !hook.server_ids().into_iter().all(is_up) {
        return Err(ValidationMessage::ServerStatusNotUp);
    }
    Ok(hook)
}

impl UpdateHookCommand {
    /// Load the snapshot needed by [check_update] and run it. The directory
    /// is only queried once the hook is known to be in conflict.
    ///
    /// Return the hook snapshot the execution should work on, or the reason
    /// of the rejection. Store failures are errors.
    pub async fn validate(&self) -> ErrorResult<Result<Hook, ValidationMessage>> {
        let params = self.parameters();
        let hook = match params.hook_id {
            Some(hook_id) => self.context.store.get(hook_id).await?,
            None => None,
        };
        let mut servers = HashMap::new();
        if let Some(hook) = hook.as_ref().filter(|hook| hook.is_in_conflict()) {
            let ids = params.source_server_id.into_iter().chain(hook.server_ids());
            for server_id in ids {
                if servers.contains_key(&server_id) {
                    continue;
                }
                if let Some(server) = self.context.directory.get(server_id).await {
                    servers.insert(server_id, server);
                }
            }
        }
        let res = check_update(params, hook.as_ref(), &servers).cloned();
        if let Err(message) = &res {
            trace!("update hook {:?} rejected: {}", params.hook_id, message);
        }
        Ok(res)
    }
}

// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! Commands run by the controller on the hooks of a cluster.
//!
//! A command is validated against a snapshot of the hook store before being
//! executed. A validation failure is not an error, it's reported in the
//! [ReturnValue] and nothing is executed nor audited.

use crate::{
    common::interfaces::{AuditReporter, HookGateway, HookStore, ServerDirectory},
    model::{HookId, ServerId},
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::Arc};

mod update_hook;
pub mod validate;

pub use update_hook::UpdateHookCommand;

#[cfg(test)]
mod test;

/// Collaborators given to every command
#[derive(Clone)]
pub struct CommandContext {
    pub store: Arc<dyn HookStore>,
    pub directory: Arc<dyn ServerDirectory>,
    pub gateway: Arc<dyn HookGateway>,
    pub audit: Arc<dyn AuditReporter>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateHookParameters {
    pub hook_id: Option<HookId>,
    /// Server holding the copy to propagate. Without it the content recorded
    /// in the store is propagated.
    pub source_server_id: Option<ServerId>,
}

impl UpdateHookParameters {
    pub fn new(hook_id: HookId) -> Self {
        Self {
            hook_id: Some(hook_id),
            source_server_id: None,
        }
    }

    pub fn from_server(hook_id: HookId, server_id: ServerId) -> Self {
        Self {
            hook_id: Some(hook_id),
            source_server_id: Some(server_id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ValidationMessage {
    HookIdRequired,
    HookDoesNotExist,
    NoConflictServers,
    ServerStatusNotUp,
}

impl Display for ValidationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValidationMessage::HookIdRequired => "ACTION_TYPE_FAILED_GLUSTER_HOOK_ID_IS_REQUIRED",
            ValidationMessage::HookDoesNotExist => "ACTION_TYPE_FAILED_GLUSTER_HOOK_DOES_NOT_EXIST",
            ValidationMessage::NoConflictServers => {
                "ACTION_TYPE_FAILED_GLUSTER_HOOK_NO_CONFLICT_SERVERS"
            }
            ValidationMessage::ServerStatusNotUp => "ACTION_TYPE_FAILED_SERVER_STATUS_NOT_UP",
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReturnValue {
    /// False if the command was rejected before execution
    pub valid: bool,
    pub succeeded: bool,
    pub validation_messages: Vec<ValidationMessage>,
}

impl ReturnValue {
    pub fn rejected(message: ValidationMessage) -> Self {
        Self {
            valid: false,
            succeeded: false,
            validation_messages: vec![message],
        }
    }

    pub fn succeeded() -> Self {
        Self {
            valid: true,
            succeeded: true,
            validation_messages: vec![],
        }
    }
}

use super::{HookStatus, ServerId};
use serde::{Deserialize, Serialize};

/// State of a hook copy on one server.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub enum ServerHookState {
    Enabled,
    Disabled,
    Missing,
    /// The copy differs from the canonical content of the hook
    Custom,
}

impl From<HookStatus> for ServerHookState {
    fn from(status: HookStatus) -> Self {
        match status {
            HookStatus::Enabled => ServerHookState::Enabled,
            HookStatus::Disabled => ServerHookState::Disabled,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct ServerHookStatus {
    pub server_id: ServerId,
    pub status: ServerHookState,
    /// Digest of the on-disk copy, none when the hook is missing
    pub checksum: Option<String>,
}

impl ServerHookStatus {
    pub fn missing(server_id: ServerId) -> Self {
        Self {
            server_id,
            status: ServerHookState::Missing,
            checksum: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.status == ServerHookState::Custom
    }

    pub fn is_missing(&self) -> bool {
        self.status == ServerHookState::Missing
    }
}

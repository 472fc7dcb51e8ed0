use super::{ClusterId, HookId, ServerHookState, ServerHookStatus, ServerId};
use crate::common::checksum;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, path::PathBuf};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
pub enum HookStage {
    Pre,
    Post,
}

impl HookStage {
    /// Directory name of the stage in a gluster hook tree
    pub fn dir_name(&self) -> &'static str {
        match self {
            HookStage::Pre => "pre",
            HookStage::Post => "post",
        }
    }
}

impl Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Configured state of a hook, applied to every server on synchronization.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub enum HookStatus {
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub enum AggregateStatus {
    Enabled,
    Disabled,
    Conflict,
    MissingEverywhere,
}

/// Kinds of divergence between the servers and the hook record.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct ConflictStatus {
    /// Some server runs a different content
    pub content: bool,
    /// Some server has the hook enabled while it's disabled, or the opposite
    pub status: bool,
    /// Some, but not all, servers miss the hook
    pub missing: bool,
}

impl ConflictStatus {
    pub fn is_empty(&self) -> bool {
        !(self.content || self.status || self.missing)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub enum HookContentType {
    Text,
    Binary,
}

/// Body of a hook script. Binary bodies are base64 encoded on the wire.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(try_from = "WireContent", into = "WireContent")]
pub enum HookContent {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Deserialize, Serialize)]
struct WireContent {
    content_type: HookContentType,
    body: String,
}

impl From<HookContent> for WireContent {
    fn from(content: HookContent) -> Self {
        match content {
            HookContent::Text(body) => WireContent {
                content_type: HookContentType::Text,
                body,
            },
            HookContent::Binary(bytes) => WireContent {
                content_type: HookContentType::Binary,
                body: STANDARD.encode(bytes),
            },
        }
    }
}

impl TryFrom<WireContent> for HookContent {
    type Error = base64::DecodeError;

    fn try_from(wire: WireContent) -> Result<Self, Self::Error> {
        match wire.content_type {
            HookContentType::Text => Ok(HookContent::Text(wire.body)),
            HookContentType::Binary => Ok(HookContent::Binary(STANDARD.decode(wire.body)?)),
        }
    }
}

impl HookContent {
    /// Text if the bytes are valid UTF-8, binary otherwise.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => HookContent::Text(text),
            Err(err) => HookContent::Binary(err.into_bytes()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HookContent::Text(text) => text.as_bytes(),
            HookContent::Binary(bytes) => bytes,
        }
    }

    pub fn content_type(&self) -> HookContentType {
        match self {
            HookContent::Text(_) => HookContentType::Text,
            HookContent::Binary(_) => HookContentType::Binary,
        }
    }
}

impl Default for HookContent {
    fn default() -> Self {
        HookContent::Text(String::new())
    }
}

/// Location of a hook file inside the hook tree of a server.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Deserialize, Serialize)]
pub struct HookKey {
    pub gluster_command: String,
    pub stage: HookStage,
    pub name: String,
}

impl HookKey {
    /// Path relative to the hook root: `<command>/<stage>/<name>`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.gluster_command)
            .join(self.stage.dir_name())
            .join(&self.name)
    }

    /// A key component must be a single plain path segment.
    pub fn is_valid(&self) -> bool {
        [&self.gluster_command, &self.name].iter().all(|part| {
            !part.is_empty() && *part != "." && *part != ".." && !part.contains(['/', '\\'])
        })
    }
}

impl Display for HookKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.stage, self.gluster_command, self.name)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Hook {
    pub id: HookId,
    pub cluster_id: ClusterId,
    pub gluster_command: String,
    pub stage: HookStage,
    pub name: String,
    pub status: HookStatus,
    pub content: HookContent,
    pub checksum: String,
    pub server_statuses: Vec<ServerHookStatus>,
}

impl Hook {
    /// New enabled hook, not yet seen on any server.
    pub fn new<C: Display, N: Display>(
        cluster_id: ClusterId,
        gluster_command: C,
        stage: HookStage,
        name: N,
        content: HookContent,
    ) -> Self {
        Self {
            id: HookId::new(),
            cluster_id,
            gluster_command: gluster_command.to_string(),
            stage,
            name: name.to_string(),
            status: HookStatus::Enabled,
            checksum: checksum::of(&content),
            content,
            server_statuses: vec![],
        }
    }

    pub fn key(&self) -> HookKey {
        HookKey {
            gluster_command: self.gluster_command.clone(),
            stage: self.stage,
            name: self.name.clone(),
        }
    }

    pub fn server_ids(&self) -> Vec<ServerId> {
        self.server_statuses.iter().map(|s| s.server_id).collect()
    }

    pub fn server_status(&self, server_id: ServerId) -> Option<&ServerHookStatus> {
        self.server_statuses.iter().find(|s| s.server_id == server_id)
    }

    /// True if at least one server runs a custom copy
    pub fn is_in_conflict(&self) -> bool {
        self.server_statuses.iter().any(ServerHookStatus::is_custom)
    }

    pub fn aggregate_status(&self) -> AggregateStatus {
        if self.server_statuses.iter().all(ServerHookStatus::is_missing) {
            return AggregateStatus::MissingEverywhere;
        }
        if self.is_in_conflict() {
            return AggregateStatus::Conflict;
        }
        match self.status {
            HookStatus::Enabled => AggregateStatus::Enabled,
            HookStatus::Disabled => AggregateStatus::Disabled,
        }
    }

    pub fn conflict_status(&self) -> ConflictStatus {
        let expected = ServerHookState::from(self.status);
        let missing = self
            .server_statuses
            .iter()
            .filter(|s| s.is_missing())
            .count();
        ConflictStatus {
            content: self.is_in_conflict(),
            status: self.server_statuses.iter().any(|s| {
                matches!(s.status, ServerHookState::Enabled | ServerHookState::Disabled)
                    && s.status != expected
            }),
            missing: missing > 0 && missing < self.server_statuses.len(),
        }
    }

    /// Record what a server reports about its copy: `None` if the file is
    /// absent, its enabled state and digest otherwise. A digest different
    /// from the canonical one marks the server `Custom`.
    pub fn observe(&mut self, server_id: ServerId, observed: Option<(HookStatus, String)>) {
        let entry = match observed {
            None => ServerHookStatus::missing(server_id),
            Some((status, checksum)) => ServerHookStatus {
                server_id,
                status: if checksum == self.checksum {
                    status.into()
                } else {
                    ServerHookState::Custom
                },
                checksum: Some(checksum),
            },
        };
        match self
            .server_statuses
            .iter_mut()
            .find(|s| s.server_id == server_id)
        {
            Some(current) => *current = entry,
            None => self.server_statuses.push(entry),
        }
    }

    /// Make `content` canonical and consider every server synchronized
    /// with it, in the configured state.
    pub fn resolve(&mut self, content: HookContent) {
        let checksum = checksum::of(&content);
        let state = ServerHookState::from(self.status);
        for server in self.server_statuses.iter_mut() {
            server.status = state;
            server.checksum = Some(checksum.clone());
        }
        self.content = content;
        self.checksum = checksum;
    }
}

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::{HookContent, HookKey};

#[derive(Debug, Deserialize, Serialize)]
pub enum HttpResult {
    HookContent(HookContentResult),
    UpdateHook(UpdateHookResult),
    Error(HttpErrorResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpErrorResult {
    /// Remote error code, see `common::error::errors`
    pub err_id: String,
    pub message: String,
}

impl Display for HttpErrorResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error {}: {}", self.err_id, self.message)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HookContentInput {
    pub key: HookKey,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HookContentResult {
    pub content: HookContent,
    pub checksum: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateHookInput {
    pub key: HookKey,
    pub content: HookContent,
    /// Digest the agent must find after decoding `content`
    pub checksum: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateHookResult {
    /// Digest of the file written on disk
    pub checksum: String,
}

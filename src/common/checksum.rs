//! Content digests used to compare hook copies without moving them around.

use crate::model::HookContent;

/// MD5 hex digest of a hook body, the format agents report for on-disk files.
pub fn of(content: &HookContent) -> String {
    of_bytes(content.as_bytes())
}

pub fn of_bytes(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

use crate::{
    common::interfaces::AuditReporter,
    model::{ClusterId, Hook, HookId},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{error, info};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub enum AuditLogType {
    GlusterHookUpdated,
    GlusterHookUpdateFailed,
}

impl AuditLogType {
    pub fn is_failure(&self) -> bool {
        matches!(self, AuditLogType::GlusterHookUpdateFailed)
    }
}

impl Display for AuditLogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditLogType::GlusterHookUpdated => f.write_str("GLUSTER_HOOK_UPDATED"),
            AuditLogType::GlusterHookUpdateFailed => f.write_str("GLUSTER_HOOK_UPDATE_FAILED"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct AuditEvent {
    pub log_type: AuditLogType,
    pub hook_id: HookId,
    pub hook_name: String,
    pub cluster_id: ClusterId,
    /// Why the command failed, none on success
    pub reason: Option<String>,
    pub timestamp: String,
}

impl AuditEvent {
    pub fn new(log_type: AuditLogType, hook: &Hook, reason: Option<String>) -> Self {
        Self {
            log_type,
            hook_id: hook.id,
            hook_name: hook.name.clone(),
            cluster_id: hook.cluster_id,
            reason,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Reporter writing the audit events in the logs.
#[derive(Clone, Copy, Default, Debug)]
pub struct TracingAuditReporter;

impl AuditReporter for TracingAuditReporter {
    fn report(&self, event: AuditEvent) {
        match &event.reason {
            Some(reason) => error!(
                hook_id = %event.hook_id,
                cluster_id = %event.cluster_id,
                "{}: hook {}, {}",
                event.log_type,
                event.hook_name,
                reason
            ),
            None => info!(
                hook_id = %event.hook_id,
                cluster_id = %event.cluster_id,
                "{}: hook {}",
                event.log_type,
                event.hook_name
            ),
        }
    }
}

use super::{ClusterId, ServerId};
use crate::api::Url;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub enum ServerStatus {
    Up,
    Down,
    Maintenance,
    NonResponsive,
    NonOperational,
    Connecting,
}

/// Server as known by the directory.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub cluster_id: ClusterId,
    /// Address of the hook agent running on the server
    pub host: Url,
    pub status: ServerStatus,
}

impl Server {
    pub fn is_up(&self) -> bool {
        self.status == ServerStatus::Up
    }
}

// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! Server side of the hook gateway. An agent runs on every server of the
//! cluster, serves the hook files of its hook tree and overwrites them on
//! request of the controller.
//!
//! ```ignore
//! fn main() {
//!     let rt = tokio::runtime::Runtime::new().expect("Runtime expected to start but failed");
//!     if let Err(err) = HookAgent::new().start(rt) {
//!         eprintln!("Agent crash with error: {}", err);
//!     }
//! }
//! ```

use crate::{
    api::io_msg::{HookContentResult, UpdateHookInput, UpdateHookResult},
    common::{
        checksum,
        config::{self, Settings},
        error::{errors, ErrorResult, RemoteError},
        logging,
    },
    model::{HookContent, HookKey},
};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{runtime::Runtime, task::JoinHandle};
use tracing::{debug, trace, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct HookAgent {
    pub settings: Settings,
    /// Root of the hook tree, `<root>/<command>/<stage>/<name>`
    root: PathBuf,
}

impl HookAgent {
    /// Creates an agent from the settings file given as first argument
    pub fn new() -> Self {
        let settings = config::read_or_default(config::path_from_args());
        logging::init(&settings);
        Self::new_with_settings(settings)
    }

    pub fn new_with_settings(settings: Settings) -> Self {
        Self {
            root: settings.get_hooks_dir(),
            settings,
        }
    }

    fn path_of(&self, key: &HookKey) -> Result<PathBuf, RemoteError> {
        if !key.is_valid() {
            warn!("refuse hook key {:?}", key);
            return Err(RemoteError::new(
                errors::GLUSTER_HOOK_INVALID_KEY,
                format!("invalid hook key {key}"),
            ));
        }
        Ok(self.root.join(key.relative_path()))
    }

    /// Read a hook file and compute its digest.
    pub async fn read_hook(&self, key: &HookKey) -> Result<HookContentResult, RemoteError> {
        let path = self.path_of(key)?;
        trace!("read hook file {}", path.display());
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(RemoteError::new(
                    errors::GLUSTER_HOOK_NOT_FOUND,
                    format!("hook {key} not found"),
                ))
            }
            Err(err) => {
                return Err(RemoteError::new(
                    errors::GLUSTER_HOOK_READ_FAILED,
                    format!("cannot read hook {key}: {err}"),
                ))
            }
        };
        let checksum = checksum::of_bytes(&bytes);
        Ok(HookContentResult {
            content: HookContent::from_bytes(bytes),
            checksum,
        })
    }

    /// Replace a hook file. The content is first checked against the
    /// expected digest, then written next to the target and renamed over it.
    pub async fn write_hook(
        &self,
        input: UpdateHookInput,
    ) -> Result<UpdateHookResult, RemoteError> {
        let path = self.path_of(&input.key)?;
        let checksum = checksum::of(&input.content);
        if checksum != input.checksum {
            return Err(RemoteError::new(
                errors::GLUSTER_HOOK_CHECKSUM_MISMATCH,
                format!(
                    "hook {} received with digest {} instead of {}",
                    input.key, checksum, input.checksum
                ),
            ));
        }
        let update_failed = |err: std::io::Error| {
            RemoteError::new(
                errors::GLUSTER_HOOK_UPDATE_FAILED,
                format!("cannot write hook {}: {}", input.key, err),
            )
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(update_failed)?;
        }
        let tmp = path.with_file_name(format!(".{}.{}.tmp", input.key.name, Uuid::new_v4()));
        if let Err(err) = replace_file(&tmp, &path, input.content.as_bytes()).await {
            if let Err(rm_err) = tokio::fs::remove_file(&tmp).await {
                trace!("no temporary file {} to remove: {}", tmp.display(), rm_err);
            }
            return Err(update_failed(err));
        }
        debug!("hook {} written with digest {}", input.key, checksum);
        Ok(UpdateHookResult { checksum })
    }

    /// Serve the agent api inside a given tokio `runtime`
    pub fn start(&self, runtime: Runtime) -> ErrorResult<()> {
        runtime.block_on(crate::api::server::new(self.clone()))
    }

    /// Spawn the agent api on the current runtime
    pub fn spawn(self) -> JoinHandle<ErrorResult<()>> {
        tokio::spawn(crate::api::server::new(self))
    }
}

/// Write `bytes` as an executable `tmp` file then rename it over `path`
async fn replace_file(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(tmp, bytes).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(tmp, std::fs::Permissions::from_mode(0o755)).await?;
    }
    tokio::fs::rename(tmp, path).await
}

impl Default for HookAgent {
    fn default() -> Self {
        Self::new_with_settings(Settings::default())
    }
}

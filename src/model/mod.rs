// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! Records the controller keeps about hooks and the servers they live on.
//!
//! A [Hook] owns the vector of [ServerHookStatus], one per server of its
//! cluster. The aggregate status of a hook is always derived from that vector
//! and never stored.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

mod hook;
mod server;
mod server_hook;

pub use hook::{
    AggregateStatus, ConflictStatus, Hook, HookContent, HookContentType, HookKey, HookStage,
    HookStatus,
};
pub use server::{Server, ServerStatus};
pub use server_hook::{ServerHookState, ServerHookStatus};

macro_rules! id_type {
    ($name: ident) => {
        #[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(HookId);
id_type!(ServerId);
id_type!(ClusterId);

// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

//! Keep the hook scripts of a storage cluster identical on every server.
//!
//! ```ignore
//! /// Resolve the conflicts of a hook with the copy of one server
//! async fn resolve(manager: &HookManager, hook_id: HookId, server_id: ServerId) {
//!     match manager
//!         .update_hook(UpdateHookParameters::from_server(hook_id, server_id))
//!         .await
//!     {
//!         Ok(res) if res.succeeded => println!("Hook synchronized"),
//!         Ok(res) => println!("Update rejected: {:?}", res.validation_messages),
//!         Err(err) => eprintln!("Update failed with error: {}", err),
//!     }
//! }
//! ```

mod agent;
mod api;
mod audit;
mod command;
mod common;
mod manager;
mod model;
mod store;

pub use agent::HookAgent;
pub use api::{
    gateway::HttpHookGateway,
    io_msg::{HookContentInput, HookContentResult, UpdateHookInput, UpdateHookResult},
    Url,
};
pub use audit::{AuditEvent, AuditLogType, TracingAuditReporter};
pub use command::{
    validate::check_update, CommandContext, ReturnValue, UpdateHookCommand, UpdateHookParameters,
    ValidationMessage,
};
pub use common::config::Settings;
pub use common::error::{errors, Error, ErrorResult, RemoteError};
pub use common::interfaces::{AuditReporter, HookGateway, HookStore, ServerDirectory};
pub use manager::HookManager;
pub use model::*;
pub use store::{InMemoryHookStore, InMemoryServerDirectory};

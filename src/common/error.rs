// License:
// This source code is licensed under the GPLv3 license, you can found the
// LICENSE file in the root directory of this source tree.

use crate::api::io_msg::HttpErrorResult;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type ErrorResult<T> = std::result::Result<T, Box<Error>>;
pub type WarnResult<T> = std::result::Result<T, Box<Warning>>;

macro_rules! throw {
    ($err: expr) => {
        return Err(Box::new($err))
    };
}
pub(crate) use throw;

/// Error that can append in the execution.
///
/// The Errors should be managed by the root caller. A `Remote` or a
/// `Persistence` error ends the current command, the others end the process.
#[derive(Debug)]
pub enum Error {
    CannotReadSettings(ConfigError),
    InvalidSettings(&'static str),
    CannotStartRpcServer(String),
    /// A server agent refused or failed a fetch or an apply
    Remote(RemoteError),
    /// The hook store could not be read or written
    Persistence(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CannotReadSettings(err) => write!(f, "cannot read settings: {err}"),
            Error::InvalidSettings(str) => write!(f, "invalid settings: {str}"),
            Error::CannotStartRpcServer(str) => write!(f, "cannot start rpc server: {str}"),
            Error::Remote(err) => write!(f, "remote error: {err}"),
            Error::Persistence(str) => write!(f, "persistence error: {str}"),
        }
    }
}

#[derive(Debug)]
pub enum ServerError {
    CannotDeserializeBody(String),
}

/// Warning that can append in the execution.
///
/// The Warnings are raised by the http client and should be managed by the
/// direct parent function. The gateway translates them into a `RemoteError`.
#[derive(Debug)]
pub enum Warning {
    CommandFail(String),
    Timeout(&'static str),
    BadResult(HttpErrorResult), // When a request return an HttpErrorResult
    WrongResult(&'static str),  // When a request return an unexpected result
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::CommandFail(str) => f.write_str(&format!("warning: command fail, {str}")),
            Warning::Timeout(str) => f.write_str(&format!("warning: timeout, {str}")),
            Warning::BadResult(err) => f.write_str(&format!(
                "warning: bad result:\n{:indent$}",
                err,
                indent = 2
            )),
            Warning::WrongResult(str) => f.write_str(&format!("warning: wrong result, {str}")),
        }
    }
}

impl From<hyper::http::Error> for Box<Warning> {
    fn from(err: hyper::http::Error) -> Self {
        Box::new(Warning::CommandFail(format!(
            "unable to build request:\n{:indent$}",
            err,
            indent = 2
        )))
    }
}

/// Error reported by a server agent, or by the gateway on its behalf.
///
/// The `code` is opaque to the command and is handed back to the caller
/// verbatim. Known codes are listed in [errors].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteError {
    pub code: String,
    pub message: String,
}

impl RemoteError {
    pub fn new<C: Display, M: Display>(code: C, message: M) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code, self.message)
    }
}

impl From<Box<Warning>> for RemoteError {
    fn from(warn: Box<Warning>) -> Self {
        match *warn {
            Warning::BadResult(err) => RemoteError::new(err.err_id, err.message),
            other => RemoteError::new(errors::AGENT_NETWORK_ERROR, other),
        }
    }
}

impl From<RemoteError> for HttpErrorResult {
    fn from(err: RemoteError) -> Self {
        HttpErrorResult {
            err_id: err.code,
            message: err.message,
        }
    }
}

pub mod errors {
    use super::*;
    use crate::api::io_msg::HttpResult;

    /***********************************************/
    /*     Const defined errors and warnings       */

    pub const WARN_INFO_TIMEOUT: Warning = Warning::Timeout("Timeout on hook agent request");

    pub const GLUSTER_HOOK_NOT_FOUND: &str = "GlusterHookNotFound";
    pub const GLUSTER_HOOK_READ_FAILED: &str = "GlusterHookReadFailed";
    pub const GLUSTER_HOOK_UPDATE_FAILED: &str = "GlusterHookUpdateFailed";
    pub const GLUSTER_HOOK_CHECKSUM_MISMATCH: &str = "GlusterHookChecksumMismatch";
    pub const GLUSTER_HOOK_INVALID_KEY: &str = "GlusterHookInvalidKey";
    pub const SERVER_NOT_FOUND: &str = "ServerNotFound";
    pub const AGENT_NETWORK_ERROR: &str = "AgentNetworkError";
    pub const AGENT_BAD_REQUEST: &str = "AgentBadRequest";

    /***********************************************/
    /* ERRORS USED BY THE AGENT API               **/
    /***********************************************/

    lazy_static::lazy_static! {
        pub static ref ERR_SERIALIZATION: String = {
            serde_json::to_string(&HttpResult::Error(HttpErrorResult {
                err_id: AGENT_BAD_REQUEST.to_string(),
                message: "agent failed to serialize its response".to_string(),
            }))
            .expect("static error body")
        };
    }

    #[cfg(test)]
    #[test]
    fn deser_server_err() {
        let res: HttpResult = serde_json::from_str(&ERR_SERIALIZATION).unwrap();
        assert!(matches!(res, HttpResult::Error(err) if err.err_id == AGENT_BAD_REQUEST));
    }
}

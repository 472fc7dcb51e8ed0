use crate::common::error::{throw, Error};
use config::Config;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::time::Duration;

use super::error::ErrorResult;

/***********************************************/
/*  DEFAULT CONFIGURATION                      */

fn default_addr() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> String {
    "3000".to_string()
}
const fn default_response_timeout() -> usize {
    5000
}
fn default_hooks_dir() -> String {
    "/var/lib/glusterd/hooks/1".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Represent the user settings in the settings.toml
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Address the hook agent listens on
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: String,
    /// Timeout in milliseconds of a single request to a hook agent
    #[serde(default = "default_response_timeout")]
    pub response_timeout: usize,
    /// Root of the hook tree served by the agent
    #[serde(default = "default_hooks_dir")]
    pub hooks_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Settings {
    pub fn get_response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout as u64)
    }

    pub fn get_hooks_dir(&self) -> PathBuf {
        PathBuf::from(&self.hooks_dir)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            response_timeout: default_response_timeout(),
            hooks_dir: default_hooks_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Read the config file `settings.toml` and parse the configuration.
/// Variables prefixed by `HOOK_SYNC_` override the file.
pub fn read(opt_path: Option<String>) -> ErrorResult<Settings> {
    let path = opt_path.unwrap_or_else(|| "settings.toml".to_string());
    let config = match Config::builder()
        .add_source(config::File::with_name(&path))
        .add_source(config::Environment::with_prefix("HOOK_SYNC"))
        .build()
    {
        Ok(config) => config,
        Err(error) => throw!(Error::CannotReadSettings(error)),
    };
    let settings = match config.try_deserialize::<Settings>() {
        Ok(settings) => settings,
        Err(error) => throw!(Error::CannotReadSettings(error)),
    };
    if settings.response_timeout == 0 {
        throw!(Error::InvalidSettings("response_timeout must be positive"))
    }
    Ok(settings)
}

/// Settings path given as first argument of the process, if any.
pub fn path_from_args() -> Option<String> {
    std::env::args().nth(1)
}

/// Same as [read] but falls back on the default settings with a warning.
pub fn read_or_default(opt_path: Option<String>) -> Settings {
    match read(opt_path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Cannot read configuration file, getting default settings\n{err}");
            Settings::default()
        }
    }
}

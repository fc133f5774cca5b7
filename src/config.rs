//! Runner and logging configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;

/// Options for [`crate::runner::Runner`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Invoke the configured [`crate::runner::Renderer`] after every step.
    pub render: bool,
    /// Dump every transition's fluents at `debug` level.
    pub debug: bool,
}

/// Options for [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `"info,rddlgym=debug"`.
    pub level: String,
    /// Write to this file instead of stdout.
    pub file: Option<PathBuf>,
    /// Append to `file` rather than truncating it.
    pub append: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            append: false,
        }
    }
}

impl RunnerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LogConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

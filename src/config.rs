//! Lexicon settings stored as TOML.
//!
//! ```toml
//! category_marker = "カテゴリ"
//! reattach_policy = "skip-conflicting"
//! history_limit = 100
//! pretty_json = true
//! ```
//!
//! Every key is optional; a missing key takes its default.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{DEFAULT_CATEGORY_MARKER, EngineConfig, ReattachPolicy};
use crate::history::DEFAULT_HISTORY_LIMIT;

/// Errors from loading or saving the config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read lexicon config: {path}")]
    #[diagnostic(
        code(lexicon::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon config: {path}")]
    #[diagnostic(
        code(lexicon::config::parse),
        help("Check the TOML syntax. Valid reattach policies are \"skip-conflicting\" and \"abort\".")
    )]
    Parse { path: String, message: String },

    #[error("failed to write lexicon config: {path}")]
    #[diagnostic(
        code(lexicon::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for the engine, history, and file output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Category value marking a root entry.
    #[serde(default = "default_category_marker")]
    pub category_marker: String,
    /// What a reattaching delete does on a cycle conflict.
    #[serde(default)]
    pub reattach_policy: ReattachPolicy,
    /// Undo steps to keep.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Indent exported JSON.
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

fn default_category_marker() -> String {
    DEFAULT_CATEGORY_MARKER.into()
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_pretty_json() -> bool {
    true
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            category_marker: default_category_marker(),
            reattach_policy: ReattachPolicy::default(),
            history_limit: default_history_limit(),
            pretty_json: default_pretty_json(),
        }
    }
}

impl LexiconConfig {
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            category_marker: self.category_marker.clone(),
            reattach_policy: self.reattach_policy,
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Load from `path` if the file exists, else use the defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

//! Semantic checks run against a loaded settings mapping.
//!
//! Each check looks at one key and returns at most one problem. Checks are
//! independent of each other; inside a check the first failing condition wins.

use std::{fmt, path::Path};

use common::env::{probe_dir, DirStatus};

use crate::value::{Settings, Value};

/// A validation problem with a single setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration Error (key: {}): {}", self.key, self.message)
    }
}

/// A single check: `None` when the setting is fine.
pub type Check = fn(&Settings) -> Option<ConfigError>;

/// Every check `validate` runs, in reporting order.
pub const CHECKS: &[Check] = &[check_temp_directory];

/// Key holding the scratch directory used by the decoders.
pub const TEMP_DIR_KEY: &str = "PATH";

/// Run all [`CHECKS`]; an empty result means the settings are valid.
pub fn validate(settings: &Settings) -> Vec<ConfigError> {
    CHECKS.iter().filter_map(|check| check(settings)).collect()
}

/// `PATH` must name an existing, writable directory.
pub fn check_temp_directory(settings: &Settings) -> Option<ConfigError> {
    let key = TEMP_DIR_KEY;
    let path = match settings.get(key) {
        None | Some(Value::Null) => return Some(ConfigError::new(key, "temporary directory is not set")),
        Some(Value::String(s)) if s.is_empty() => {
            return Some(ConfigError::new(key, "temporary directory is not set"))
        }
        Some(Value::String(s)) => Path::new(s),
        Some(_) => return Some(ConfigError::new(key, "temporary directory path must be a string")),
    };
    temp_dir_problem(probe_dir(path)).map(|message| ConfigError::new(key, message))
}

fn temp_dir_problem(status: DirStatus) -> Option<&'static str> {
    match status {
        DirStatus::Missing => Some("temporary directory doesn't exist"),
        DirStatus::NotADirectory => Some("temporary directory path is not a directory"),
        DirStatus::ReadOnly => Some("temporary directory is not writable"),
        DirStatus::Writable => None,
    }
}

//! Locating and parsing configuration sources.
//!
//! Candidates are tried in order; the first one that exists wins. A missing
//! file moves on to the next candidate, but a file that exists and cannot be
//! read or parsed stops resolution with an error.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{error::LoadError, value::Settings, Value};

/// Default search order, relative to the working directory.
pub const DEFAULT_CANDIDATES: [&str; 2] = ["./settings.json", "./config.toml"];

/// Environment variable that replaces the candidate list with a single file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Parsers we know how to run, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Toml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else {
            None
        }
    }

    fn parse(self, path: &Path, content: &str) -> Result<Settings, LoadError> {
        match self {
            Self::Json => {
                let value: serde_json::Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
                match Value::from(value) {
                    Value::Table(settings) => Ok(settings),
                    _ => Err(LoadError::NotAMapping { path: path.to_path_buf() }),
                }
            }
            Self::Toml => {
                let table: toml::Table = toml::from_str(content).map_err(|source| LoadError::Toml {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(table.into_iter().collect())
            }
        }
    }
}

/// Candidate list for a given `CONFIG_PATH` value (`None` or empty means defaults).
pub fn candidates_from(config_path: Option<&str>) -> Vec<PathBuf> {
    match config_path.map(str::trim) {
        Some(p) if !p.is_empty() => vec![PathBuf::from(p)],
        _ => DEFAULT_CANDIDATES.into_iter().map(PathBuf::from).collect(),
    }
}

/// Candidate list honouring `CONFIG_PATH` from the process environment.
pub fn candidates_from_env() -> Vec<PathBuf> {
    candidates_from(std::env::var(CONFIG_PATH_ENV).ok().as_deref())
}

/// Read and parse one file.
///
/// `Ok(None)` means the file does not exist; every other failure is an error.
pub fn load_file(path: &Path, format: SourceFormat) -> Result<Option<Settings>, LoadError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    format.parse(path, &content).map(Some)
}

/// Walk `candidates` and return the first one that loads, with its path.
pub fn resolve(candidates: &[PathBuf]) -> Result<(PathBuf, Settings), LoadError> {
    for path in candidates {
        let Some(format) = SourceFormat::from_path(path) else {
            warn!(path = %path.display(), "unsupported config file type, skipping");
            continue;
        };
        match load_file(path, format)? {
            Some(settings) => {
                info!(path = %path.display(), keys = settings.len(), "configuration loaded");
                return Ok((path.clone(), settings));
            }
            None => debug!(path = %path.display(), "config candidate not found"),
        }
    }
    Err(LoadError::ConfigNotFound {
        tried: candidates.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("settings.json")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("conf/Config.TOML")), Some(SourceFormat::Toml));
        assert_eq!(SourceFormat::from_path(Path::new("config.py")), None);
        assert_eq!(SourceFormat::from_path(Path::new("settings")), None);
    }

    #[test]
    fn default_candidates_put_json_first() {
        let c = candidates_from(None);
        assert_eq!(c, vec![PathBuf::from("./settings.json"), PathBuf::from("./config.toml")]);
        assert_eq!(candidates_from(Some("  ")), c);
    }

    #[test]
    fn config_path_replaces_candidates() {
        assert_eq!(candidates_from(Some("/etc/digiskr.toml")), vec![PathBuf::from("/etc/digiskr.toml")]);
    }

    #[test]
    fn json_top_level_must_be_object() {
        let err = SourceFormat::Json.parse(Path::new("a.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, LoadError::NotAMapping { .. }));
    }

    #[test]
    fn toml_tables_become_nested_settings() -> Result<(), anyhow::Error> {
        let content = r#"
PATH = "/tmp/digiskr"
callsign = "BD7MQB"

[WSJTX]
decoding_depth_global = 3
decoding_depth_modes = { ft8 = 2 }
"#;
        let settings = SourceFormat::Toml.parse(Path::new("config.toml"), content)?;
        assert_eq!(settings.get("PATH").and_then(Value::as_str), Some("/tmp/digiskr"));
        assert_eq!(
            settings.lookup(&["WSJTX", "decoding_depth_modes", "ft8"]).and_then(Value::as_i64),
            Some(2)
        );
        Ok(())
    }

    #[test]
    fn missing_file_is_not_an_error() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join(format!("configs_source_{}.json", uuid::Uuid::new_v4()));
        assert!(load_file(&path, SourceFormat::Json)?.is_none());
        Ok(())
    }

    #[test]
    fn malformed_json_reports_path() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join(format!("configs_source_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{ \"PATH\": ")?;
        let err = load_file(&path, SourceFormat::Json).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
        std::fs::remove_file(&path)?;
        Ok(())
    }
}

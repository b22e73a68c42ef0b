//! Writing a settings mapping back to disk as indented JSON.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
    error::LoadError,
    value::{Settings, Value},
};

/// Canonical output path for write-back.
pub const DEFAULT_STORE_PATH: &str = "./settings.json";

/// Render `settings` as JSON with 4-space indentation and a trailing newline.
///
/// Fails with [`LoadError::NonFiniteFloat`] instead of emitting `null` for
/// NaN or infinity.
pub fn to_pretty_json(settings: &Settings) -> Result<Vec<u8>, LoadError> {
    if let Some(key) = find_non_finite(settings, "") {
        return Err(LoadError::NonFiniteFloat { key });
    }
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    settings.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Dotted path of the first NaN/infinite float, lists indexed as `key[i]`.
fn find_non_finite(settings: &Settings, prefix: &str) -> Option<String> {
    settings.iter().find_map(|(k, v)| {
        let key = if prefix.is_empty() { k.to_string() } else { format!("{prefix}.{k}") };
        find_in_value(v, key)
    })
}

fn find_in_value(value: &Value, key: String) -> Option<String> {
    match value {
        Value::Float(f) if !f.is_finite() => Some(key),
        Value::Table(t) => find_non_finite(t, &key),
        Value::List(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, v)| find_in_value(v, format!("{key}[{i}]"))),
        _ => None,
    }
}

/// Overwrite `path` with `settings`, creating parent directories if needed.
pub fn write_settings(path: &Path, settings: &Settings) -> Result<(), LoadError> {
    let content = to_pretty_json(settings)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

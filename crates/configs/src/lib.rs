//! Configuration loading for digiskr.
//!
//! A [`ConfigStore`] is built once at startup and handed to whatever needs
//! settings. The first [`ConfigStore::get`] resolves a source file
//! (`./settings.json`, then `./config.toml`, or `CONFIG_PATH` alone), and the
//! parsed [`Settings`] stay cached for the life of the store.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use once_cell::sync::OnceCell;
use tracing::info;

pub mod error;
pub mod persist;
pub mod source;
pub mod validate;
pub mod value;

pub use error::LoadError;
pub use validate::{validate, Check, ConfigError, CHECKS};
pub use value::{Settings, Value};

struct Loaded {
    path: PathBuf,
    settings: Arc<Settings>,
}

/// Lazily loaded, process-lifetime configuration.
pub struct ConfigStore {
    candidates: Vec<PathBuf>,
    store_path: PathBuf,
    loaded: OnceCell<Loaded>,
}

impl ConfigStore {
    /// Store that searches `candidates` in order.
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            store_path: PathBuf::from(persist::DEFAULT_STORE_PATH),
            loaded: OnceCell::new(),
        }
    }

    /// Default candidates, or just `CONFIG_PATH` when it is set.
    pub fn from_env() -> Self {
        Self::new(source::candidates_from_env())
    }

    /// Write-back target for [`ConfigStore::store`].
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Settings, loading them on the first call.
    ///
    /// Later calls return the same `Arc` without touching the disk. A failed
    /// load caches nothing, so the next call tries again.
    pub fn get(&self) -> Result<Arc<Settings>, LoadError> {
        let loaded = self.loaded.get_or_try_init(|| {
            let (path, settings) = source::resolve(&self.candidates)?;
            Ok::<_, LoadError>(Loaded {
                path,
                settings: Arc::new(settings),
            })
        })?;
        Ok(Arc::clone(&loaded.settings))
    }

    /// Settings if already loaded; never triggers a load.
    pub fn cached(&self) -> Option<Arc<Settings>> {
        self.loaded.get().map(|l| Arc::clone(&l.settings))
    }

    /// File the cached settings came from.
    pub fn source(&self) -> Option<&Path> {
        self.loaded.get().map(|l| l.path.as_path())
    }

    /// Write the loaded mapping to the store path as 4-space indented JSON.
    pub fn store(&self) -> Result<(), LoadError> {
        let settings = self.get()?;
        persist::write_settings(&self.store_path, &settings)?;
        info!(path = %self.store_path.display(), keys = settings.len(), "settings stored");
        Ok(())
    }

    /// Run every check against the loaded settings.
    pub fn validate_config(&self) -> Result<Vec<ConfigError>, LoadError> {
        let settings = self.get()?;
        Ok(validate(&settings))
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_loaded_before_first_get() {
        let store = ConfigStore::new(["./definitely-missing-settings.json"]);
        assert!(store.cached().is_none());
        assert!(store.source().is_none());
    }

    #[test]
    fn store_path_defaults_to_settings_json() {
        let store = ConfigStore::new(Vec::<PathBuf>::new());
        assert_eq!(store.store_path, PathBuf::from("./settings.json"));
        let store = store.with_store_path("/tmp/out.json");
        assert_eq!(store.store_path, PathBuf::from("/tmp/out.json"));
    }

    #[test]
    fn validate_config_checks_the_loaded_settings() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join(format!("configs_lib_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"callsign": "BD7MQB"}"#)?;

        let store = ConfigStore::new([path.clone()]);
        let errors = store.validate_config()?;
        assert_eq!(errors, vec![ConfigError::new("PATH", "temporary directory is not set")]);
        assert!(store.cached().is_some());

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn empty_candidate_list_is_not_found() {
        let store = ConfigStore::new(Vec::<PathBuf>::new());
        let err = store.get().unwrap_err();
        assert!(matches!(err, LoadError::ConfigNotFound { ref tried } if tried.is_empty()));
    }
}

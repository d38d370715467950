//! JSON-backed configuration store
//!
//! Wraps a [`Config`] together with the file it was loaded from. Values can be
//! read and written by dotted key (`"memory.vector_size"`); every successful
//! write is validated against the typed schema and saved immediately.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AgeniError, Result};

/// Default location of the config file: `<config dir>/ageni/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("ageni").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("ageni").join("config.json"))
}

/// Configuration plus the path it persists to
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Load the config file at `path`, falling back to defaults.
    ///
    /// A missing file is not an error. An unreadable or malformed file is
    /// logged and replaced by defaults in memory; the file itself is left
    /// alone until the next [`set`](Self::set).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let config = if path.exists() {
            match read_config(&path) {
                Ok(config) => {
                    info!("Loaded config from: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Error loading config: {e}; using defaults");
                    Config::default()
                }
            }
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        Self { path, config }
    }

    /// Wrap an existing config without touching the filesystem
    pub fn with_config(path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_complete(&self) -> bool {
        self.config.is_complete()
    }

    /// Look up a dotted key. Missing keys and JSON `null` both yield `None`.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let tree = serde_json::to_value(&self.config).ok()?;

        let mut current = &tree;
        for segment in key.split('.') {
            current = current.as_object()?.get(segment)?;
        }

        if current.is_null() {
            None
        } else {
            Some(current.clone())
        }
    }

    /// Look up a dotted key, returning `default` when it is missing, null,
    /// or not convertible to `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_value(key)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(default)
    }

    /// Set a dotted key and persist the result.
    ///
    /// Missing intermediate sections are created. The whole tree is checked
    /// against the schema before it replaces the current config, so a bad
    /// value leaves the store untouched. If saving fails the new value is
    /// kept in memory and the save error is returned.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let segments = split_key(key)?;
        let Some((leaf, sections)) = segments.split_last() else {
            return Err(AgeniError::Validation("Empty configuration key".to_string()));
        };

        let mut tree = serde_json::to_value(&self.config)?;

        let mut current = &mut tree;
        for segment in sections {
            let object = current.as_object_mut().ok_or_else(|| {
                AgeniError::Validation(format!("'{key}' passes through a non-section value"))
            })?;
            current = object
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        current
            .as_object_mut()
            .ok_or_else(|| {
                AgeniError::Validation(format!("'{key}' passes through a non-section value"))
            })?
            .insert(leaf.to_string(), value.into());

        let updated: Config = serde_json::from_value(tree)
            .map_err(|e| AgeniError::Validation(format!("Invalid value for '{key}': {e}")))?;

        self.config = updated;
        debug!("Config key {key} updated");

        self.save()
    }

    /// Write the current config to disk as pretty-printed JSON
    pub fn save(&self) -> Result<()> {
        let result = write_config(&self.path, &self.config);
        if let Err(ref e) = result {
            warn!("Error saving config: {e}");
        }
        result
    }
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(AgeniError::Validation(format!(
            "Invalid configuration key: '{key}'"
        )));
    }
    Ok(segments)
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AgeniError::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| AgeniError::Config(format!("Failed to parse config: {e}")))
}

fn write_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AgeniError::Config(format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| {
        AgeniError::Config(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionType;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("config.json"));

        assert_eq!(store.config(), &Config::default());
        // Loading alone never creates the file
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn test_load_malformed_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = ConfigStore::load(&path);
        assert_eq!(store.config(), &Config::default());
    }

    #[test]
    fn test_set_then_get_vector_size() {
        let dir = tempdir().unwrap();
        let mut store = ConfigStore::load(dir.path().join("config.json"));

        store.set("memory.vector_size", 768).unwrap();

        assert_eq!(store.get_value("memory.vector_size"), Some(serde_json::json!(768)));
        assert_eq!(store.get("memory.vector_size", 0usize), 768);
        assert_eq!(store.config().memory.vector_size, 768);
    }

    #[test]
    fn test_get_unset_nested_key_returns_default() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("config.json"));

        assert_eq!(store.get("memory.nothing.here", 42), 42);
        assert_eq!(store.get("missing", "fallback".to_string()), "fallback");
        assert!(store.get_value("qdrant.api_key").is_none());
    }

    #[test]
    fn test_get_type_mismatch_returns_default() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("config.json"));

        assert_eq!(store.get("qdrant.host", 0u16), 0);
    }

    #[test]
    fn test_set_persists_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut store = ConfigStore::load(&path);
        store.set("openrouter.api_key", "sk-or-test").unwrap();
        store.set("qdrant.port", 7333).unwrap();

        assert!(path.exists());

        let reloaded = ConfigStore::load(&path);
        assert_eq!(reloaded.config().openrouter.api_key.as_deref(), Some("sk-or-test"));
        assert_eq!(reloaded.config().qdrant.port, Some(7333));
        assert!(reloaded.is_complete());
    }

    #[test]
    fn test_set_creates_missing_sections() {
        let dir = tempdir().unwrap();
        let mut store = ConfigStore::load(dir.path().join("config.json"));

        store.set("plugins.risu.slot", 2).unwrap();

        assert_eq!(store.get("plugins.risu.slot", 0), 2);
        assert_eq!(
            store.config().extra.get("plugins"),
            Some(&serde_json::json!({"risu": {"slot": 2}}))
        );
    }

    #[test]
    fn test_set_invalid_value_leaves_config_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::load(&path);

        let err = store.set("qdrant.port", 70000).unwrap_err();
        assert!(matches!(err, AgeniError::Validation(_)));
        assert_eq!(store.config().qdrant.port, Some(6333));

        let err = store.set("memory.collection_type", "group").unwrap_err();
        assert!(matches!(err, AgeniError::Validation(_)));
        assert_eq!(store.config().memory.collection_type, CollectionType::Character);

        // Nothing was written
        assert!(!path.exists());
    }

    #[test]
    fn test_set_through_scalar_is_rejected() {
        let dir = tempdir().unwrap();
        let mut store = ConfigStore::load(dir.path().join("config.json"));

        let err = store.set("memory.vector_size.inner", 1).unwrap_err();
        assert!(matches!(err, AgeniError::Validation(_)));
    }

    #[test]
    fn test_set_rejects_empty_segments() {
        let dir = tempdir().unwrap();
        let mut store = ConfigStore::load(dir.path().join("config.json"));

        assert!(matches!(store.set("", 1), Err(AgeniError::Validation(_))));
        assert!(matches!(store.set("memory..size", 1), Err(AgeniError::Validation(_))));
    }

    #[test]
    fn test_set_null_clears_optional_key() {
        let dir = tempdir().unwrap();
        let mut store = ConfigStore::load(dir.path().join("config.json"));

        store.set("qdrant.api_key", "qk").unwrap();
        assert_eq!(store.config().qdrant.api_key.as_deref(), Some("qk"));

        store.set("qdrant.api_key", Value::Null).unwrap();
        assert!(store.config().qdrant.api_key.is_none());
    }

    #[test]
    fn test_save_failure_keeps_value_in_memory() {
        let dir = tempdir().unwrap();
        // The path is a directory, so writing to it fails
        let mut store = ConfigStore::load(dir.path());

        let err = store.set("memory.max_results", 5).unwrap_err();
        assert!(matches!(err, AgeniError::Config(_)));
        assert_eq!(store.config().memory.max_results, 5);
    }

    #[test]
    fn test_saved_file_is_pretty_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut store = ConfigStore::load(&path);
        store.set("general.debug", true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"qdrant\": {"));

        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["general"]["debug"], true);
        assert_eq!(value["memory"]["similarity_threshold"], 0.75);
    }

    #[test]
    fn test_default_config_path_ends_with_file_name() {
        let path = default_config_path();
        assert!(path.ends_with(Path::new("ageni").join("config.json")));
    }
}

//! JSON file backed settings store.
//!
//! The whole map is kept in memory and rewritten once per changing `set`
//! or `set_many`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{SettingValue, SettingsStore};
use crate::error::Result;

/// Write-through JSON file store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, SettingValue>,
}

impl JsonFileStore {
    /// Opens (or prepares to create) a store at `path`.
    ///
    /// A missing file yields an empty store. A file that cannot be read or
    /// parsed is logged and also yields an empty store; it is overwritten on
    /// the next write.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_overlay::store::{JsonFileStore, SettingsStore};
    ///
    /// let store = JsonFileStore::open("overlay_layout.json");
    /// println!("loaded {} keys", store.len());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match Self::read_file(&path) {
            Ok(Some(values)) => {
                info!("Loaded {} layout settings from {}", values.len(), path.display());
                values
            }
            Ok(None) => {
                debug!("No layout file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable layout file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    fn read_file(path: &Path) -> Result<Option<BTreeMap<String, SettingValue>>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let values = serde_json::from_str(&contents)?;
        Ok(Some(values))
    }

    fn write_file(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Applies one write to the map; returns true when it changed a value.
    fn apply(&mut self, key: &str, value: Option<SettingValue>) -> bool {
        match value {
            Some(value) => self.values.insert(key.to_string(), value.clone()) != Some(value),
            None => self.values.remove(key).is_some(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<SettingValue>) -> Result<()> {
        if self.apply(key, value) {
            self.write_file()?;
        }
        Ok(())
    }

    fn set_many(&mut self, entries: Vec<(String, Option<SettingValue>)>) -> Result<()> {
        let mut changed = false;
        for (key, value) in entries {
            changed |= self.apply(&key, value);
        }

        if changed {
            self.write_file()?;
        }
        Ok(())
    }
}

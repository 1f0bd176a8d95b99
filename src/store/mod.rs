//! # Settings Store Module
//!
//! Key/value persistence for control layouts.
//!
//! The overlay never depends on a concrete backend: every control reads and
//! writes through the [`SettingsStore`] trait, keyed by
//! `"<control-identity>_<field>"`. Two backends are provided:
//!
//! - [`MemoryStore`]: in-process map, used by tests and as a fallback
//! - [`JsonFileStore`]: write-through JSON file
//!
//! ## Usage
//!
//! ```
//! use pad_overlay::store::{MemoryStore, SettingValue, SettingsStore};
//!
//! let mut store = MemoryStore::new();
//! store.set("dpad_scale", Some(SettingValue::Int(70)))?;
//! assert_eq!(store.get("dpad_scale")?, Some(SettingValue::Int(70)));
//!
//! store.set("dpad_scale", None)?;
//! assert_eq!(store.get("dpad_scale")?, None);
//! # Ok::<(), pad_overlay::error::OverlayError>(())
//! ```

pub mod json_file;

pub use json_file::JsonFileStore;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// A single persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl SettingValue {
    /// Integer payload, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// String payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Int(i64::from(value))
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

/// Opaque key/value store used for persisted control layouts.
pub trait SettingsStore {
    /// Reads a value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<SettingValue>>;

    /// Writes a value, or deletes the key when `value` is `None`.
    fn set(&mut self, key: &str, value: Option<SettingValue>) -> Result<()>;

    /// Applies several writes as one update, stopping at the first error.
    fn set_many(&mut self, entries: Vec<(String, Option<SettingValue>)>) -> Result<()> {
        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, SettingValue>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Returns true when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<SettingValue>) -> Result<()> {
        match value {
            Some(value) => {
                self.values.insert(key.to_string(), value);
            }
            None => {
                self.values.remove(key);
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_delete() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("a_x", Some(SettingValue::Int(10))).unwrap();
        store.set("a_enabled", Some(SettingValue::Bool(false))).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a_x").unwrap(), Some(SettingValue::Int(10)));
        assert_eq!(store.get("a_enabled").unwrap(), Some(SettingValue::Bool(false)));

        store.set("a_x", None).unwrap();
        assert!(!store.contains_key("a_x"));
        assert_eq!(store.get("a_x").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.set("missing", None).is_ok());
    }

    #[test]
    fn test_set_many_applies_in_order() {
        let mut store = MemoryStore::new();
        store
            .set_many(vec![
                ("b_x".to_string(), Some(SettingValue::Int(1))),
                ("b_y".to_string(), Some(SettingValue::Int(2))),
                ("b_x".to_string(), None),
            ])
            .unwrap();
        assert!(!store.contains_key("b_x"));
        assert_eq!(store.get("b_y").unwrap(), Some(SettingValue::Int(2)));
    }

    #[test]
    fn test_set_many_stops_at_first_error() {
        let mut store = mocks::FailingStore::default();
        let entries = vec![
            ("b_x".to_string(), Some(SettingValue::Int(1))),
            ("b_y".to_string(), Some(SettingValue::Int(2))),
        ];
        assert!(store.set_many(entries).is_err());
        assert_eq!(store.write_attempts, 1);
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(SettingValue::Int(5).as_int(), Some(5));
        assert_eq!(SettingValue::Int(5).as_bool(), None);
        assert_eq!(SettingValue::Bool(true).as_bool(), Some(true));
        assert_eq!(SettingValue::from("x").as_str(), Some("x"));
        assert_eq!(SettingValue::from(7i32), SettingValue::Int(7));
    }

    #[test]
    fn test_untagged_serialization() {
        let json = serde_json::to_string(&vec![
            SettingValue::Int(3),
            SettingValue::Bool(true),
            SettingValue::Str("s".into()),
        ])
        .unwrap();
        assert_eq!(json, "[3,true,\"s\"]");

        let back: Vec<SettingValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[0], SettingValue::Int(3));
        assert_eq!(back[1], SettingValue::Bool(true));
    }
}

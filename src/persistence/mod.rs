//! Save/load persistence
//!
//! Features:
//! - Key/value store trait (LocalStorage on web, in-memory elsewhere)
//! - Versioned JSON envelope around every stored value
//! - Typed errors; callers decide whether a failure matters

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend is unavailable")]
    Unavailable,
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("failed to encode value for `{key}`: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to decode value for `{key}`: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("`{key}` was written by format version {found}, expected {}", FORMAT_VERSION)]
    UnsupportedVersion { key: String, found: u32 },
}

/// Minimal string key/value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Versioned wrapper written around every value
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Load and unwrap a JSON value. Missing keys are `Ok(None)`.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(json) = store.get(key)? else {
        return Ok(None);
    };

    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(&json).map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })?;
    if envelope.version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            found: envelope.version,
        });
    }

    serde_json::from_value(envelope.data)
        .map(Some)
        .map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Wrap a value in an envelope and store it as JSON
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let envelope = Envelope {
        version: FORMAT_VERSION,
        data: value,
    };
    let json = serde_json::to_string(&envelope).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Open the window's LocalStorage
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Backend(format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u64,
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let loaded: Option<Sample> = load_json(&store, "nope").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "sample", &Sample { value: 42 }).unwrap();
        let loaded: Option<Sample> = load_json(&store, "sample").unwrap();
        assert_eq!(loaded, Some(Sample { value: 42 }));
        assert!(store.get("sample").unwrap().unwrap().contains("\"version\":1"));
    }

    #[test]
    fn test_corrupt_value_is_decode_error() {
        let mut store = MemoryStore::new();
        store.set("sample", "{ not json").unwrap();
        let result: Result<Option<Sample>, _> = load_json(&store, "sample");
        assert!(matches!(result, Err(StorageError::Decode { .. })));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut store = MemoryStore::new();
        store
            .set("sample", r#"{"version":99,"data":{"value":1}}"#)
            .unwrap();
        let result: Result<Option<Sample>, _> = load_json(&store, "sample");
        assert!(matches!(
            result,
            Err(StorageError::UnsupportedVersion { found: 99, .. })
        ));
    }
}

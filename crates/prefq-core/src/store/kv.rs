use std::{collections::BTreeMap, io, path::PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

/// String-keyed storage of JSON-encoded values.
pub trait KeyValueStore {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The write is durable when this returns.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("failed to write store file {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to encode store value")]
    Encode(serde_json::Error),
}

/// In-memory store, used for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

impl<S> KeyValueStore for &mut S
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Reads and decodes the value under `key`.
///
/// A value that fails to decode is logged and reported as absent.
pub(crate) fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "ignoring unparsable stored value");
            None
        }
    }
}

pub(crate) fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value).map_err(StoreError::Encode)?;
    store.set(key, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1".to_owned()).unwrap();
        store.set("a", "2".to_owned()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_json_treats_garbage_as_absent() {
        let mut store = MemoryStore::new();
        store.set("bad", "{not json".to_owned()).unwrap();
        store.set("good", "[1,2]".to_owned()).unwrap();
        assert_eq!(read_json::<_, Vec<i32>>(&store, "bad"), None);
        assert_eq!(read_json::<_, Vec<i32>>(&store, "good"), Some(vec![1, 2]));
        assert_eq!(read_json::<_, Vec<i32>>(&store, "missing"), None);
    }

    #[test]
    fn test_write_json_through_mut_ref() {
        let mut store = MemoryStore::new();
        {
            let mut by_ref = &mut store;
            write_json(&mut by_ref, "k", &["x", "y"]).unwrap();
        }
        assert_eq!(store.get("k").as_deref(), Some(r#"["x","y"]"#));
    }
}

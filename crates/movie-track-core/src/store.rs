use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Synchronous string-keyed storage backing [`StoredSlot`].
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.slot_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) => {
                debug!(key, error = %err, "slot miss");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.slot_path(key), value)
            .map_err(|err| anyhow!("failed to write slot {key}: {err}"))
    }
}

/// In-memory store for tests and ephemeral sessions. Clones share the
/// same contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keeps a named slot in a key-value store synchronized with an
/// in-memory value.
///
/// The slot is read once at construction; an absent or unparsable slot
/// falls back to the caller-supplied default. Every mutation serializes
/// the value and writes it back. A failed write is logged and leaves the
/// in-memory value untouched.
pub struct StoredSlot<T> {
    store: Box<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T> StoredSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn open(store: Box<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match store.read(&key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!(key, error = %err, "stored slot is unparsable, using default");
                    default
                }
            },
            None => default,
        };
        Self { store, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Apply a mutation and write the result through to the store.
    pub fn update(&mut self, mutate: impl FnOnce(&mut T)) {
        mutate(&mut self.value);
        self.flush();
    }

    fn flush(&mut self) {
        let raw = match serde_json::to_string(&self.value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to serialize slot");
                return;
            }
        };
        if let Err(err) = self.store.write(&self.key, &raw) {
            warn!(key = %self.key, error = %err, "failed to persist slot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_track_models::WatchedEntry;

    fn entry(imdb_id: &str, user_rating: u8) -> WatchedEntry {
        WatchedEntry {
            imdb_id: imdb_id.to_string(),
            title: format!("Movie {imdb_id}"),
            year: "2005".to_string(),
            poster_url: String::new(),
            runtime_minutes: 120,
            imdb_rating: 7.5,
            user_rating,
            rating_revision_count: 1,
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::new(dir.path()).unwrap();
        let mut slot: StoredSlot<Vec<WatchedEntry>> =
            StoredSlot::open(Box::new(store), "watched", Vec::new());
        slot.update(|entries| {
            entries.push(entry("tt001", 8));
            entries.push(entry("tt002", 6));
            entries.push(entry("tt003", 9));
        });

        let store = FileStore::new(dir.path()).unwrap();
        let reopened: StoredSlot<Vec<WatchedEntry>> =
            StoredSlot::open(Box::new(store), "watched", Vec::new());
        assert_eq!(reopened.get().len(), 3);
        assert_eq!(reopened.get()[0].imdb_id, "tt001");
        assert_eq!(reopened.get()[2].imdb_id, "tt003");
        assert_eq!(reopened.get(), slot.get());
    }

    #[test]
    fn test_memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let mut slot: StoredSlot<Vec<WatchedEntry>> =
            StoredSlot::open(Box::new(store.clone()), "watched", Vec::new());
        slot.update(|entries| entries.push(entry("tt001", 8)));

        let reopened: StoredSlot<Vec<WatchedEntry>> =
            StoredSlot::open(Box::new(store), "watched", Vec::new());
        assert_eq!(reopened.get().len(), 1);
    }

    #[test]
    fn test_unparsable_slot_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.write("watched", "not json at all").unwrap();

        let slot: StoredSlot<Vec<WatchedEntry>> =
            StoredSlot::open(Box::new(store), "watched", Vec::new());
        assert!(slot.get().is_empty());
    }

    #[test]
    fn test_absent_slot_uses_default() {
        let slot: StoredSlot<Vec<WatchedEntry>> = StoredSlot::open(
            Box::new(MemoryStore::new()),
            "watched",
            vec![entry("tt001", 7)],
        );
        assert_eq!(slot.get().len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_in_memory_value() {
        struct FailingStore;
        impl KeyValueStore for FailingStore {
            fn read(&self, _key: &str) -> Option<String> {
                None
            }
            fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
                Err(anyhow!("quota exceeded"))
            }
        }

        let mut slot: StoredSlot<Vec<WatchedEntry>> =
            StoredSlot::open(Box::new(FailingStore), "watched", Vec::new());
        slot.update(|entries| entries.push(entry("tt001", 8)));

        assert_eq!(slot.get().len(), 1);
        assert_eq!(slot.get()[0].imdb_id, "tt001");
    }
}

/// Shared-blob persistence: many feature keys multiplexed into one slot.
///
/// A `PersistenceContext` owns (a handle to) a single storage slot holding a
/// JSON object keyed by feature key. Each writer re-reads the blob before
/// overwriting its own key, so independent features share one physical
/// location without clobbering each other. Persistence failures are logged
/// and swallowed: the mutation path degrades to in-memory-only operation.
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::store::{Store, Subscription};

/// A single read/write string slot, the "browser storage" boundary.
///
/// `read` returns `Ok(None)` when the slot has never been written.
pub trait StorageBackend {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, contents: &str) -> Result<()>;
}

/// Storage slot backed by one JSON file on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the default slot location (see `config::default_storage_path`).
    pub fn default_location() -> Self {
        Self::new(crate::config::default_storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read storage file: {}", self.path.display())
            }),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, contents).with_context(|| {
            format!("Failed to write storage file: {}", self.path.display())
        })
    }
}

/// In-process storage slot, for tests and hosts without a storage facility.
#[derive(Default)]
pub struct MemoryStorage {
    contents: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// Handle to the shared storage blob, passed explicitly to each consumer.
///
/// Cloning is cheap; clones share the same backend. A detached context has
/// no backend: loads find nothing and saves are no-ops, so consumers run
/// purely in memory.
#[derive(Clone)]
pub struct PersistenceContext {
    backend: Option<Rc<dyn StorageBackend>>,
}

impl PersistenceContext {
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A context with no storage facility behind it.
    pub fn detached() -> Self {
        Self { backend: None }
    }

    pub fn is_detached(&self) -> bool {
        self.backend.is_none()
    }

    /// Loads the value stored under `feature_key`.
    ///
    /// Absent blob, absent key, malformed JSON, or a wrong-shaped value all
    /// yield `None` so the caller falls back to its default. Never an error.
    pub fn load<T: DeserializeOwned>(&self, feature_key: &str) -> Option<T> {
        let value = self.read_blob().remove(feature_key)?;
        match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Stored value under {feature_key:?} has the wrong shape: {e}");
                None
            }
        }
    }

    /// Writes `value` under `feature_key`, preserving sibling keys.
    ///
    /// Failures are logged and swallowed; the caller keeps running on its
    /// in-memory state.
    pub fn save<T: Serialize>(&self, feature_key: &str, value: &T) {
        if let Err(e) = self.try_save(feature_key, value) {
            tracing::warn!("Failed to persist {feature_key:?}, continuing in memory: {e:#}");
        }
    }

    fn try_save<T: Serialize>(&self, feature_key: &str, value: &T) -> Result<()> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        // Re-read so sibling keys written since our last read survive the
        // read-modify-write.
        let mut blob = self.read_blob();
        let encoded = serde_json::to_value(value).context("Failed to serialize value")?;
        blob.insert(feature_key.to_string(), encoded);
        let contents =
            serde_json::to_string(&Value::Object(blob)).context("Failed to encode storage blob")?;
        backend.write(&contents)
    }

    fn read_blob(&self) -> Map<String, Value> {
        let Some(backend) = &self.backend else {
            return Map::new();
        };
        let contents = match backend.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Map::new(),
            Err(e) => {
                tracing::warn!("Failed to read storage blob: {e:#}");
                return Map::new();
            }
        };
        match serde_json::from_str::<Map<String, Value>>(&contents) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Malformed storage blob, treating as empty: {e}");
                Map::new()
            }
        }
    }
}

impl std::fmt::Debug for PersistenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceContext")
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// A store bound to one feature key in the shared blob.
///
/// The persisted value is pulled lazily when the first subscriber attaches;
/// every `set`/`update` writes through. Used for persisted fields that live
/// outside any undo history, e.g. a locale selection.
pub struct PersistedStore<T> {
    store: Store<T>,
    ctx: PersistenceContext,
    feature_key: String,
}

impl<T: Clone + Serialize + DeserializeOwned + 'static> PersistedStore<T> {
    pub fn new(ctx: PersistenceContext, feature_key: impl Into<String>, initial: T) -> Self {
        let feature_key = feature_key.into();
        let load_ctx = ctx.clone();
        let load_key = feature_key.clone();
        let store = Store::with_start(initial, move |setter| {
            if let Some(stored) = load_ctx.load::<T>(&load_key) {
                setter.set(stored);
            }
            None
        });
        Self {
            store,
            ctx,
            feature_key,
        }
    }

    pub fn subscribe(&self, observer: impl FnMut(&T) + 'static) -> Subscription<T> {
        self.store.subscribe(observer)
    }

    pub fn get(&self) -> T {
        self.store.get()
    }

    pub fn set(&self, value: T) {
        self.ctx.save(&self.feature_key, &value);
        self.store.set(value);
    }

    pub fn update(&self, updater: impl FnOnce(T) -> T) {
        self.set(updater(self.get()));
    }

    pub fn feature_key(&self) -> &str {
        &self.feature_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_context() -> (PersistenceContext, Rc<MemoryStorage>) {
        let backend = Rc::new(MemoryStorage::new());
        let ctx = PersistenceContext::new(Rc::clone(&backend) as Rc<dyn StorageBackend>);
        (ctx, backend)
    }

    #[test]
    fn test_load_from_empty_slot_is_none() {
        let (ctx, _backend) = memory_context();
        assert!(ctx.load::<String>("list").is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (ctx, _backend) = memory_context();
        ctx.save("list", &vec![1, 2, 3]);
        assert_eq!(ctx.load::<Vec<i32>>("list"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_sibling_keys_survive_read_modify_write() {
        let (ctx, _backend) = memory_context();
        ctx.save("list", &"groceries".to_string());
        ctx.save("locale", &"zh".to_string());
        ctx.save("list", &"chores".to_string());

        assert_eq!(ctx.load::<String>("list"), Some("chores".to_string()));
        assert_eq!(ctx.load::<String>("locale"), Some("zh".to_string()));
    }

    #[test]
    fn test_two_contexts_share_one_backend() {
        let backend = Rc::new(MemoryStorage::new());
        let a = PersistenceContext::new(Rc::clone(&backend) as Rc<dyn StorageBackend>);
        let b = PersistenceContext::new(backend as Rc<dyn StorageBackend>);

        a.save("alpha", &1);
        b.save("beta", &2);

        assert_eq!(a.load::<i32>("beta"), Some(2));
        assert_eq!(b.load::<i32>("alpha"), Some(1));
    }

    #[test]
    fn test_malformed_blob_falls_back_to_empty() {
        let (ctx, backend) = memory_context();
        backend.write("{ not json").unwrap();
        assert!(ctx.load::<String>("list").is_none());

        // A save after the fallback starts a fresh blob.
        ctx.save("list", &"ok".to_string());
        assert_eq!(ctx.load::<String>("list"), Some("ok".to_string()));
    }

    #[test]
    fn test_wrong_shape_value_is_none() {
        let (ctx, _backend) = memory_context();
        ctx.save("list", &"a string".to_string());
        assert!(ctx.load::<Vec<i32>>("list").is_none());
    }

    #[test]
    fn test_detached_context_is_silent() {
        let ctx = PersistenceContext::detached();
        assert!(ctx.is_detached());
        ctx.save("list", &1);
        assert!(ctx.load::<i32>("list").is_none());
    }

    #[test]
    fn test_file_storage_absent_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("ticklist.json"));
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/dir/ticklist.json"));
        storage.write("{}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_persisted_store_lazy_loads_on_first_subscribe() {
        let (ctx, _backend) = memory_context();
        ctx.save("locale", &"ru".to_string());

        let store = PersistedStore::new(ctx, "locale", "en".to_string());
        // Not yet loaded: no subscriber exists.
        assert_eq!(store.get(), "en");

        let _sub = store.subscribe(|_| {});
        assert_eq!(store.get(), "ru");
    }

    #[test]
    fn test_persisted_store_writes_through_on_set() {
        let (ctx, _backend) = memory_context();
        let store = PersistedStore::new(ctx.clone(), "locale", "en".to_string());
        store.set("tl".to_string());

        assert_eq!(ctx.load::<String>("locale"), Some("tl".to_string()));
    }

    #[test]
    fn test_persisted_store_update() {
        let (ctx, _backend) = memory_context();
        let store = PersistedStore::new(ctx.clone(), "counter", 1);
        store.update(|n| n + 1);

        assert_eq!(store.get(), 2);
        assert_eq!(ctx.load::<i32>("counter"), Some(2));
    }
}

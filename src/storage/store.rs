//! PersistentStore: typed, cached access to a storage provider.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::provider::{AppStorageProvider, MemoryStorage};

/// Values that can be persisted.
pub trait Storable: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Storable for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

struct CachedValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// A provider plus an in-process cache of decoded values.
///
/// Each key is read from the provider at most once; afterwards the cache is
/// authoritative. Writes go to the cache and then through to the provider.
/// Provider failures are logged and otherwise ignored.
pub struct PersistentStore {
    provider: Box<dyn AppStorageProvider>,
    cache: Mutex<HashMap<String, CachedValue>>,
}

impl PersistentStore {
    pub fn new(provider: impl AppStorageProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A store that forgets everything when the process exits.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// The value under `key`, or `default` if nothing readable is stored.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already cached with a different type.
    pub fn get_value<T: Storable>(&self, key: &str, default: T) -> T {
        if let Some(cached) = self.cache.lock().get(key) {
            return downcast(key, cached);
        }

        let value = self.load(key).unwrap_or(default);
        let mut cache = self.cache.lock();
        let cached = cache.entry(key.to_owned()).or_insert_with(|| CachedValue {
            type_name: std::any::type_name::<T>(),
            value: Arc::new(value),
        });
        downcast(key, cached)
    }

    /// Replace the value under `key` and write it through to the provider.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already cached with a different type.
    pub fn set_value<T: Storable>(&self, key: &str, value: T) {
        self.check_type::<T>(key);

        match serde_json::to_string(&value) {
            Ok(json) => {
                tracing::trace!(key, "persisting value");
                if let Err(error) = self.provider.persist(key, &json) {
                    tracing::warn!(key, %error, "failed to persist value");
                }
            }
            Err(error) => tracing::warn!(key, %error, "failed to encode value"),
        }

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.get(key) {
            if !cached.value.is::<T>() {
                mismatch::<T>(key, cached);
            }
        }
        cache.insert(
            key.to_owned(),
            CachedValue {
                type_name: std::any::type_name::<T>(),
                value: Arc::new(value),
            },
        );
    }

    /// Whether `key` has been read or written in this process.
    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.lock().contains_key(key)
    }

    fn check_type<T: Storable>(&self, key: &str) {
        if let Some(cached) = self.cache.lock().get(key) {
            if !cached.value.is::<T>() {
                mismatch::<T>(key, cached);
            }
        }
    }

    fn load<T: Storable>(&self, key: &str) -> Option<T> {
        let json = match self.provider.retrieve(key) {
            Ok(json) => json?,
            Err(error) => {
                tracing::warn!(key, %error, "failed to read persisted value");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "failed to decode persisted value; using default");
                None
            }
        }
    }
}

impl fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentStore")
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

fn downcast<T: Storable>(key: &str, cached: &CachedValue) -> T {
    match cached.value.downcast_ref::<T>() {
        Some(value) => value.clone(),
        None => mismatch::<T>(key, cached),
    }
}

fn mismatch<T>(key: &str, cached: &CachedValue) -> ! {
    tracing::error!(
        key,
        expected = std::any::type_name::<T>(),
        actual = cached.type_name,
        "persisted value has the wrong type"
    );
    panic!(
        "persisted value '{key}' is a {}, not a {}",
        cached.type_name,
        std::any::type_name::<T>()
    );
}

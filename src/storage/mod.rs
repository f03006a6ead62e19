//! Persisted application values.
//!
//! [`AppStorageProvider`]s hold raw JSON per key, [`PersistentStore`] adds a
//! typed in-process cache in front of one, and [`AppStorage`] exposes a key
//! to views as a dynamic property.

pub mod app_storage;
pub mod provider;
pub mod store;

pub use app_storage::{AppStorage, AppStorageKey};
pub use provider::{AppStorageProvider, JsonFileStorage, MemoryStorage, StorageError};
pub use store::{PersistentStore, Storable};

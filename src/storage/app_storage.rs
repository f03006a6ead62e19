//! AppStorage: a dynamic property backed by the persistent store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use super::store::{PersistentStore, Storable};
use crate::environment::Environment;
use crate::property::DynamicProperty;
use crate::reactive::{Binding, Publisher};

thread_local! {
    static KEY_PUBLISHERS: RefCell<HashMap<String, Publisher>> = RefCell::new(HashMap::new());
}

/// The publisher shared by every `AppStorage` on this thread using `key`.
fn publisher_for(key: &str) -> Publisher {
    KEY_PUBLISHERS.with(|publishers| {
        publishers
            .borrow_mut()
            .entry(key.to_owned())
            .or_default()
            .clone()
    })
}

/// A typed persisted key with a default, usable with
/// [`AppStorage::from_key`].
pub trait AppStorageKey: 'static {
    type Value: Storable;

    const NAME: &'static str;

    fn default_value() -> Self::Value;
}

type StoreSlot = Rc<RefCell<Option<Arc<PersistentStore>>>>;

/// A value persisted under a string key, re-rendering every view that reads
/// the key whenever any of them writes it.
///
/// Until its view is attached the property reads as its default; writing
/// before attachment panics.
pub struct AppStorage<T: Storable> {
    key: Rc<str>,
    default: T,
    store: RefCell<StoreSlot>,
    publisher: Publisher,
}

impl<T: Storable> AppStorage<T> {
    pub fn new(key: impl Into<String>, default: T) -> Self {
        let key: String = key.into();
        let publisher = publisher_for(&key);
        Self {
            key: Rc::from(key),
            default,
            store: RefCell::new(Rc::new(RefCell::new(None))),
            publisher,
        }
    }

    pub fn from_key<K: AppStorageKey<Value = T>>() -> Self {
        Self::new(K::NAME, K::default_value())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> T {
        read(&self.store.borrow(), &self.key, &self.default)
    }

    /// # Panics
    ///
    /// Panics if the property has not been attached to a view yet.
    pub fn set(&self, value: T) {
        write(&self.store.borrow(), &self.key, value, &self.publisher);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    pub fn binding(&self) -> Binding<T> {
        let slot = Rc::clone(&self.store.borrow());
        let key = Rc::clone(&self.key);
        let default = self.default.clone();
        let (write_slot, write_key) = (Rc::clone(&slot), Rc::clone(&key));
        let publisher = self.publisher.clone();
        Binding::new(
            move || read(&slot, &key, &default),
            move |value| write(&write_slot, &write_key, value, &publisher),
        )
    }

    pub fn publisher(&self) -> Publisher {
        self.publisher.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.store.borrow().borrow().is_some()
    }
}

fn read<T: Storable>(slot: &StoreSlot, key: &str, default: &T) -> T {
    match slot.borrow().as_ref() {
        Some(store) => store.get_value(key, default.clone()),
        None => default.clone(),
    }
}

fn write<T: Storable>(slot: &StoreSlot, key: &str, value: T, publisher: &Publisher) {
    let store = slot.borrow().clone();
    let Some(store) = store else {
        tracing::error!(key, "app storage written before its view was attached");
        panic!("AppStorage value '{key}' written before its view was attached to a view graph");
    };
    store.set_value(key, value);
    publisher.send();
}

impl<T: Storable> DynamicProperty for AppStorage<T> {
    fn update(&self, environment: &Environment, previous: Option<&Self>) {
        if let Some(previous) = previous {
            let slot = Rc::clone(&previous.store.borrow());
            *self.store.borrow_mut() = slot;
        }
        let store = environment.app_storage().cloned();
        if store.is_none() {
            tracing::debug!(key = &*self.key, "no persistent store in the environment");
        }
        *self.store.borrow().borrow_mut() = store;
    }

    fn publisher(&self) -> Option<Publisher> {
        Some(self.publisher.clone())
    }
}

impl<T: Storable + fmt::Debug> fmt::Debug for AppStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStorage")
            .field("key", &self.key)
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn attached_environment() -> (Environment, Arc<PersistentStore>) {
        let store = Arc::new(PersistentStore::in_memory());
        (Environment::new().with_app_storage(Arc::clone(&store)), store)
    }

    #[test]
    fn reads_default_before_attachment() {
        let volume = AppStorage::new("app_storage.default", 4);
        assert_eq!(volume.get(), 4);
        assert!(!volume.is_attached());
    }

    #[test]
    #[should_panic(expected = "before its view was attached")]
    fn write_before_attachment_panics() {
        AppStorage::new("app_storage.unattached", 4).set(5);
    }

    #[test]
    fn write_persists_and_notifies() {
        let (environment, store) = attached_environment();
        let volume = AppStorage::new("app_storage.notify", 1);
        DynamicProperty::update(&volume, &environment, None);

        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = volume.publisher().subscribe(move || counter.set(counter.get() + 1));

        volume.set(8);

        assert_eq!(hits.get(), 1);
        assert_eq!(volume.get(), 8);
        assert_eq!(store.get_value("app_storage.notify", 0), 8);
    }

    #[test]
    fn properties_sharing_a_key_share_a_publisher() {
        let (environment, _store) = attached_environment();
        let first = AppStorage::new("app_storage.shared", String::from("a"));
        let second = AppStorage::new("app_storage.shared", String::from("a"));
        DynamicProperty::update(&first, &environment, None);
        DynamicProperty::update(&second, &environment, None);
        assert!(first.publisher().ptr_eq(&second.publisher()));

        first.set(String::from("b"));
        assert_eq!(second.get(), "b");
    }

    #[test]
    fn binding_survives_view_replacement() {
        let (environment, _store) = attached_environment();
        let old = AppStorage::new("app_storage.binding", 0);
        DynamicProperty::update(&old, &environment, None);
        let binding = old.binding();

        let new = AppStorage::new("app_storage.binding", 0);
        DynamicProperty::update(&new, &environment, Some(&old));
        drop(old);

        binding.set(12);
        assert_eq!(new.get(), 12);
    }

    struct Theme;

    impl AppStorageKey for Theme {
        type Value = String;
        const NAME: &'static str = "app_storage.theme";

        fn default_value() -> String {
            String::from("light")
        }
    }

    #[test]
    fn typed_key_supplies_name_and_default() {
        let theme = AppStorage::<String>::from_key::<Theme>();
        assert_eq!(theme.key(), "app_storage.theme");
        assert_eq!(theme.get(), "light");
    }
}

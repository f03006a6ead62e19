//! State<T>: view-owned mutable storage that survives reconciliation.
//!
//! A `State` is declared as a field of a view value. The first time the view
//! is built its storage is fresh; every later update copies the storage handle
//! from the previous value into the new one, so the cell (and every binding or
//! subscription pointing at it) outlives the view values that carry it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::binding::Binding;
use super::observable::ObservableObject;
use super::publisher::{Cancellable, Publisher};
use crate::environment::Environment;
use crate::property::DynamicProperty;

/// Extracts the publisher of an observable value held by a state cell.
type UpstreamFn<T> = fn(&T) -> Option<Publisher>;

struct StateCell<T> {
    value: RefCell<T>,
    publisher: Publisher,
    upstream: Option<UpstreamFn<T>>,
    link: RefCell<Option<(Publisher, Cancellable)>>,
    released: Cell<bool>,
}

impl<T: 'static> StateCell<T> {
    fn new(value: T, upstream: Option<UpstreamFn<T>>) -> Rc<Self> {
        let cell = Rc::new(Self {
            value: RefCell::new(value),
            publisher: Publisher::new(),
            upstream,
            link: RefCell::new(None),
            released: Cell::new(false),
        });
        cell.relink();
        cell
    }

    fn ensure_live(&self) {
        if self.released.get() {
            tracing::error!(
                value = std::any::type_name::<T>(),
                "state accessed after its view was torn down"
            );
            panic!(
                "State<{}> accessed after the view owning it was torn down",
                std::any::type_name::<T>()
            );
        }
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.ensure_live();
        f(&self.value.borrow())
    }

    fn write(&self, value: T) {
        self.ensure_live();
        *self.value.borrow_mut() = value;
        self.post_set();
    }

    fn modify(&self, f: impl FnOnce(&mut T)) {
        self.ensure_live();
        f(&mut self.value.borrow_mut());
        self.post_set();
    }

    /// Runs after every write: fix up the upstream link, then notify once.
    fn post_set(&self) {
        self.relink();
        self.publisher.send();
    }

    fn relink(&self) {
        let Some(extract) = self.upstream else {
            return;
        };
        let upstream = extract(&self.value.borrow());
        let mut link = self.link.borrow_mut();
        match (upstream, link.as_ref()) {
            (Some(upstream), Some((current, _))) if upstream.ptr_eq(current) => {}
            (Some(upstream), _) => {
                tracing::trace!("linking state to observable publisher");
                let cancellable = self.publisher.link_to_upstream(&upstream);
                *link = Some((upstream, cancellable));
            }
            (None, Some(_)) => {
                tracing::trace!("observable cleared; unlinking state");
                *link = None;
            }
            (None, None) => {}
        }
    }

    fn release(&self) {
        self.released.set(true);
        self.link.borrow_mut().take();
    }
}

/// View-owned mutable storage.
///
/// Reading is free; writing notifies every subscriber of
/// [`publisher`](State::publisher) exactly once, which in turn schedules the
/// owning view node for an update.
pub struct State<T: 'static> {
    cell: RefCell<Rc<StateCell<T>>>,
}

impl<T: 'static> State<T> {
    /// Storage with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            cell: RefCell::new(StateCell::new(value, None)),
        }
    }

    /// Storage whose value may hold an observable; `upstream` extracts its
    /// publisher. Writes that change which publisher the value exposes
    /// move the forwarding link to the new one.
    pub fn with_upstream(value: T, upstream: fn(&T) -> Option<Publisher>) -> Self {
        Self {
            cell: RefCell::new(StateCell::new(value, Some(upstream))),
        }
    }

    fn storage(&self) -> Rc<StateCell<T>> {
        Rc::clone(&self.cell.borrow())
    }

    /// Read the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.storage().read(T::clone)
    }

    /// Read by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.storage().read(f)
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        self.storage().write(value);
    }

    /// Mutate the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.storage().modify(f);
    }

    /// A binding that reads and writes this state's storage.
    pub fn binding(&self) -> Binding<T>
    where
        T: Clone,
    {
        let read = self.storage();
        let write = self.storage();
        Binding::new(move || read.read(T::clone), move |value| write.write(value))
    }

    /// The publisher that fires after every write, including forwarded
    /// notifications from a linked observable.
    pub fn publisher(&self) -> Publisher {
        self.storage().publisher.clone()
    }

    /// Whether two states share one storage cell.
    pub fn same_cell(&self, other: &State<T>) -> bool {
        Rc::ptr_eq(&self.cell.borrow(), &other.cell.borrow())
    }
}

impl<M: ObservableObject> State<Rc<M>> {
    /// State holding an observable object; the object's changes are
    /// forwarded to this state's publisher.
    pub fn observed(object: Rc<M>) -> Self {
        Self::with_upstream(object, |object| Some(object.did_change()))
    }
}

impl<M: ObservableObject> State<Option<Rc<M>>> {
    /// State holding an optional observable object. Forwarding follows the
    /// current value: setting `None` unlinks, setting `Some` links.
    pub fn observed_optional(object: Option<Rc<M>>) -> Self {
        Self::with_upstream(object, |object| object.as_ref().map(|o| o.did_change()))
    }
}

impl<T: Default + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let storage = self.storage();
        if storage.released.get() {
            return f.write_str("State(<released>)");
        }
        let value = storage.value.borrow();
        f.debug_tuple("State").field(&*value).finish()
    }
}

impl<T: 'static> DynamicProperty for State<T> {
    fn update(&self, _environment: &Environment, previous: Option<&Self>) {
        if let Some(previous) = previous {
            let storage = previous.storage();
            *self.cell.borrow_mut() = storage;
        }
    }

    fn publisher(&self) -> Option<Publisher> {
        Some(State::publisher(self))
    }

    fn release(&self) {
        self.storage().release();
    }
}

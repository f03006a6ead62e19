//! The DynamicProperty trait and the environment-reading properties.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::environment::{Environment, EnvironmentKey};
use crate::reactive::{ObservableObject, Publisher};

/// A view field whose live value is owned by the view graph rather than by
/// the transient view value.
///
/// The graph calls [`update`](DynamicProperty::update) on every build and
/// update of the owning node, before the node's content is evaluated, and
/// [`release`](DynamicProperty::release) once when the node is torn down.
pub trait DynamicProperty: 'static {
    /// Refresh this property for the node's next pass.
    ///
    /// `previous` is the same field on the view value being replaced, or
    /// `None` on first build and on state-triggered updates. Storage-backed
    /// properties adopt `previous`'s storage; environment-backed ones re-read
    /// `environment`.
    fn update(&self, environment: &Environment, previous: Option<&Self>);

    /// A publisher whose notifications should re-render the owning node.
    fn publisher(&self) -> Option<Publisher> {
        None
    }

    /// The owning node has been torn down.
    fn release(&self) {}
}

// ---------------------------------------------------------------------------
// Env<K>
// ---------------------------------------------------------------------------

/// A view field that reads environment key `K`.
pub struct Env<K: EnvironmentKey> {
    value: RefCell<Option<K::Value>>,
    _key: PhantomData<K>,
}

impl<K: EnvironmentKey> Env<K> {
    pub fn new() -> Self {
        Self {
            value: RefCell::new(None),
            _key: PhantomData,
        }
    }

    /// The value from the environment the owning node was last updated with.
    ///
    /// # Panics
    ///
    /// Panics if read before the view graph attached the property.
    pub fn get(&self) -> K::Value {
        match self.value.borrow().as_ref() {
            Some(value) => value.clone(),
            None => {
                tracing::error!(key = std::any::type_name::<K>(), "environment property read before attachment");
                panic!(
                    "Env<{}> read before its view was attached to a view graph",
                    std::any::type_name::<K>()
                );
            }
        }
    }
}

impl<K: EnvironmentKey> Default for Env<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EnvironmentKey> fmt::Debug for Env<K>
where
    K::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Env").field(&*self.value.borrow()).finish()
    }
}

impl<K: EnvironmentKey> DynamicProperty for Env<K> {
    fn update(&self, environment: &Environment, _previous: Option<&Self>) {
        *self.value.borrow_mut() = Some(environment.get::<K>());
    }
}

// ---------------------------------------------------------------------------
// EnvObject<M>
// ---------------------------------------------------------------------------

/// A view field that reads an observable object provided by an ancestor
/// through [`Environment::with_object`]. The owning node re-renders when the
/// object changes.
pub struct EnvObject<M: ObservableObject> {
    value: RefCell<Option<Rc<M>>>,
    attached: Cell<bool>,
}

impl<M: ObservableObject> EnvObject<M> {
    pub fn new() -> Self {
        Self {
            value: RefCell::new(None),
            attached: Cell::new(false),
        }
    }

    /// The provided object, or `None` if no ancestor provides one.
    ///
    /// # Panics
    ///
    /// Panics if read before the view graph attached the property.
    pub fn get(&self) -> Option<Rc<M>> {
        if !self.attached.get() {
            tracing::error!(object = std::any::type_name::<M>(), "environment object read before attachment");
            panic!(
                "EnvObject<{}> read before its view was attached to a view graph",
                std::any::type_name::<M>()
            );
        }
        self.value.borrow().clone()
    }
}

impl<M: ObservableObject> Default for EnvObject<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ObservableObject> DynamicProperty for EnvObject<M> {
    fn update(&self, environment: &Environment, _previous: Option<&Self>) {
        *self.value.borrow_mut() = environment.object::<M>();
        self.attached.set(true);
    }

    fn publisher(&self) -> Option<Publisher> {
        self.value.borrow().as_ref().map(|object| object.did_change())
    }
}

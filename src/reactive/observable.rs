//! Observable objects: reference types that publish their own changes.

use std::cell::RefCell;
use std::fmt;

use super::publisher::Publisher;

/// A shared object that announces changes to its contents.
///
/// Objects are held as `Rc<M>`; a [`State`](super::State) created with
/// [`State::observed`](super::State::observed) forwards the object's
/// notifications to the views that own the state.
pub trait ObservableObject: 'static {
    /// The publisher that fires whenever this object's contents change.
    fn did_change(&self) -> Publisher;
}

/// A field of an observable object. Writing it sends on the owning object's
/// publisher.
///
/// ```ignore
/// struct Model {
///     changes: Publisher,
///     count: Published<i32>,
/// }
///
/// impl Model {
///     fn new() -> Rc<Self> {
///         let changes = Publisher::new();
///         Rc::new(Model { count: Published::new(0, &changes), changes })
///     }
/// }
///
/// impl ObservableObject for Model {
///     fn did_change(&self) -> Publisher {
///         self.changes.clone()
///     }
/// }
/// ```
pub struct Published<T> {
    value: RefCell<T>,
    owner: Publisher,
}

impl<T> Published<T> {
    /// Create a field that publishes through `owner`.
    pub fn new(value: T, owner: &Publisher) -> Self {
        Self {
            value: RefCell::new(value),
            owner: owner.clone(),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Read by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replace the value and notify the owner's subscribers.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.owner.send();
    }

    /// Mutate the value in place and notify the owner's subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.owner.send();
    }
}

impl<T: fmt::Debug> fmt::Debug for Published<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Published").field(&*self.value.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counter {
        changes: Publisher,
        value: Published<i32>,
    }

    impl ObservableObject for Counter {
        fn did_change(&self) -> Publisher {
            self.changes.clone()
        }
    }

    fn counter() -> Counter {
        let changes = Publisher::new();
        Counter {
            value: Published::new(0, &changes),
            changes,
        }
    }

    #[test]
    fn set_notifies_owner() {
        let model = counter();
        let hits = Rc::new(Cell::new(0));
        let hits_c = Rc::clone(&hits);
        let _sub = model.did_change().subscribe(move || hits_c.set(hits_c.get() + 1));

        model.value.set(3);
        model.value.update(|v| *v += 1);
        assert_eq!(model.value.get(), 4);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn handler_can_read_the_new_value() {
        let model = Rc::new(counter());
        let seen = Rc::new(Cell::new(0));
        let seen_c = Rc::clone(&seen);
        let model_c = Rc::clone(&model);
        let _sub = model
            .did_change()
            .subscribe(move || seen_c.set(model_c.value.get()));

        model.value.set(9);
        assert_eq!(seen.get(), 9);
    }
}

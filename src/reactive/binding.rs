//! Binding<T>: a get/set accessor pair.
//!
//! Bindings taken from a [`State`](super::State) close over the state's cell,
//! not over the view value that produced them, so they stay valid across any
//! number of reconciliation passes.

use std::fmt;
use std::rc::Rc;

/// A get/set pair over some shared value.
pub struct Binding<T> {
    getter: Rc<dyn Fn() -> T>,
    setter: Rc<dyn Fn(T)>,
}

impl<T: 'static> Binding<T> {
    /// Build a binding from a getter and a setter.
    pub fn new(get: impl Fn() -> T + 'static, set: impl Fn(T) + 'static) -> Self {
        Self {
            getter: Rc::new(get),
            setter: Rc::new(set),
        }
    }

    /// A binding that always reads `value` and ignores writes.
    pub fn constant(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(move || value.clone(), |_| {})
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        (self.getter)()
    }

    /// Write a new value.
    pub fn set(&self, value: T) {
        (self.setter)(value)
    }

    /// Read, modify, and write back.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Derive a binding to a part of the bound value.
    ///
    /// Writes through the derived binding read the whole value, replace the
    /// part, and write the whole value back.
    pub fn project<U: Clone + 'static>(
        &self,
        get: fn(&T) -> &U,
        get_mut: fn(&mut T) -> &mut U,
    ) -> Binding<U> {
        let read = Rc::clone(&self.getter);
        let read_for_write = Rc::clone(&self.getter);
        let write = Rc::clone(&self.setter);
        Binding::new(
            move || get(&read()).clone(),
            move |part| {
                let mut whole = read_for_write();
                *get_mut(&mut whole) = part;
                write(whole);
            },
        )
    }

    /// Wrap the binding so that `action` runs with the new value after every
    /// write.
    pub fn on_change(self, action: impl Fn(&T) + 'static) -> Binding<T>
    where
        T: Clone,
    {
        let getter = Rc::clone(&self.getter);
        let setter = self.setter;
        Binding {
            getter,
            setter: Rc::new(move |value: T| {
                let copy = value.clone();
                setter(value);
                action(&copy);
            }),
        }
    }
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            getter: Rc::clone(&self.getter),
            setter: Rc::clone(&self.setter),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn get_set() {
        let value = Rc::new(Cell::new(42));
        let (r, w) = (Rc::clone(&value), Rc::clone(&value));
        let binding = Binding::new(move || r.get(), move |v| w.set(v));
        assert_eq!(binding.get(), 42);

        binding.set(69);
        assert_eq!(value.get(), 69);
    }

    #[test]
    fn update_round_trips() {
        let value = Rc::new(Cell::new(1));
        let (r, w) = (Rc::clone(&value), Rc::clone(&value));
        let binding = Binding::new(move || r.get(), move |v| w.set(v));
        binding.update(|v| *v *= 10);
        assert_eq!(value.get(), 10);
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Profile {
        name: String,
        age: u32,
    }

    #[test]
    fn projection_writes_through() {
        let value = Rc::new(RefCell::new(Profile {
            name: "hi".into(),
            age: 3,
        }));
        let (r, w) = (Rc::clone(&value), Rc::clone(&value));
        let binding = Binding::new(move || r.borrow().clone(), move |v| *w.borrow_mut() = v);

        let name = binding.project(|p| &p.name, |p| &mut p.name);
        assert_eq!(name.get(), "hi");

        name.set("hello".into());
        assert_eq!(binding.get().name, "hello");
        assert_eq!(value.borrow().age, 3);
    }

    #[test]
    fn on_change_runs_after_write() {
        let value = Rc::new(Cell::new(42));
        let changed = Rc::new(Cell::new(None));
        let (r, w) = (Rc::clone(&value), Rc::clone(&value));
        let changed_c = Rc::clone(&changed);
        let binding = Binding::new(move || r.get(), move |v| w.set(v))
            .on_change(move |v| changed_c.set(Some(*v)));

        assert_eq!(changed.get(), None);
        binding.set(69);
        assert_eq!(binding.get(), 69);
        assert_eq!(changed.get(), Some(69));
    }

    #[test]
    fn constant_ignores_writes() {
        let binding = Binding::constant(String::from("fixed"));
        binding.set(String::from("other"));
        assert_eq!(binding.get(), "fixed");
    }

    #[test]
    fn clones_share_accessors() {
        let value = Rc::new(Cell::new(0));
        let (r, w) = (Rc::clone(&value), Rc::clone(&value));
        let binding = Binding::new(move || r.get(), move |v| w.set(v));
        let other = binding.clone();
        other.set(5);
        assert_eq!(binding.get(), 5);
    }
}

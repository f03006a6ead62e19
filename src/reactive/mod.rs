//! Reactive state: publishers, state cells, bindings, observable objects.
//!
//! - [`Publisher`] / [`Cancellable`]: synchronous change fan-out.
//! - [`State`]: view-owned storage that survives reconciliation.
//! - [`Binding`]: get/set pair handed to child views.
//! - [`ObservableObject`] / [`Published`]: shared reference models.

pub mod binding;
pub mod observable;
pub mod publisher;
pub mod state;

pub use binding::Binding;
pub use observable::{ObservableObject, Published};
pub use publisher::{Cancellable, Publisher};
pub use state::State;

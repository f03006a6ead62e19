//! Publisher and Cancellable: synchronous change fan-out.
//!
//! A [`Publisher`] is a cheap, clonable handle to a shared subscriber list.
//! [`Publisher::send`] notifies every live subscriber synchronously, in
//! subscription order, on the calling thread. Handles are `!Send`: every
//! publisher belongs to the single UI thread.
//!
//! # Re-entrancy
//!
//! `send` iterates over a snapshot of the subscriber list taken when it
//! starts:
//!
//! - a subscription added during a `send` is not notified by that `send`;
//! - a subscription cancelled during a `send` is skipped if it has not been
//!   reached yet;
//! - a nested `send` (a handler sending on a publisher whose delivery is still
//!   in progress) skips any handler that is currently running and delivers
//!   to the others, so they may observe two notifications.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Handler = Rc<RefCell<dyn FnMut()>>;

struct Subscriber {
    id: u64,
    active: Rc<Cell<bool>>,
    handler: Handler,
}

struct PublisherInner {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// A change-notification fan-out point.
///
/// Cloning a `Publisher` yields another handle to the same subscriber list.
#[derive(Clone)]
pub struct Publisher {
    inner: Rc<PublisherInner>,
}

impl Publisher {
    /// Create a publisher with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(PublisherInner {
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register a handler. The handler runs on every subsequent [`send`]
    /// until the returned [`Cancellable`] is cancelled or dropped.
    ///
    /// [`send`]: Publisher::send
    #[must_use = "dropping the Cancellable cancels the subscription"]
    pub fn subscribe(&self, handler: impl FnMut() + 'static) -> Cancellable {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let active = Rc::new(Cell::new(true));
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            active: Rc::clone(&active),
            handler,
        });
        Cancellable {
            publisher: Rc::downgrade(&self.inner),
            id,
            active,
        }
    }

    /// Notify all live subscribers, in subscription order.
    pub fn send(&self) {
        let snapshot: Vec<(Rc<Cell<bool>>, Handler)> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| (Rc::clone(&s.active), Rc::clone(&s.handler)))
            .collect();

        tracing::trace!(subscribers = snapshot.len(), "publisher send");

        for (active, handler) in snapshot {
            if !active.get() {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(),
                Err(_) => tracing::trace!("skipping handler already running"),
            }
        }
    }

    /// Forward every `send` on `upstream` to this publisher.
    ///
    /// The returned subscription lives on `upstream`; whoever owns this
    /// publisher must keep it and cancel it when relinking or tearing down.
    /// The link holds this publisher weakly, so it never keeps it alive.
    #[must_use = "dropping the Cancellable removes the forwarding link"]
    pub fn link_to_upstream(&self, upstream: &Publisher) -> Cancellable {
        let downstream = Rc::downgrade(&self.inner);
        upstream.subscribe(move || {
            if let Some(inner) = downstream.upgrade() {
                Publisher { inner }.send();
            }
        })
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether two handles refer to the same publisher.
    pub fn ptr_eq(&self, other: &Publisher) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Cancellable
// ---------------------------------------------------------------------------

/// A registered subscription. Cancelling is idempotent and also happens on
/// drop; it is safe from inside a notification handler.
pub struct Cancellable {
    publisher: Weak<PublisherInner>,
    id: u64,
    active: Rc<Cell<bool>>,
}

impl Cancellable {
    /// Stop delivering notifications to this subscription.
    pub fn cancel(&self) {
        if !self.active.replace(false) {
            return;
        }
        let Some(inner) = self.publisher.upgrade() else {
            return;
        };
        // Take the entry out first and drop it after the borrow ends: the
        // handler's captures may cancel other subscriptions on this publisher.
        let removed = {
            let mut subscribers = inner.subscribers.borrow_mut();
            subscribers
                .iter()
                .position(|s| s.id == self.id)
                .map(|index| subscribers.remove(index))
        };
        drop(removed);
    }

    /// Whether [`cancel`](Cancellable::cancel) has run.
    pub fn is_cancelled(&self) -> bool {
        !self.active.get()
    }
}

impl Drop for Cancellable {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellable")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

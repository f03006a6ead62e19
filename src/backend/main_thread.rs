//! Main-thread dispatch: a queue of closures drained on the UI thread.
//!
//! Any thread may enqueue work through a [`MainThreadHandle`]; the owning
//! backend drains the queue on the UI thread, in enqueue order.

use std::cell::RefCell;
use std::fmt;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// A unit of work for the UI thread.
pub type MainThreadTask = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable, thread-safe sender half of a [`MainQueue`].
#[derive(Clone)]
pub struct MainThreadHandle {
    sender: UnboundedSender<MainThreadTask>,
}

impl MainThreadHandle {
    /// Schedule `task` to run on the UI thread during the next drain.
    ///
    /// Returns `false` if the queue has been dropped.
    pub fn run(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.run_boxed(Box::new(task))
    }

    pub fn run_boxed(&self, task: MainThreadTask) -> bool {
        match self.sender.send(task) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!("main-thread queue is closed; task dropped");
                false
            }
        }
    }
}

impl fmt::Debug for MainThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThreadHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// The receiving side, owned by a backend on the UI thread.
pub struct MainQueue {
    sender: UnboundedSender<MainThreadTask>,
    receiver: RefCell<UnboundedReceiver<MainThreadTask>>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: RefCell::new(receiver),
        }
    }

    pub fn handle(&self) -> MainThreadHandle {
        MainThreadHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run every queued task, including tasks enqueued by tasks run during
    /// this drain. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            // Release the receiver before running: tasks may enqueue more work.
            let next = self.receiver.borrow_mut().try_recv();
            match next {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if ran > 0 {
            tracing::trace!(ran, "drained main-thread queue");
        }
        ran
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn tasks_run_in_order_on_drain() {
        let queue = MainQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = Arc::clone(&log);
            queue.handle().run(move || log.lock().unwrap().push(i));
        }
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(queue.drain(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.drain(), 0);
    }

    #[test]
    fn tasks_from_other_threads() {
        let queue = MainQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = queue.handle();
        let hits_c = Arc::clone(&hits);
        std::thread::spawn(move || {
            handle.run(move || {
                hits_c.fetch_add(1, Ordering::SeqCst);
            });
        })
        .join()
        .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        queue.drain();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tasks_enqueued_while_draining_also_run() {
        let queue = MainQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handle = queue.handle();
        let hits_c = Arc::clone(&hits);
        queue.handle().run(move || {
            let hits = Arc::clone(&hits_c);
            handle.run(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        });
        assert_eq!(queue.drain(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

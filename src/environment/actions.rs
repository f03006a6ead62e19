//! Environment actions: async operations views can trigger through the
//! backend.

use std::fmt;
use std::rc::Rc;

use tokio::sync::oneshot;

use super::Environment;
use crate::backend::Backend;

/// One button of an alert.
pub struct AlertAction {
    label: String,
    handler: Option<Box<dyn FnOnce()>>,
}

impl AlertAction {
    /// An action that runs `handler` when chosen.
    pub fn new(label: impl Into<String>, handler: impl FnOnce() + 'static) -> Self {
        Self {
            label: label.into(),
            handler: Some(Box::new(handler)),
        }
    }

    /// An action that only dismisses the alert.
    pub fn dismiss(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            handler: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertAction").field("label", &self.label).finish()
    }
}

/// Presents an alert and resolves to the index of the chosen action.
///
/// Obtained from [`Environment::present_alert`].
pub struct PresentAlertAction {
    backend: Rc<dyn Backend>,
    environment: Environment,
}

impl PresentAlertAction {
    pub(crate) fn new(backend: Rc<dyn Backend>, environment: Environment) -> Self {
        Self { backend, environment }
    }

    /// Show an alert titled `title`. With no actions, a single "OK" action is
    /// shown.
    ///
    /// Resolves to the index of the chosen action, after its handler has run.
    /// Resolves to `None` if the backend dismissed the alert without a choice
    /// or reported an index with no matching action.
    pub async fn call(&self, title: impl Into<String>, actions: Vec<AlertAction>) -> Option<usize> {
        let title = title.into();
        let actions = if actions.is_empty() {
            vec![AlertAction::dismiss("OK")]
        } else {
            actions
        };
        let labels: Vec<String> = actions.iter().map(|a| a.label.clone()).collect();
        let mut handlers: Vec<Option<Box<dyn FnOnce()>>> =
            actions.into_iter().map(|a| a.handler).collect();

        let (tx, rx) = oneshot::channel();
        tracing::debug!(%title, actions = labels.len(), "presenting alert");
        self.backend.show_alert(
            &title,
            &labels,
            &self.environment,
            Box::new(move |index| match handlers.get_mut(index) {
                Some(slot) => {
                    if let Some(handler) = slot.take() {
                        handler();
                    }
                    let _ = tx.send(index);
                }
                None => tracing::warn!(index, actions = handlers.len(), "alert selection out of range"),
            }),
        );
        rx.await.ok()
    }
}

impl fmt::Debug for PresentAlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentAlertAction").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tokio_test::{assert_pending, assert_ready_eq};

    use super::*;
    use crate::backend::HeadlessBackend;

    fn environment(backend: &Rc<HeadlessBackend>) -> Environment {
        Environment::new().with_backend(Rc::clone(backend) as Rc<dyn Backend>)
    }

    #[test]
    fn chosen_action_runs_before_resolving() {
        let backend = Rc::new(HeadlessBackend::new());
        let present = environment(&backend).present_alert();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let mut alert = tokio_test::task::spawn(present.call(
            "Save?",
            vec![AlertAction::dismiss("Cancel"), AlertAction::new("Save", move || flag.set(true))],
        ));
        assert_pending!(alert.poll());

        backend.choose_alert_action(1);

        assert!(ran.get());
        assert_ready_eq!(alert.poll(), Some(1));
    }

    #[test]
    fn out_of_range_selection_resolves_to_none() {
        let backend = Rc::new(HeadlessBackend::new());
        let present = environment(&backend).present_alert();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let mut alert = tokio_test::task::spawn(
            present.call("Save?", vec![AlertAction::new("Save", move || flag.set(true))]),
        );
        assert_pending!(alert.poll());

        assert!(backend.choose_alert_action(3));

        assert!(!ran.get());
        assert_ready_eq!(alert.poll(), None);
    }
}

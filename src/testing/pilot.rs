//! Pilot: programmatic interaction with a headless App.
//!
//! The `Pilot` opens one window on a [`HeadlessBackend`] and provides methods
//! to simulate user input (button presses, toggles, resizes, alert choices),
//! settle the resulting state changes, and inspect the widget tree.

use std::rc::Rc;

use crate::app::{App, AppConfig};
use crate::backend::{HeadlessBackend, HeadlessWidget, WidgetId, WidgetKind, WindowId};
use crate::geometry::Size;
use crate::graph::ViewGraph;
use crate::view::View;

use super::snapshot::widget_tree_to_string;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// Every interaction settles the app afterwards (ticks until idle), so
/// assertions see the fully re-rendered, re-laid-out tree.
///
/// # Examples
///
/// ```ignore
/// let mut pilot = Pilot::new(Counter::default());
/// pilot.press("Increment");
/// assert!(pilot.has_text("count: 1"));
/// ```
pub struct Pilot {
    backend: Rc<HeadlessBackend>,
    app: App,
    window: WindowId,
}

impl Pilot {
    /// Open `root` in a window of the default configuration.
    pub fn new(root: impl View) -> Self {
        Self::with_config(root, AppConfig::default())
    }

    pub fn with_config(root: impl View, config: AppConfig) -> Self {
        let backend = Rc::new(HeadlessBackend::new());
        let mut app = App::new(backend.clone(), config);
        let window = app.open_window(root);
        let mut pilot = Self { backend, app, window };
        pilot.settle();
        pilot
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn backend(&self) -> &HeadlessBackend {
        &self.backend
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn graph(&self) -> &ViewGraph {
        match self.app.window(self.window) {
            Some(scene) => scene.graph(),
            None => panic!("the pilot's window was closed"),
        }
    }

    pub fn root_widget(&self) -> WidgetId {
        self.graph().root_widget()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The first widget whose text or label is `text`.
    pub fn find_text(&self, text: &str) -> Option<WidgetId> {
        self.backend.find_text(self.root_widget(), text)
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.find_text(text).is_some()
    }

    /// A snapshot of the widget labelled `text`.
    pub fn widget(&self, text: &str) -> Option<HeadlessWidget> {
        self.backend.widget(self.find_text(text)?)
    }

    /// The window's widget tree as indented text.
    pub fn snapshot(&self) -> String {
        widget_tree_to_string(&self.backend, self.root_widget())
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Press the button labelled `label`. Returns whether an enabled button
    /// with that label was found.
    pub fn press(&mut self, label: &str) -> bool {
        let Some(id) = self.find_kind(label, WidgetKind::Button) else {
            return false;
        };
        let pressed = self.backend.press(id);
        self.settle();
        pressed
    }

    /// Flip the toggle labelled `label`. Returns whether an enabled toggle
    /// with that label was found.
    pub fn toggle(&mut self, label: &str) -> bool {
        let Some(id) = self.find_kind(label, WidgetKind::Toggle) else {
            return false;
        };
        let flipped = self.backend.toggle(id);
        self.settle();
        flipped
    }

    /// Resize the window as the user would.
    pub fn resize(&mut self, size: Size) {
        self.backend.resize_window(self.window, size);
        self.settle();
    }

    /// Choose action `index` of the oldest pending alert.
    pub fn choose_alert_action(&mut self, index: usize) -> bool {
        let chosen = self.backend.choose_alert_action(index);
        self.settle();
        chosen
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Run one update cycle. Returns how much work it did.
    pub fn tick(&mut self) -> usize {
        self.app.tick()
    }

    /// Tick until idle. Returns the number of ticks.
    pub fn settle(&mut self) -> usize {
        self.app.run_until_idle()
    }

    fn find_kind(&self, label: &str, kind: WidgetKind) -> Option<WidgetId> {
        let id = self.find_text(label)?;
        let widget = self.backend.widget(id)?;
        (widget.kind == kind).then_some(id)
    }
}

impl std::fmt::Debug for Pilot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pilot")
            .field("window", &self.window)
            .field("app", &self.app)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyFields;
    use crate::reactive::State;
    use crate::view::{AnyView, ViewExt};
    use crate::views::{Button, Text, Toggle, VStack};

    struct Switches {
        lit: State<bool>,
    }

    impl View for Switches {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("lit", |v| &v.lit);
        }

        fn content(&self) -> Vec<AnyView> {
            let lit = self.lit.binding();
            let status = if self.lit.get() { "lit" } else { "dark" };
            vec![
                Toggle::new("Lamp", lit.clone()).boxed(),
                Text::new(status).boxed(),
                Button::new("Off", move || lit.set(false)).disabled(!self.lit.get()).boxed(),
            ]
        }
    }

    fn switches() -> Switches {
        Switches { lit: State::new(false) }
    }

    #[test]
    fn toggle_rerenders_dependents() {
        let mut pilot = Pilot::new(VStack::new(vec![switches().boxed()]));
        assert!(pilot.has_text("dark"));

        assert!(pilot.toggle("Lamp"));

        assert!(pilot.has_text("lit"));
        assert_eq!(pilot.widget("Lamp").unwrap().is_on, Some(true));
    }

    #[test]
    fn disabled_button_ignores_presses() {
        let mut pilot = Pilot::new(switches());
        assert!(!pilot.press("Off"));
        assert!(pilot.toggle("Lamp"));
        assert!(pilot.press("Off"));
        assert!(pilot.has_text("dark"));
    }

    #[test]
    fn press_requires_a_button() {
        let mut pilot = Pilot::new(switches());
        assert!(!pilot.press("Lamp"));
        assert!(!pilot.press("missing"));
    }

    #[test]
    fn resize_relayouts_the_window() {
        let mut pilot = Pilot::new(Text::new("hello"));
        pilot.resize(Size::new(16, 100));
        let text = pilot.widget("hello").unwrap();
        assert_eq!(text.size, Size::new(16, 45));
    }
}

//! The backend contract: native widgets, windows, text measurement, and the
//! UI-thread queue.
//!
//! The engine never draws. It asks a [`Backend`] to create, update, arrange,
//! and destroy opaque widgets, and to measure text. [`HeadlessBackend`]
//! implements the contract in memory for tests and tooling.

pub mod headless;
pub mod main_thread;

use std::fmt;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::environment::{Color, Environment, ResolvedFont, TextSelectionKey};
use crate::geometry::{Offset, ProposedSize, Size};

pub use headless::{HeadlessBackend, HeadlessWidget, HeadlessWindow};
pub use main_thread::{MainQueue, MainThreadHandle, MainThreadTask};

new_key_type! {
    /// Opaque handle to a backend widget.
    pub struct WidgetId;
    /// Opaque handle to a backend window.
    pub struct WindowId;
}

/// The kinds of native widget the built-in views need.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Positions children; draws nothing itself.
    Container,
    Text,
    Button,
    Toggle,
    Rectangle,
}

/// New content for a widget, pushed after every build or update.
#[derive(Clone)]
pub enum WidgetUpdate {
    Text {
        content: String,
    },
    Button {
        label: String,
        action: Rc<dyn Fn()>,
    },
    Toggle {
        label: String,
        is_on: bool,
        on_change: Rc<dyn Fn(bool)>,
    },
    Rectangle {
        color: Color,
    },
}

impl fmt::Debug for WidgetUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetUpdate::Text { content } => f.debug_struct("Text").field("content", content).finish(),
            WidgetUpdate::Button { label, .. } => f.debug_struct("Button").field("label", label).finish(),
            WidgetUpdate::Toggle { label, is_on, .. } => f
                .debug_struct("Toggle")
                .field("label", label)
                .field("is_on", is_on)
                .finish(),
            WidgetUpdate::Rectangle { color } => f.debug_struct("Rectangle").field("color", color).finish(),
        }
    }
}

/// Environment-derived styling resolved for one widget.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WidgetStyle {
    pub font: ResolvedFont,
    pub foreground: Color,
    pub is_enabled: bool,
    pub text_selectable: bool,
}

impl WidgetStyle {
    pub fn from_environment(environment: &Environment) -> Self {
        Self {
            font: environment.resolved_font(),
            foreground: environment.suggested_foreground_color(),
            is_enabled: environment.is_enabled(),
            text_selectable: environment.get::<TextSelectionKey>(),
        }
    }
}

/// Callback invoked with the index of the chosen alert action.
pub type AlertCallback = Box<dyn FnOnce(usize)>;

/// A native UI toolkit, driven by the view graph on the UI thread.
///
/// Methods take `&self`: backends are shared through `Rc<dyn Backend>` and
/// keep their mutable state behind interior mutability.
pub trait Backend {
    // ── Widgets ──────────────────────────────────────────────────────

    fn create_widget(&self, kind: WidgetKind) -> WidgetId;

    /// Push new content and style to an existing widget.
    fn update_widget(&self, widget: WidgetId, update: WidgetUpdate, style: &WidgetStyle);

    fn destroy_widget(&self, widget: WidgetId);

    /// Replace a container's children, in order.
    fn set_children(&self, container: WidgetId, children: &[WidgetId]);

    /// Position the `index`th child of `container`, relative to the
    /// container's origin.
    fn set_position(&self, container: WidgetId, index: usize, position: Offset);

    fn set_size(&self, widget: WidgetId, size: Size);

    /// The size `text` occupies when offered `proposal`, in the font the
    /// environment resolves to.
    fn measure_text(&self, text: &str, proposal: ProposedSize, environment: &Environment) -> Size;

    // ── UI thread ────────────────────────────────────────────────────

    /// Handle for enqueueing work from any thread.
    fn main_thread(&self) -> MainThreadHandle;

    /// Run queued main-thread work. Returns how many tasks ran.
    fn drain_main_thread(&self) -> usize;

    fn run_on_main_thread(&self, task: MainThreadTask) {
        self.main_thread().run_boxed(task);
    }

    // ── Windows ──────────────────────────────────────────────────────

    fn create_window(&self, default_size: Size) -> WindowId;

    fn set_window_title(&self, window: WindowId, title: &str);

    fn set_window_content(&self, window: WindowId, content: WidgetId);

    fn show_window(&self, window: WindowId);

    fn window_size(&self, window: WindowId) -> Size;

    fn set_window_size(&self, window: WindowId, size: Size);

    /// Install the handler called after the user resizes `window`.
    fn set_resize_handler(&self, window: WindowId, handler: Box<dyn Fn(Size)>);

    // ── Alerts ───────────────────────────────────────────────────────

    /// Present an alert. `on_select` runs at most once, with the chosen
    /// action's index.
    fn show_alert(
        &self,
        title: &str,
        action_labels: &[String],
        environment: &Environment,
        on_select: AlertCallback,
    );
}

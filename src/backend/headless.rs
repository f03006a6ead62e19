//! HeadlessBackend: an in-memory backend for tests and tooling.
//!
//! Widgets and windows live in slotmaps. Nothing is drawn; instead the
//! backend records every call so tests can inspect the resulting widget
//! tree and simulate user input (button presses, toggles, window resizes,
//! alert choices).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use slotmap::SlotMap;

use super::main_thread::{MainQueue, MainThreadHandle};
use super::{AlertCallback, Backend, WidgetId, WidgetKind, WidgetStyle, WidgetUpdate, WindowId};
use crate::environment::{Color, Environment};
use crate::geometry::{Offset, ProposedSize, Size};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Everything the headless backend knows about one widget.
#[derive(Clone)]
pub struct HeadlessWidget {
    pub kind: WidgetKind,
    pub children: Vec<WidgetId>,
    /// Position of each child, parallel to `children`.
    pub positions: Vec<Offset>,
    pub size: Size,
    /// Text content, or the label of a button or toggle.
    pub text: Option<String>,
    pub color: Option<Color>,
    pub is_on: Option<bool>,
    pub style: Option<WidgetStyle>,
    pub update_count: usize,
    action: Option<Rc<dyn Fn()>>,
    on_toggle: Option<Rc<dyn Fn(bool)>>,
}

impl HeadlessWidget {
    fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            positions: Vec::new(),
            size: Size::ZERO,
            text: None,
            color: None,
            is_on: None,
            style: None,
            update_count: 0,
            action: None,
            on_toggle: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.style.map_or(true, |style| style.is_enabled)
    }
}

impl fmt::Debug for HeadlessWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWidget")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("size", &self.size)
            .field("children", &self.children.len())
            .finish()
    }
}

/// A headless window.
#[derive(Clone)]
pub struct HeadlessWindow {
    pub title: String,
    pub size: Size,
    pub content: Option<WidgetId>,
    pub shown: bool,
    resize_handler: Option<Rc<dyn Fn(Size)>>,
}

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("title", &self.title)
            .field("size", &self.size)
            .field("shown", &self.shown)
            .finish()
    }
}

struct PendingAlert {
    title: String,
    labels: Vec<String>,
    on_select: AlertCallback,
}

// ---------------------------------------------------------------------------
// HeadlessBackend
// ---------------------------------------------------------------------------

/// In-memory [`Backend`].
pub struct HeadlessBackend {
    widgets: RefCell<SlotMap<WidgetId, HeadlessWidget>>,
    windows: RefCell<SlotMap<WindowId, HeadlessWindow>>,
    main_queue: MainQueue,
    alerts: RefCell<Vec<PendingAlert>>,
    destroyed: Cell<usize>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            widgets: RefCell::new(SlotMap::with_key()),
            windows: RefCell::new(SlotMap::with_key()),
            main_queue: MainQueue::new(),
            alerts: RefCell::new(Vec::new()),
            destroyed: Cell::new(0),
        }
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// A snapshot of one widget, or `None` if it was destroyed.
    pub fn widget(&self, id: WidgetId) -> Option<HeadlessWidget> {
        self.widgets.borrow().get(id).cloned()
    }

    /// Number of live widgets.
    pub fn widget_count(&self) -> usize {
        self.widgets.borrow().len()
    }

    /// Number of widgets destroyed so far.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed.get()
    }

    pub fn window(&self, id: WindowId) -> Option<HeadlessWindow> {
        self.windows.borrow().get(id).cloned()
    }

    /// The first live widget whose text or label equals `text`, searching
    /// depth-first from `root`.
    pub fn find_text(&self, root: WidgetId, text: &str) -> Option<WidgetId> {
        let widgets = self.widgets.borrow();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(widget) = widgets.get(id) else {
                continue;
            };
            if widget.text.as_deref() == Some(text) {
                return Some(id);
            }
            stack.extend(widget.children.iter().rev().copied());
        }
        None
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Run a button's action, as if the user clicked it. Disabled buttons
    /// ignore the press. Returns whether the action ran.
    pub fn press(&self, id: WidgetId) -> bool {
        let action = {
            let widgets = self.widgets.borrow();
            widgets
                .get(id)
                .filter(|w| w.is_enabled())
                .and_then(|w| w.action.clone())
        };
        match action {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Flip a toggle, as if the user clicked it. Returns whether the toggle
    /// accepted the input.
    pub fn toggle(&self, id: WidgetId) -> bool {
        let target = {
            let widgets = self.widgets.borrow();
            widgets
                .get(id)
                .filter(|w| w.is_enabled())
                .and_then(|w| Some((w.on_toggle.clone()?, !w.is_on?)))
        };
        match target {
            Some((on_toggle, value)) => {
                on_toggle(value);
                true
            }
            None => false,
        }
    }

    /// Resize a window as the user would, invoking its resize handler.
    pub fn resize_window(&self, id: WindowId, size: Size) {
        let handler = {
            let mut windows = self.windows.borrow_mut();
            let Some(window) = windows.get_mut(id) else {
                return;
            };
            window.size = size;
            window.resize_handler.clone()
        };
        if let Some(handler) = handler {
            handler(size);
        }
    }

    /// Titles and action labels of alerts awaiting a choice, oldest first.
    pub fn pending_alerts(&self) -> Vec<(String, Vec<String>)> {
        self.alerts
            .borrow()
            .iter()
            .map(|a| (a.title.clone(), a.labels.clone()))
            .collect()
    }

    /// Choose action `index` on the oldest pending alert.
    pub fn choose_alert_action(&self, index: usize) -> bool {
        let alert = {
            let mut alerts = self.alerts.borrow_mut();
            if alerts.is_empty() {
                return false;
            }
            alerts.remove(0)
        };
        (alert.on_select)(index);
        true
    }

    /// Dismiss the oldest pending alert without choosing an action.
    pub fn dismiss_alert(&self) -> bool {
        let mut alerts = self.alerts.borrow_mut();
        if alerts.is_empty() {
            return false;
        }
        drop(alerts.remove(0));
        true
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessBackend")
            .field("widgets", &self.widget_count())
            .field("windows", &self.windows.borrow().len())
            .finish()
    }
}

impl Backend for HeadlessBackend {
    fn create_widget(&self, kind: WidgetKind) -> WidgetId {
        self.widgets.borrow_mut().insert(HeadlessWidget::new(kind))
    }

    fn update_widget(&self, widget: WidgetId, update: WidgetUpdate, style: &WidgetStyle) {
        let mut widgets = self.widgets.borrow_mut();
        let Some(record) = widgets.get_mut(widget) else {
            tracing::trace!(?widget, "update for destroyed widget ignored");
            return;
        };
        record.style = Some(*style);
        record.update_count += 1;
        match update {
            WidgetUpdate::Text { content } => record.text = Some(content),
            WidgetUpdate::Button { label, action } => {
                record.text = Some(label);
                record.action = Some(action);
            }
            WidgetUpdate::Toggle { label, is_on, on_change } => {
                record.text = Some(label);
                record.is_on = Some(is_on);
                record.on_toggle = Some(on_change);
            }
            WidgetUpdate::Rectangle { color } => record.color = Some(color),
        }
    }

    fn destroy_widget(&self, widget: WidgetId) {
        if self.widgets.borrow_mut().remove(widget).is_some() {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    fn set_children(&self, container: WidgetId, children: &[WidgetId]) {
        let mut widgets = self.widgets.borrow_mut();
        if let Some(record) = widgets.get_mut(container) {
            record.children = children.to_vec();
            record.positions = vec![Offset::ZERO; children.len()];
        }
    }

    fn set_position(&self, container: WidgetId, index: usize, position: Offset) {
        let mut widgets = self.widgets.borrow_mut();
        if let Some(slot) = widgets
            .get_mut(container)
            .and_then(|record| record.positions.get_mut(index))
        {
            *slot = position;
        }
    }

    fn set_size(&self, widget: WidgetId, size: Size) {
        if let Some(record) = self.widgets.borrow_mut().get_mut(widget) {
            record.size = size;
        }
    }

    fn measure_text(&self, text: &str, proposal: ProposedSize, environment: &Environment) -> Size {
        let font = environment.resolved_font();
        let char_width = (font.point_size * 2 / 3).max(1);
        let line_height = font.line_height.max(1);
        let chars = text.chars().count() as i32;
        let natural_width = chars * char_width;

        let (width, mut lines) = match proposal.width {
            Some(available) if available < natural_width => {
                let per_line = (available / char_width).max(1);
                (per_line * char_width, (chars + per_line - 1) / per_line)
            }
            _ => (natural_width, 1),
        };
        if let Some(available) = proposal.height {
            lines = lines.min((available / line_height).max(1));
        }
        Size::new(width, lines.max(1) * line_height)
    }

    fn main_thread(&self) -> MainThreadHandle {
        self.main_queue.handle()
    }

    fn drain_main_thread(&self) -> usize {
        self.main_queue.drain()
    }

    fn create_window(&self, default_size: Size) -> WindowId {
        self.windows.borrow_mut().insert(HeadlessWindow {
            title: String::new(),
            size: default_size,
            content: None,
            shown: false,
            resize_handler: None,
        })
    }

    fn set_window_title(&self, window: WindowId, title: &str) {
        if let Some(record) = self.windows.borrow_mut().get_mut(window) {
            record.title = title.to_owned();
        }
    }

    fn set_window_content(&self, window: WindowId, content: WidgetId) {
        if let Some(record) = self.windows.borrow_mut().get_mut(window) {
            record.content = Some(content);
        }
    }

    fn show_window(&self, window: WindowId) {
        if let Some(record) = self.windows.borrow_mut().get_mut(window) {
            record.shown = true;
        }
    }

    fn window_size(&self, window: WindowId) -> Size {
        self.windows
            .borrow()
            .get(window)
            .map_or(Size::ZERO, |record| record.size)
    }

    fn set_window_size(&self, window: WindowId, size: Size) {
        if let Some(record) = self.windows.borrow_mut().get_mut(window) {
            record.size = size;
        }
    }

    fn set_resize_handler(&self, window: WindowId, handler: Box<dyn Fn(Size)>) {
        if let Some(record) = self.windows.borrow_mut().get_mut(window) {
            record.resize_handler = Some(Rc::from(handler));
        }
    }

    fn show_alert(
        &self,
        title: &str,
        action_labels: &[String],
        _environment: &Environment,
        on_select: AlertCallback,
    ) {
        self.alerts.borrow_mut().push(PendingAlert {
            title: title.to_owned(),
            labels: action_labels.to_vec(),
            on_select,
        });
    }
}

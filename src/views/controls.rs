//! Interactive controls: Button and Toggle.

use std::fmt;
use std::rc::Rc;

use crate::backend::{Backend, WidgetId, WidgetKind, WidgetStyle, WidgetUpdate};
use crate::environment::Environment;
use crate::geometry::{ProposedSize, Size, Spacing};
use crate::layout::LayoutContext;
use crate::reactive::Binding;
use crate::view::View;

/// Space between a button's label and its edge.
pub const BUTTON_INSETS: Spacing = Spacing::new(4, 8, 4, 8);

/// Width reserved for a toggle's switch, including the gap to its label.
pub const TOGGLE_SWITCH_WIDTH: i32 = 36;

/// Minimum height of a toggle.
pub const TOGGLE_MIN_HEIGHT: i32 = 20;

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A push button with a text label.
#[derive(Clone)]
pub struct Button {
    label: String,
    action: Rc<dyn Fn()>,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            action: Rc::new(action),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button").field("label", &self.label).finish()
    }
}

impl View for Button {
    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Button
    }

    fn update_widget(&self, widget: WidgetId, environment: &Environment, backend: &dyn Backend) {
        backend.update_widget(
            widget,
            WidgetUpdate::Button {
                label: self.label.clone(),
                action: Rc::clone(&self.action),
            },
            &WidgetStyle::from_environment(environment),
        );
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let label = cx
            .backend()
            .measure_text(&self.label, proposal.inset(BUTTON_INSETS), cx.environment());
        label + Size::new(BUTTON_INSETS.width(), BUTTON_INSETS.height())
    }
}

// ---------------------------------------------------------------------------
// Toggle
// ---------------------------------------------------------------------------

/// An on/off switch bound to a boolean.
#[derive(Clone)]
pub struct Toggle {
    label: String,
    is_on: Binding<bool>,
}

impl Toggle {
    pub fn new(label: impl Into<String>, is_on: Binding<bool>) -> Self {
        Self {
            label: label.into(),
            is_on,
        }
    }
}

impl fmt::Debug for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toggle")
            .field("label", &self.label)
            .field("is_on", &self.is_on)
            .finish()
    }
}

impl View for Toggle {
    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Toggle
    }

    fn update_widget(&self, widget: WidgetId, environment: &Environment, backend: &dyn Backend) {
        let binding = self.is_on.clone();
        backend.update_widget(
            widget,
            WidgetUpdate::Toggle {
                label: self.label.clone(),
                is_on: self.is_on.get(),
                on_change: Rc::new(move |value| binding.set(value)),
            },
            &WidgetStyle::from_environment(environment),
        );
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let switch = Spacing::new(0, 0, 0, TOGGLE_SWITCH_WIDTH);
        let label = cx
            .backend()
            .measure_text(&self.label, proposal.inset(switch), cx.environment());
        Size::new(label.width + TOGGLE_SWITCH_WIDTH, label.height.max(TOGGLE_MIN_HEIGHT))
    }
}

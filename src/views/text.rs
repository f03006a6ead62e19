//! Text: a run of styled text.

use crate::backend::{Backend, WidgetId, WidgetKind, WidgetStyle, WidgetUpdate};
use crate::environment::Environment;
use crate::geometry::{ProposedSize, Size};
use crate::layout::LayoutContext;
use crate::view::View;

/// A read-only run of text in the environment's font and foreground color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    content: String,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl View for Text {
    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Text
    }

    fn update_widget(&self, widget: WidgetId, environment: &Environment, backend: &dyn Backend) {
        backend.update_widget(
            widget,
            WidgetUpdate::Text {
                content: self.content.clone(),
            },
            &WidgetStyle::from_environment(environment),
        );
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        cx.backend().measure_text(&self.content, proposal, cx.environment())
    }
}

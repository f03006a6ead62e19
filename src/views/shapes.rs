//! Rectangle and Spacer: views that size themselves from the proposal.

use crate::backend::{Backend, WidgetId, WidgetKind, WidgetStyle, WidgetUpdate};
use crate::environment::{Color, Environment, LayoutOrientationKey};
use crate::geometry::{ProposedSize, Size};
use crate::layout::LayoutContext;
use crate::view::View;

/// Extent a rectangle takes along an unconstrained dimension.
pub const RECTANGLE_DEFAULT_EXTENT: i32 = 10;

/// A solid color filling whatever space it is offered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rectangle {
    color: Color,
}

impl Rectangle {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl View for Rectangle {
    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Rectangle
    }

    fn update_widget(&self, widget: WidgetId, environment: &Environment, backend: &dyn Backend) {
        backend.update_widget(
            widget,
            WidgetUpdate::Rectangle { color: self.color },
            &WidgetStyle::from_environment(environment),
        );
    }

    fn layout(&self, proposal: ProposedSize, _cx: &mut LayoutContext<'_>) -> Size {
        proposal.or_size(Size::new(RECTANGLE_DEFAULT_EXTENT, RECTANGLE_DEFAULT_EXTENT))
    }
}

/// Flexible empty space along the enclosing stack's axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Spacer {
    min_length: i32,
}

impl Spacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spacer that never shrinks below `length`.
    pub fn min_length(length: i32) -> Self {
        Self { min_length: length }
    }
}

impl View for Spacer {
    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let axis = cx.environment().get::<LayoutOrientationKey>();
        let main = proposal.along(axis).unwrap_or(self.min_length).max(self.min_length);
        Size::from_axes(axis, main, 0)
    }
}

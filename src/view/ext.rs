//! Builder-style modifiers available on every view.

use std::hash::Hash;
use std::rc::Rc;

use super::{AnyView, View, ViewIdentity};
use crate::environment::{
    Color, EnvironmentKey, Font, FontKey, ForegroundColorKey, IsEnabledKey,
};
use crate::geometry::Spacing;
use crate::layout::FrameBounds;
use crate::reactive::ObservableObject;
use crate::views::{EnvironmentModifier, Frame, Identified, ObjectProvider, Padding};

/// Chainable modifiers: `Text::new("hi").padding(4).frame(100, 40)`.
pub trait ViewExt: View + Sized {
    fn boxed(self) -> AnyView {
        AnyView::new(self)
    }

    /// Exactly `width` × `height`.
    fn frame(self, width: i32, height: i32) -> Frame {
        Frame::new(self, FrameBounds::fixed(Some(width), Some(height)))
    }

    /// # Panics
    ///
    /// Panics if a minimum exceeds its maximum.
    fn frame_bounds(self, bounds: FrameBounds) -> Frame {
        Frame::new(self, bounds)
    }

    /// The same padding on all four sides.
    fn padding(self, amount: i32) -> Padding {
        Padding::new(self, Spacing::all(amount))
    }

    fn padding_insets(self, insets: Spacing) -> Padding {
        Padding::new(self, insets)
    }

    /// Override `K` for this view and its descendants.
    fn environment<K: EnvironmentKey>(self, value: K::Value) -> EnvironmentModifier<K> {
        EnvironmentModifier::new(self, value)
    }

    fn font(self, font: Font) -> EnvironmentModifier<FontKey> {
        self.environment::<FontKey>(font)
    }

    fn foreground_color(self, color: Color) -> EnvironmentModifier<ForegroundColorKey> {
        self.environment::<ForegroundColorKey>(Some(color))
    }

    fn disabled(self, disabled: bool) -> EnvironmentModifier<IsEnabledKey> {
        self.environment::<IsEnabledKey>(!disabled)
    }

    /// Match this view to its previous node by `key` instead of position.
    fn id(self, key: impl Hash) -> Identified {
        Identified::new(self, ViewIdentity::new(&key))
    }

    fn environment_object<M: ObservableObject>(self, object: Rc<M>) -> ObjectProvider<M> {
        ObjectProvider::new(self, object)
    }
}

impl<V: View> ViewExt for V {}

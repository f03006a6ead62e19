//! Modifier views: wrap one child to change its layout, environment, or
//! identity.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::environment::{Environment, EnvironmentKey};
use crate::geometry::{Offset, ProposedSize, Size, Spacing};
use crate::layout::{FrameBounds, LayoutContext};
use crate::reactive::ObservableObject;
use crate::view::{AnyView, View, ViewIdentity};

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Bounds its child's size on each axis and centers it.
#[derive(Clone, Debug)]
pub struct Frame {
    content: AnyView,
    bounds: FrameBounds,
}

impl Frame {
    /// # Panics
    ///
    /// Panics if a minimum exceeds its maximum.
    pub fn new(content: impl Into<AnyView>, bounds: FrameBounds) -> Self {
        bounds.validate();
        Self {
            content: content.into(),
            bounds,
        }
    }

    pub fn bounds(&self) -> FrameBounds {
        self.bounds
    }
}

impl View for Frame {
    fn content(&self) -> Vec<AnyView> {
        vec![self.content.clone()]
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        self.bounds.layout(proposal, cx)
    }
}

// ---------------------------------------------------------------------------
// Padding
// ---------------------------------------------------------------------------

/// Adds space around its child.
#[derive(Clone, Debug)]
pub struct Padding {
    content: AnyView,
    insets: Spacing,
}

impl Padding {
    pub fn new(content: impl Into<AnyView>, insets: Spacing) -> Self {
        Self {
            content: content.into(),
            insets,
        }
    }
}

impl View for Padding {
    fn content(&self) -> Vec<AnyView> {
        vec![self.content.clone()]
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let child = cx.commit_child(0, proposal.inset(self.insets));
        cx.place_child(0, Offset::new(self.insets.left, self.insets.top));
        child + Size::new(self.insets.width(), self.insets.height())
    }
}

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

/// Overrides `K` for its child's subtree.
pub struct EnvironmentModifier<K: EnvironmentKey> {
    content: AnyView,
    value: K::Value,
    _key: PhantomData<fn() -> K>,
}

impl<K: EnvironmentKey> EnvironmentModifier<K> {
    pub fn new(content: impl Into<AnyView>, value: K::Value) -> Self {
        Self {
            content: content.into(),
            value,
            _key: PhantomData,
        }
    }
}

impl<K: EnvironmentKey> fmt::Debug for EnvironmentModifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentModifier")
            .field("key", &std::any::type_name::<K>())
            .field("content", &self.content)
            .finish()
    }
}

impl<K: EnvironmentKey> View for EnvironmentModifier<K> {
    fn content(&self) -> Vec<AnyView> {
        vec![self.content.clone()]
    }

    fn child_environment(&self, environment: &Environment) -> Environment {
        environment.derive::<K>(self.value.clone())
    }
}

/// Makes `object` available to its child's subtree through
/// [`EnvObject`](crate::property::EnvObject).
pub struct ObjectProvider<M: ObservableObject> {
    content: AnyView,
    object: Rc<M>,
}

impl<M: ObservableObject> ObjectProvider<M> {
    pub fn new(content: impl Into<AnyView>, object: Rc<M>) -> Self {
        Self {
            content: content.into(),
            object,
        }
    }
}

impl<M: ObservableObject> fmt::Debug for ObjectProvider<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectProvider")
            .field("object", &std::any::type_name::<M>())
            .field("content", &self.content)
            .finish()
    }
}

impl<M: ObservableObject> View for ObjectProvider<M> {
    fn content(&self) -> Vec<AnyView> {
        vec![self.content.clone()]
    }

    fn child_environment(&self, environment: &Environment) -> Environment {
        environment.with_object(Rc::clone(&self.object))
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Gives its child an explicit identity among its siblings.
#[derive(Clone, Debug)]
pub struct Identified {
    content: AnyView,
    identity: ViewIdentity,
}

impl Identified {
    pub fn new(content: impl Into<AnyView>, identity: ViewIdentity) -> Self {
        Self {
            content: content.into(),
            identity,
        }
    }
}

impl View for Identified {
    fn content(&self) -> Vec<AnyView> {
        vec![self.content.clone()]
    }

    fn identity(&self) -> Option<ViewIdentity> {
        Some(self.identity)
    }
}

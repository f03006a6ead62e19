//! The View trait and its type-erased form.
//!
//! A view is a cheap, immutable description of one UI node, produced fresh on
//! every reconciliation pass. The [`ViewGraph`](crate::graph::ViewGraph)
//! retains a node per view and decides, by comparing [`ViewKind`]s (and
//! [`ViewIdentity`]s where present), whether a new value updates an existing
//! node or replaces it.

pub mod ext;

use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::backend::{Backend, WidgetId, WidgetKind};
use crate::environment::Environment;
use crate::geometry::{ProposedSize, Size};
use crate::layout::{self, LayoutContext};
use crate::property::{ErasedUpdater, PropertyFields, PropertyUpdater};

pub use ext::ViewExt;

// ---------------------------------------------------------------------------
// Kind and identity
// ---------------------------------------------------------------------------

/// The type tag of a view value. Two values with the same kind at the same
/// tree position are the same node across passes.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ViewKind {
    id: TypeId,
    name: &'static str,
}

impl ViewKind {
    pub fn of<V: 'static>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: std::any::type_name::<V>(),
        }
    }

    /// The full type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path or generic arguments.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An explicit identity for matching children across passes regardless of
/// position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ViewIdentity(u64);

impl ViewIdentity {
    pub fn new(value: &impl Hash) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self(hasher.finish())
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// A declarative description of one node of the UI.
///
/// Every method has a default: a plain `impl View for T {}` describes a
/// childless container with no dynamic properties.
pub trait View: 'static {
    /// Declare the fields the graph must keep alive across passes.
    fn dynamic_properties(_fields: &mut PropertyFields<Self>)
    where
        Self: Sized,
    {
    }

    /// Child views, evaluated after this view's dynamic properties have been
    /// updated.
    fn content(&self) -> Vec<AnyView> {
        Vec::new()
    }

    /// Explicit identity, used when every sibling carries one.
    fn identity(&self) -> Option<ViewIdentity> {
        None
    }

    /// The environment handed to this view's children.
    fn child_environment(&self, environment: &Environment) -> Environment {
        environment.clone()
    }

    /// The native widget backing this node.
    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Container
    }

    /// Push this node's latest content to its widget.
    fn update_widget(&self, _widget: WidgetId, _environment: &Environment, _backend: &dyn Backend) {}

    /// Respond to a layout proposal. The default overlays all children.
    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        layout::overlay(proposal, cx)
    }
}

// ---------------------------------------------------------------------------
// AnyView
// ---------------------------------------------------------------------------

pub(crate) trait ErasedView {
    fn kind(&self) -> ViewKind;
    fn as_any(&self) -> &dyn Any;
    fn new_updater(&self) -> Box<dyn ErasedUpdater>;
    fn content(&self) -> Vec<AnyView>;
    fn identity(&self) -> Option<ViewIdentity>;
    fn child_environment(&self, environment: &Environment) -> Environment;
    fn widget_kind(&self) -> WidgetKind;
    fn update_widget(&self, widget: WidgetId, environment: &Environment, backend: &dyn Backend);
    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size;
}

impl<V: View> ErasedView for V {
    fn kind(&self) -> ViewKind {
        ViewKind::of::<V>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn new_updater(&self) -> Box<dyn ErasedUpdater> {
        Box::new(PropertyUpdater::<V>::for_type())
    }

    fn content(&self) -> Vec<AnyView> {
        View::content(self)
    }

    fn identity(&self) -> Option<ViewIdentity> {
        View::identity(self)
    }

    fn child_environment(&self, environment: &Environment) -> Environment {
        View::child_environment(self, environment)
    }

    fn widget_kind(&self) -> WidgetKind {
        View::widget_kind(self)
    }

    fn update_widget(&self, widget: WidgetId, environment: &Environment, backend: &dyn Backend) {
        View::update_widget(self, widget, environment, backend)
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        View::layout(self, proposal, cx)
    }
}

/// A type-erased, reference-counted view value. Cloning is cheap.
#[derive(Clone)]
pub struct AnyView(Rc<dyn ErasedView>);

impl AnyView {
    pub fn new(view: impl View) -> Self {
        Self(Rc::new(view))
    }

    pub fn kind(&self) -> ViewKind {
        self.0.kind()
    }

    pub fn identity(&self) -> Option<ViewIdentity> {
        self.0.identity()
    }

    /// The concrete view, if it is a `V`.
    pub fn downcast_ref<V: View>(&self) -> Option<&V> {
        self.0.as_any().downcast_ref::<V>()
    }

    pub(crate) fn erased(&self) -> &dyn ErasedView {
        &*self.0
    }

    /// Whether two handles share one view value.
    pub fn ptr_eq(&self, other: &AnyView) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V: View> From<V> for AnyView {
    fn from(view: V) -> Self {
        AnyView::new(view)
    }
}

impl fmt::Debug for AnyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyView").field(&self.kind()).finish()
    }
}

/// Build a `Vec<AnyView>` from a list of views.
///
/// ```ignore
/// VStack::new(views![Text::new("a"), Spacer::new(), Text::new("b")])
/// ```
#[macro_export]
macro_rules! views {
    () => { ::std::vec::Vec::<$crate::view::AnyView>::new() };
    ($($view:expr),+ $(,)?) => {
        ::std::vec![$($crate::view::AnyView::new($view)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;
    impl View for Leaf {}

    struct Tagged(u32);
    impl View for Tagged {
        fn identity(&self) -> Option<ViewIdentity> {
            Some(ViewIdentity::new(&self.0))
        }
    }

    #[test]
    fn kind_distinguishes_types() {
        let leaf = AnyView::new(Leaf);
        let tagged = AnyView::new(Tagged(1));
        assert_eq!(leaf.kind(), ViewKind::of::<Leaf>());
        assert_ne!(leaf.kind(), tagged.kind());
        assert_eq!(leaf.kind().short_name(), "Leaf");
    }

    #[test]
    fn identity_hashes_values() {
        assert_eq!(AnyView::new(Tagged(1)).identity(), AnyView::new(Tagged(1)).identity());
        assert_ne!(AnyView::new(Tagged(1)).identity(), AnyView::new(Tagged(2)).identity());
        assert_eq!(AnyView::new(Leaf).identity(), None);
    }

    #[test]
    fn views_macro_erases_each_entry() {
        let list = crate::views![Leaf, Tagged(3)];
        assert_eq!(list.len(), 2);
        assert!(list[1].downcast_ref::<Tagged>().is_some());
        assert!(crate::views![].is_empty());
    }

    #[test]
    fn clones_share_the_value() {
        let view = AnyView::new(Leaf);
        assert!(view.ptr_eq(&view.clone()));
    }
}

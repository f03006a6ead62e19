//! ForEach: one child view per item of a collection.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use super::modifiers::Identified;
use super::stack::inherited_stack;
use crate::geometry::{ProposedSize, Size};
use crate::layout::LayoutContext;
use crate::view::{AnyView, View, ViewIdentity};

/// Builds a child per item, laid out along the enclosing stack's axis.
///
/// [`ForEach::new`] matches children to nodes by position; after an insert,
/// the nodes after the insertion point receive the shifted items as updates.
/// [`ForEach::keyed`] matches by key instead, so each item keeps its node
/// (and its state) wherever it moves.
pub struct ForEach<T: 'static> {
    items: Vec<(T, Option<ViewIdentity>)>,
    build: Rc<dyn Fn(&T) -> AnyView>,
}

impl<T: 'static> ForEach<T> {
    /// Children matched by position.
    pub fn new<V: View>(items: impl IntoIterator<Item = T>, build: impl Fn(&T) -> V + 'static) -> Self {
        Self {
            items: items.into_iter().map(|item| (item, None)).collect(),
            build: Rc::new(move |item| AnyView::new(build(item))),
        }
    }

    /// Children matched by `key`.
    pub fn keyed<K: Hash, V: View>(
        items: impl IntoIterator<Item = T>,
        key: impl Fn(&T) -> K,
        build: impl Fn(&T) -> V + 'static,
    ) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| {
                    let identity = ViewIdentity::new(&key(&item));
                    (item, Some(identity))
                })
                .collect(),
            build: Rc::new(move |item| AnyView::new(build(item))),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: 'static> fmt::Debug for ForEach<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForEach")
            .field("items", &self.items.len())
            .field("keyed", &self.items.first().is_some_and(|(_, id)| id.is_some()))
            .finish()
    }
}

impl<T: 'static> View for ForEach<T> {
    fn content(&self) -> Vec<AnyView> {
        self.items
            .iter()
            .map(|(item, identity)| {
                let view = (self.build)(item);
                match identity {
                    Some(identity) => AnyView::new(Identified::new(view, *identity)),
                    None => view,
                }
            })
            .collect()
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let stack = inherited_stack(cx.environment());
        stack.layout(proposal, cx)
    }
}

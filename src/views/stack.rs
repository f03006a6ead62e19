//! Stacks and groups: containers that arrange a list of children.

use crate::environment::{
    Alignment, Environment, LayoutAlignmentKey, LayoutOrientationKey, LayoutSpacingKey,
};
use crate::geometry::{Axis, ProposedSize, Size};
use crate::layout::{overlay_aligned, LayoutContext, StackLayout};
use crate::view::{AnyView, View};

/// Environment for the children of a stack along `axis`.
///
/// Groups and `ForEach` nested directly in the stack read these keys, so
/// their items are laid out as if they were the stack's own.
fn stack_environment(environment: &Environment, axis: Axis, alignment: Alignment, spacing: i32) -> Environment {
    environment
        .derive::<LayoutOrientationKey>(axis)
        .derive::<LayoutAlignmentKey>(alignment)
        .derive::<LayoutSpacingKey>(spacing)
}

/// Stack layout described entirely by the environment.
pub(crate) fn inherited_stack(environment: &Environment) -> StackLayout {
    StackLayout {
        axis: environment.get::<LayoutOrientationKey>(),
        spacing: environment.get::<LayoutSpacingKey>(),
        alignment: environment.get::<LayoutAlignmentKey>(),
    }
}

/// Children stacked top to bottom.
#[derive(Clone, Debug)]
pub struct VStack {
    children: Vec<AnyView>,
    spacing: Option<i32>,
    alignment: Alignment,
}

impl VStack {
    pub fn new(children: Vec<AnyView>) -> Self {
        Self {
            children,
            spacing: None,
            alignment: Alignment::Center,
        }
    }

    /// Gap between children; defaults to the environment's layout spacing.
    pub fn spacing(mut self, spacing: i32) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn resolved(&self, environment: &Environment) -> StackLayout {
        StackLayout {
            axis: Axis::Vertical,
            spacing: self.spacing.unwrap_or_else(|| environment.get::<LayoutSpacingKey>()),
            alignment: self.alignment,
        }
    }
}

impl View for VStack {
    fn content(&self) -> Vec<AnyView> {
        self.children.clone()
    }

    fn child_environment(&self, environment: &Environment) -> Environment {
        let stack = self.resolved(environment);
        stack_environment(environment, stack.axis, stack.alignment, stack.spacing)
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let stack = self.resolved(cx.environment());
        stack.layout(proposal, cx)
    }
}

/// Children arranged left to right.
#[derive(Clone, Debug)]
pub struct HStack {
    children: Vec<AnyView>,
    spacing: Option<i32>,
    alignment: Alignment,
}

impl HStack {
    pub fn new(children: Vec<AnyView>) -> Self {
        Self {
            children,
            spacing: None,
            alignment: Alignment::Center,
        }
    }

    pub fn spacing(mut self, spacing: i32) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn resolved(&self, environment: &Environment) -> StackLayout {
        StackLayout {
            axis: Axis::Horizontal,
            spacing: self.spacing.unwrap_or_else(|| environment.get::<LayoutSpacingKey>()),
            alignment: self.alignment,
        }
    }
}

impl View for HStack {
    fn content(&self) -> Vec<AnyView> {
        self.children.clone()
    }

    fn child_environment(&self, environment: &Environment) -> Environment {
        let stack = self.resolved(environment);
        stack_environment(environment, stack.axis, stack.alignment, stack.spacing)
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let stack = self.resolved(cx.environment());
        stack.layout(proposal, cx)
    }
}

/// Children layered on top of each other; later children are in front.
#[derive(Clone, Debug)]
pub struct ZStack {
    children: Vec<AnyView>,
    alignment: Alignment,
}

impl ZStack {
    pub fn new(children: Vec<AnyView>) -> Self {
        Self {
            children,
            alignment: Alignment::Center,
        }
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl View for ZStack {
    fn content(&self) -> Vec<AnyView> {
        self.children.clone()
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        overlay_aligned(self.alignment, proposal, cx)
    }
}

/// A list of children laid out along the enclosing stack's axis.
#[derive(Clone, Debug)]
pub struct Group {
    children: Vec<AnyView>,
}

impl Group {
    pub fn new(children: Vec<AnyView>) -> Self {
        Self { children }
    }
}

impl View for Group {
    fn content(&self) -> Vec<AnyView> {
        self.children.clone()
    }

    fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let stack = inherited_stack(cx.environment());
        stack.layout(proposal, cx)
    }
}

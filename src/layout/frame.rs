//! Frame clamping: bound a single child's size on each axis.

use crate::geometry::{clamp_dimension, Offset, ProposedSize, Size};

use super::LayoutContext;

/// Optional minimum and maximum extents per axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameBounds {
    pub min_width: Option<i32>,
    pub max_width: Option<i32>,
    pub min_height: Option<i32>,
    pub max_height: Option<i32>,
}

impl FrameBounds {
    /// Exactly `width` × `height` where given.
    pub fn fixed(width: Option<i32>, height: Option<i32>) -> Self {
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
        }
    }

    pub fn min_width(mut self, value: i32) -> Self {
        self.min_width = Some(value);
        self
    }

    pub fn max_width(mut self, value: i32) -> Self {
        self.max_width = Some(value);
        self
    }

    pub fn min_height(mut self, value: i32) -> Self {
        self.min_height = Some(value);
        self
    }

    pub fn max_height(mut self, value: i32) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Panics if a minimum exceeds its maximum.
    pub fn validate(&self) {
        for (axis, min, max) in [
            ("width", self.min_width, self.max_width),
            ("height", self.min_height, self.max_height),
        ] {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    tracing::error!(axis, min, max, "frame minimum exceeds maximum");
                    panic!("frame minimum {axis} {min} exceeds maximum {max}");
                }
            }
        }
    }

    /// The proposal a framed child receives.
    ///
    /// A bounded dimension is clamped into the frame's range. An unbounded
    /// dimension stays unbounded unless the frame pins it to one value.
    pub fn child_proposal(&self, proposal: ProposedSize) -> ProposedSize {
        ProposedSize {
            width: propose(proposal.width, self.min_width, self.max_width),
            height: propose(proposal.height, self.min_height, self.max_height),
        }
    }

    /// The frame's response given its child's.
    pub fn response(&self, child: Size) -> Size {
        Size {
            width: clamp_dimension(child.width, self.min_width, self.max_width),
            height: clamp_dimension(child.height, self.min_height, self.max_height),
        }
    }

    /// Lay out the single child of a framed node and center it.
    pub fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        if cx.child_count() == 0 {
            return self.response(proposal.or_size(Size::ZERO));
        }
        let child = cx.commit_child(0, self.child_proposal(proposal));
        let size = self.response(child);
        cx.place_child(
            0,
            Offset::new((size.width - child.width) / 2, (size.height - child.height) / 2),
        );
        size
    }
}

fn propose(value: Option<i32>, min: Option<i32>, max: Option<i32>) -> Option<i32> {
    match (value, min, max) {
        (Some(value), _, _) => Some(clamp_dimension(value, min, max)),
        (None, Some(min), Some(max)) if min == max => Some(min),
        (None, _, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_raises_child_proposal() {
        let bounds = FrameBounds::default().min_width(150).min_height(200);
        let proposal = bounds.child_proposal(ProposedSize::new(100, 100));
        assert_eq!(proposal, ProposedSize::new(150, 200));
        assert_eq!(bounds.response(Size::new(150, 200)), Size::new(150, 200));
    }

    #[test]
    fn smaller_minimum_has_no_effect() {
        let bounds = FrameBounds::default().min_width(20).min_height(40);
        assert_eq!(bounds.child_proposal(ProposedSize::new(100, 100)), ProposedSize::new(100, 100));
        assert_eq!(bounds.response(Size::new(100, 100)), Size::new(100, 100));
    }

    #[test]
    fn maximum_caps_child_proposal() {
        let bounds = FrameBounds::default().max_width(50).max_height(75);
        assert_eq!(bounds.child_proposal(ProposedSize::new(100, 100)), ProposedSize::new(50, 75));
        assert_eq!(bounds.response(Size::new(100, 100)), Size::new(50, 75));
    }

    #[test]
    fn larger_maximum_has_no_effect() {
        let bounds = FrameBounds::default().max_width(130).max_height(130);
        assert_eq!(bounds.child_proposal(ProposedSize::new(100, 100)), ProposedSize::new(100, 100));
    }

    #[test]
    fn fixed_frame_pins_unbounded_proposal() {
        let bounds = FrameBounds::fixed(Some(30), None);
        assert_eq!(
            bounds.child_proposal(ProposedSize::UNSPECIFIED),
            ProposedSize::optional(Some(30), None)
        );
        assert_eq!(bounds.response(Size::new(80, 12)), Size::new(30, 12));
    }

    fn framed_rectangle(bounds: FrameBounds) -> (Size, Option<Size>) {
        use std::rc::Rc;

        use crate::backend::HeadlessBackend;
        use crate::environment::{Color, Environment};
        use crate::graph::ViewGraph;
        use crate::view::ViewExt;
        use crate::views::Rectangle;

        let backend = Rc::new(HeadlessBackend::new());
        let mut graph = ViewGraph::new(Rectangle::new(Color::RED).frame_bounds(bounds), backend, Environment::new());
        let size = graph.compute_layout(ProposedSize::new(100, 100));
        let root = graph.root();
        let child = graph.children(root)[0];
        (size, graph.node(child).and_then(|node| node.committed_size()))
    }

    #[test]
    fn frame_scenarios_through_layout() {
        let cases = [
            (FrameBounds::default().min_width(150).min_height(200), Size::new(150, 200)),
            (FrameBounds::default().min_width(20).min_height(40), Size::new(100, 100)),
            (FrameBounds::default().max_width(50).max_height(75), Size::new(50, 75)),
            (FrameBounds::default().max_width(130), Size::new(100, 100)),
        ];
        for (bounds, expected) in cases {
            let (frame, child) = framed_rectangle(bounds);
            assert_eq!(frame, expected, "frame for {bounds:?}");
            assert_eq!(child, Some(expected), "child for {bounds:?}");
        }
    }

    #[test]
    #[should_panic(expected = "exceeds maximum")]
    fn inverted_bounds_panic() {
        FrameBounds::default().min_width(10).max_width(5).validate();
    }
}

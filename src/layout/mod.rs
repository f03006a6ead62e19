//! Layout negotiation: proposals flow down, responses flow up.
//!
//! A pass starts with one final proposal to the root. Containers may measure
//! children speculatively ([`LayoutMode::NonFinal`]) any number of times, then
//! commit each child exactly once with a final proposal and position it.

pub mod context;
pub mod frame;
pub mod stack;

pub use context::{LayoutContext, LayoutMode};
pub use frame::FrameBounds;
pub use stack::StackLayout;

use crate::environment::Alignment;
use crate::geometry::{Offset, ProposedSize, Size};

/// Give every child the same proposal and stack them on top of each other,
/// aligned to `alignment` on both axes. The response is the largest child
/// size.
pub fn overlay_aligned(alignment: Alignment, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
    let sizes: Vec<Size> = (0..cx.child_count())
        .map(|index| cx.commit_child(index, proposal))
        .collect();
    let extent = sizes.iter().fold(Size::ZERO, |acc, size| acc.max(*size));
    for (index, size) in sizes.iter().enumerate() {
        let slack = extent - *size;
        let offset = match alignment {
            Alignment::Leading => Offset::ZERO,
            Alignment::Center => Offset::new(slack.width / 2, slack.height / 2),
            Alignment::Trailing => Offset::new(slack.width, slack.height),
        };
        cx.place_child(index, offset);
    }
    extent
}

/// Centered overlay; the default layout of composite views.
pub fn overlay(proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
    overlay_aligned(Alignment::Center, proposal, cx)
}

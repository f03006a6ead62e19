//! Stack distribution: lay children out along one axis.
//!
//! With a bounded main-axis proposal, every child is measured twice (at zero
//! and at the full extent) to find how much it can flex. Children are then
//! committed from least to most flexible, each offered an equal share of the
//! space still unclaimed. An unbounded main axis gives every child its
//! intrinsic size.

use crate::environment::Alignment;
use crate::geometry::{Axis, Offset, ProposedSize, Size};

use super::LayoutContext;

/// Layout parameters of one stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StackLayout {
    pub axis: Axis,
    pub spacing: i32,
    pub alignment: Alignment,
}

impl StackLayout {
    pub fn layout(&self, proposal: ProposedSize, cx: &mut LayoutContext<'_>) -> Size {
        let count = cx.child_count();
        if count == 0 {
            return Size::ZERO;
        }

        let axis = self.axis;
        let cross = proposal.along(axis.cross());
        let total_spacing = self.spacing * (count as i32 - 1);
        let mut sizes = vec![Size::ZERO; count];

        match proposal.along(axis) {
            None => {
                for (index, size) in sizes.iter_mut().enumerate() {
                    *size = cx.commit_child(index, ProposedSize::from_axes(axis, None, cross));
                }
            }
            Some(main) => {
                let mut order: Vec<(i32, usize)> = (0..count)
                    .map(|index| {
                        let min = cx.measure_child(index, ProposedSize::from_axes(axis, Some(0), cross));
                        let max = cx.measure_child(index, ProposedSize::from_axes(axis, Some(main), cross));
                        (max.along(axis) - min.along(axis), index)
                    })
                    .collect();
                order.sort_unstable();

                let mut remaining = (main - total_spacing).max(0);
                let mut left = count as i32;
                for (_, index) in order {
                    let share = remaining / left;
                    let size = cx.commit_child(index, ProposedSize::from_axes(axis, Some(share), cross));
                    remaining = (remaining - size.along(axis)).max(0);
                    left -= 1;
                    sizes[index] = size;
                }
            }
        }

        let main_extent = sizes.iter().map(|s| s.along(axis)).sum::<i32>() + total_spacing;
        let cross_extent = sizes.iter().map(|s| s.along(axis.cross())).max().unwrap_or(0);

        let mut cursor = 0;
        for (index, size) in sizes.iter().enumerate() {
            let slack = cross_extent - size.along(axis.cross());
            let cross_offset = match self.alignment {
                Alignment::Leading => 0,
                Alignment::Center => slack / 2,
                Alignment::Trailing => slack,
            };
            let offset = match axis {
                Axis::Horizontal => Offset::new(cursor, cross_offset),
                Axis::Vertical => Offset::new(cross_offset, cursor),
            };
            cx.place_child(index, offset);
            cursor += size.along(axis) + self.spacing;
        }

        Size::from_axes(axis, main_extent, cross_extent)
    }
}

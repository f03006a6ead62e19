//! Core geometry types: Offset, Size, ProposedSize, Spacing.
//!
//! Sizes are integer pixels. An unconstrained dimension is represented as
//! `None` in a [`ProposedSize`], never as an infinite sentinel, so no layout
//! arithmetic can be contaminated by it.

use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A position of a child relative to its parent's top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The origin.
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A concrete size: the response a node gives to a layout proposal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions to be non-negative.
    ///
    /// Backends occasionally report negative sizes; layout treats them as zero.
    #[inline]
    pub const fn clamped_non_negative(self) -> Size {
        Size {
            width: if self.width < 0 { 0 } else { self.width },
            height: if self.height < 0 { 0 } else { self.height },
        }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size { width: self.width.max(other.width), height: self.height.max(other.height) }
    }

    /// The extent along the given axis.
    #[inline]
    pub const fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Build a size from main-axis and cross-axis extents.
    #[inline]
    pub const fn from_axes(axis: Axis, main: i32, cross: i32) -> Size {
        match axis {
            Axis::Horizontal => Size { width: main, height: cross },
            Axis::Vertical => Size { width: cross, height: main },
        }
    }
}

impl Add for Size {
    type Output = Size;
    #[inline]
    fn add(self, rhs: Size) -> Size {
        Size { width: self.width + rhs.width, height: self.height + rhs.height }
    }
}

impl Sub for Size {
    type Output = Size;
    #[inline]
    fn sub(self, rhs: Size) -> Size {
        Size { width: self.width - rhs.width, height: self.height - rhs.height }
    }
}

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// A layout axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub const fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

// ---------------------------------------------------------------------------
// ProposedSize
// ---------------------------------------------------------------------------

/// A layout proposal: optional width × optional height.
///
/// `None` means "no constraint, report your intrinsic size along this axis".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProposedSize {
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl ProposedSize {
    /// The fully unconstrained proposal, used for intrinsic (natural) sizing.
    pub const UNSPECIFIED: ProposedSize = ProposedSize { width: None, height: None };

    /// A proposal with both dimensions fixed.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width: Some(width), height: Some(height) }
    }

    /// A proposal built from optional dimensions.
    #[inline]
    pub const fn optional(width: Option<i32>, height: Option<i32>) -> Self {
        Self { width, height }
    }

    /// A proposal fixing both dimensions to the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self { width: Some(size.width), height: Some(size.height) }
    }

    /// The proposed extent along the given axis.
    #[inline]
    pub const fn along(self, axis: Axis) -> Option<i32> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Build a proposal from main-axis and cross-axis extents.
    #[inline]
    pub const fn from_axes(axis: Axis, main: Option<i32>, cross: Option<i32>) -> Self {
        match axis {
            Axis::Horizontal => ProposedSize { width: main, height: cross },
            Axis::Vertical => ProposedSize { width: cross, height: main },
        }
    }

    /// Replace any unconstrained dimension with the matching dimension of
    /// `fallback`.
    #[inline]
    pub fn or_size(self, fallback: Size) -> Size {
        Size {
            width: self.width.unwrap_or(fallback.width),
            height: self.height.unwrap_or(fallback.height),
        }
    }

    /// Shrink a proposal by the given spacing, never going below zero.
    /// Unconstrained dimensions stay unconstrained.
    #[inline]
    pub fn inset(self, spacing: Spacing) -> ProposedSize {
        ProposedSize {
            width: self.width.map(|w| (w - spacing.width()).max(0)),
            height: self.height.map(|h| (h - spacing.height()).max(0)),
        }
    }
}

impl From<Size> for ProposedSize {
    fn from(size: Size) -> Self {
        ProposedSize::from_size(size)
    }
}

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// Clamp a dimension to declared bounds in a fixed order: negative values go
/// to zero, then the minimum is applied, then the maximum.
///
/// Callers must guarantee `min <= max` when both are present.
#[inline]
pub fn clamp_dimension(value: i32, min: Option<i32>, max: Option<i32>) -> i32 {
    let mut value = value.max(0);
    if let Some(min) = min {
        value = value.max(min);
    }
    if let Some(max) = max {
        value = value.min(max);
    }
    value
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle, used for padding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    /// Zero spacing on all sides.
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    /// Create spacing with explicit values for each side.
    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Total horizontal extent: `left + right`.
    #[inline]
    pub const fn width(self) -> i32 {
        self.left + self.right
    }

    /// Total vertical extent: `top + bottom`.
    #[inline]
    pub const fn height(self) -> i32 {
        self.top + self.bottom
    }
}

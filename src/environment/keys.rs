//! Environment keys and the value types they carry.

use crate::geometry::Axis;

/// A typed key into the [`Environment`](super::Environment).
///
/// Every key has a default, so reading an absent key always succeeds.
pub trait EnvironmentKey: 'static {
    type Value: Clone + 'static;

    /// The value used when no ancestor has set this key.
    fn default_value() -> Self::Value;
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// An sRGB color with alpha.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const CLEAR: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Light or dark appearance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// The foreground color used when no explicit color has been set.
    pub const fn default_foreground(self) -> Color {
        match self {
            ColorScheme::Light => Color::BLACK,
            ColorScheme::Dark => Color::WHITE,
        }
    }
}

/// Font weight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Bold,
}

/// A requested font.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    pub size: i32,
    pub weight: FontWeight,
}

impl Font {
    pub const BODY: Font = Font::system(12);
    pub const HEADING: Font = Font { size: 16, weight: FontWeight::Bold };
    pub const CAPTION: Font = Font::system(10);

    /// A regular-weight system font of the given point size.
    pub const fn system(size: i32) -> Self {
        Self { size, weight: FontWeight::Regular }
    }

    /// The same font with another weight.
    pub const fn weight(self, weight: FontWeight) -> Self {
        Self { size: self.size, weight }
    }

    /// Resolve to concrete metrics.
    pub const fn resolve(self) -> ResolvedFont {
        ResolvedFont {
            point_size: self.size,
            line_height: self.size * 5 / 4,
            weight: self.weight,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::BODY
    }
}

/// Concrete font metrics handed to a backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedFont {
    pub point_size: i32,
    pub line_height: i32,
    pub weight: FontWeight,
}

/// Cross-axis alignment of stack children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    Leading,
    #[default]
    Center,
    Trailing,
}

// ---------------------------------------------------------------------------
// Built-in keys
// ---------------------------------------------------------------------------

/// Font used by text-bearing views.
pub struct FontKey;

impl EnvironmentKey for FontKey {
    type Value = Font;
    fn default_value() -> Font {
        Font::BODY
    }
}

/// Explicit foreground color; `None` defers to the color scheme.
pub struct ForegroundColorKey;

impl EnvironmentKey for ForegroundColorKey {
    type Value = Option<Color>;
    fn default_value() -> Option<Color> {
        None
    }
}

pub struct ColorSchemeKey;

impl EnvironmentKey for ColorSchemeKey {
    type Value = ColorScheme;
    fn default_value() -> ColorScheme {
        ColorScheme::Light
    }
}

/// Whether controls accept interaction.
pub struct IsEnabledKey;

impl EnvironmentKey for IsEnabledKey {
    type Value = bool;
    fn default_value() -> bool {
        true
    }
}

/// Main axis of the nearest enclosing stack.
pub struct LayoutOrientationKey;

impl EnvironmentKey for LayoutOrientationKey {
    type Value = Axis;
    fn default_value() -> Axis {
        Axis::Vertical
    }
}

pub struct LayoutAlignmentKey;

impl EnvironmentKey for LayoutAlignmentKey {
    type Value = Alignment;
    fn default_value() -> Alignment {
        Alignment::Center
    }
}

/// Gap between stack children.
pub struct LayoutSpacingKey;

impl EnvironmentKey for LayoutSpacingKey {
    type Value = i32;
    fn default_value() -> i32 {
        10
    }
}

/// Whether text may be selected by the user.
pub struct TextSelectionKey;

impl EnvironmentKey for TextSelectionKey {
    type Value = bool;
    fn default_value() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_font_resolves_line_height() {
        let resolved = Font::BODY.resolve();
        assert_eq!(resolved.point_size, 12);
        assert_eq!(resolved.line_height, 15);
        assert_eq!(resolved.weight, FontWeight::Regular);
    }

    #[test]
    fn scheme_picks_contrasting_foreground() {
        assert_eq!(ColorScheme::Light.default_foreground(), Color::BLACK);
        assert_eq!(ColorScheme::Dark.default_foreground(), Color::WHITE);
    }
}

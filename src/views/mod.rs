//! The built-in view catalog.
//!
//! Leaf views (`Text`, `Button`, `Toggle`, `Rectangle`) own a native widget
//! and measure themselves through the backend. Containers (`VStack`,
//! `HStack`, `ZStack`, `Group`, `ForEach`) arrange children. Modifiers wrap
//! a single child.

pub mod controls;
pub mod for_each;
pub mod modifiers;
pub mod shapes;
pub mod stack;
pub mod text;

pub use controls::{Button, Toggle, BUTTON_INSETS, TOGGLE_MIN_HEIGHT, TOGGLE_SWITCH_WIDTH};
pub use for_each::ForEach;
pub use modifiers::{EnvironmentModifier, Frame, Identified, ObjectProvider, Padding};
pub use shapes::{Rectangle, Spacer, RECTANGLE_DEFAULT_EXTENT};
pub use stack::{Group, HStack, VStack, ZStack};
pub use text::Text;

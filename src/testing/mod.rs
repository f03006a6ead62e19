//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) on the in-memory
//! [`HeadlessBackend`](crate::backend::HeadlessBackend). Use
//! [`widget_tree_to_string`] to capture the resulting widget tree as plain
//! text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::widget_tree_to_string;

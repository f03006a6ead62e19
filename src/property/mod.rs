//! Dynamic properties: view fields whose live values the view graph owns.
//!
//! - [`DynamicProperty`]: the per-field update/publisher/release hooks.
//! - [`Env`] / [`EnvObject`]: fields that read the inherited environment.
//! - [`PropertyFields`] / [`PropertyUpdater`]: per-type update plans,
//!   declared once and cached for the process lifetime.

pub mod dynamic;
pub mod updater;

pub use dynamic::{DynamicProperty, Env, EnvObject};
pub use updater::{PropertyFields, PropertyUpdater};

pub(crate) use updater::ErasedUpdater;

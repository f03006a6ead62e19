//! # trellis
//!
//! A declarative UI reconciliation engine.
//!
//! Applications describe their UI as cheap, immutable [`View`](view::View)
//! values. trellis keeps a retained [`ViewGraph`](graph::ViewGraph) of nodes
//! that persist across rebuilds, carries reactive state from one view value
//! to the next, re-renders exactly the nodes whose observed state changed,
//! and negotiates layout between parents and children before handing the
//! result to a pluggable native [`Backend`](backend::Backend).
//!
//! ## Core Systems
//!
//! - **[`reactive`]**: publishers, state cells, bindings, observable objects
//! - **[`property`]**: dynamic properties and the per-type updater that
//!   refreshes them across rebuilds
//! - **[`environment`]**: the inherited key/value context
//! - **[`graph`]**: the retained node tree; build, update, teardown,
//!   invalidation
//! - **[`layout`]**: proposal/response negotiation, stacks, frames
//! - **[`backend`]**: the native widget capability surface and an in-memory
//!   headless backend
//! - **[`storage`]**: persisted values
//! - **[`app`]**: windows and the update cycle
//! - **[`testing`]**: `Pilot` and widget-tree snapshots

// Foundation
pub mod geometry;

// Reactivity
pub mod environment;
pub mod property;
pub mod reactive;
pub mod storage;

// Views and the retained graph
pub mod graph;
pub mod layout;
pub mod view;
pub mod views;

// Backends and applications
pub mod app;
pub mod backend;

// Testing infrastructure
pub mod testing;

pub mod prelude {
    //! The types most applications need.
    pub use crate::app::{App, AppConfig, StorageConfig};
    pub use crate::environment::{Alignment, Color, Environment, EnvironmentKey, Font};
    pub use crate::geometry::{ProposedSize, Size, Spacing};
    pub use crate::layout::LayoutContext;
    pub use crate::property::{Env, EnvObject, PropertyFields};
    pub use crate::reactive::{Binding, ObservableObject, Published, Publisher, State};
    pub use crate::storage::AppStorage;
    pub use crate::view::{AnyView, View, ViewExt};
    pub use crate::views::{
        Button, ForEach, Group, HStack, Rectangle, Spacer, Text, Toggle, VStack, ZStack,
    };
    pub use crate::views;
}
